//! Sorted list of initialized ticks standing in for the on-chain tick bitmap

use crate::state::{AmmError, Tick};

/// Ticks must be sorted, aligned to the spacing and net to zero liquidity.
pub fn validate(ticks: &[Tick], tick_spacing: i32) -> Result<(), AmmError> {
    if ticks.iter().any(|t| t.index % tick_spacing != 0) {
        return Err(AmmError::InvalidTickData {
            message: format!("tick not a multiple of spacing {}", tick_spacing),
        });
    }
    if ticks.windows(2).any(|w| w[0].index >= w[1].index) {
        return Err(AmmError::InvalidTickData {
            message: "ticks not sorted".to_string(),
        });
    }
    let net: i128 = ticks.iter().map(|t| t.liquidity_net).sum();
    if net != 0 {
        return Err(AmmError::InvalidTickData {
            message: format!("liquidity net sums to {}", net),
        });
    }
    Ok(())
}

pub fn get_tick(ticks: &[Tick], index: i32) -> Result<&Tick, AmmError> {
    ticks
        .binary_search_by_key(&index, |t| t.index)
        .map(|i| &ticks[i])
        .map_err(|_| AmmError::InvalidTickData {
            message: format!("tick {} is not initialized", index),
        })
}

/// Nearest initialized tick at or below (`lte`) or strictly above `tick`.
fn next_initialized_tick(ticks: &[Tick], tick: i32, lte: bool) -> Option<i32> {
    if lte {
        let pos = ticks.partition_point(|t| t.index <= tick);
        pos.checked_sub(1).map(|i| ticks[i].index)
    } else {
        let pos = ticks.partition_point(|t| t.index <= tick);
        ticks.get(pos).map(|t| t.index)
    }
}

/// Next initialized tick within the 256-tick bitmap word of `tick`.
///
/// Returns the word boundary and `false` when the word holds no initialized
/// tick in the search direction.
pub fn next_initialized_tick_within_one_word(
    ticks: &[Tick],
    tick: i32,
    lte: bool,
    tick_spacing: i32,
) -> (i32, bool) {
    let compressed = tick.div_euclid(tick_spacing);

    if lte {
        let word_pos = compressed >> 8;
        let minimum = (word_pos << 8) * tick_spacing;
        match next_initialized_tick(ticks, tick, true) {
            Some(index) if index >= minimum => (index, true),
            _ => (minimum, false),
        }
    } else {
        let word_pos = (compressed + 1) >> 8;
        let maximum = (((word_pos + 1) << 8) - 1) * tick_spacing;
        match next_initialized_tick(ticks, tick, false) {
            Some(index) if index <= maximum => (index, true),
            _ => (maximum, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ticks() -> Vec<Tick> {
        vec![
            Tick { index: -120, liquidity_gross: 10, liquidity_net: 10 },
            Tick { index: 60, liquidity_gross: 5, liquidity_net: 5 },
            Tick { index: 600, liquidity_gross: 15, liquidity_net: -15 },
        ]
    }

    #[test]
    fn test_validate() {
        assert!(validate(&make_ticks(), 60).is_ok());
        let mut bad = make_ticks();
        bad[2].liquidity_net = -14;
        assert!(validate(&bad, 60).is_err());
        assert!(validate(&make_ticks(), 200).is_err());
    }

    #[test]
    fn test_search_down() {
        let ticks = make_ticks();
        assert_eq!(next_initialized_tick_within_one_word(&ticks, 60, true, 60), (60, true));
        assert_eq!(next_initialized_tick_within_one_word(&ticks, -1, true, 60), (-120, true));
        // -120 lies in the previous word, so the search stops at this word's start
        assert_eq!(next_initialized_tick_within_one_word(&ticks, 59, true, 60), (0, false));
    }

    #[test]
    fn test_search_up() {
        let ticks = make_ticks();
        assert_eq!(next_initialized_tick_within_one_word(&ticks, 60, false, 60), (600, true));
        assert_eq!(next_initialized_tick_within_one_word(&ticks, -121, false, 60), (-120, true));
    }

    #[test]
    fn test_word_boundary_when_empty() {
        let ticks = make_ticks();
        // nothing above 600 within the word: stop at its last tick
        let (next, initialized) = next_initialized_tick_within_one_word(&ticks, 600, false, 60);
        assert!(!initialized);
        assert_eq!(next, 255 * 60);
        // nothing below -120 within the word: stop at its first tick
        let (next, initialized) = next_initialized_tick_within_one_word(&ticks, -121, true, 60);
        assert!(!initialized);
        assert_eq!(next, -256 * 60);
    }

    #[test]
    fn test_get_tick() {
        let ticks = make_ticks();
        assert_eq!(get_tick(&ticks, 60).unwrap().liquidity_net, 5);
        assert!(get_tick(&ticks, 0).is_err());
    }
}
