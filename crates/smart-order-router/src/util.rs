//! Small helpers shared by the search

use num_bigint::BigInt;

/// Keeps the `capacity` best entries seen, best first.
///
/// "Best" is the largest key when `prefer_larger`, the smallest otherwise.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    capacity: usize,
    prefer_larger: bool,
    items: Vec<(BigInt, T)>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize, prefer_larger: bool) -> Self {
        Self {
            capacity,
            prefer_larger,
            items: Vec::with_capacity(capacity + 1),
        }
    }

    fn better(&self, a: &BigInt, b: &BigInt) -> bool {
        if self.prefer_larger {
            a > b
        } else {
            a < b
        }
    }

    pub fn push(&mut self, key: BigInt, item: T) {
        if self.capacity == 0 {
            return;
        }
        // ties keep insertion order
        let pos = self
            .items
            .iter()
            .position(|(k, _)| self.better(&key, k))
            .unwrap_or(self.items.len());
        if pos >= self.capacity {
            return;
        }
        self.items.insert(pos, (key, item));
        self.items.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &(BigInt, T)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Rescale a raw amount from `from` decimals to `to` decimals, truncating.
pub fn rescale_decimals(raw: &BigInt, from: u8, to: u8) -> BigInt {
    if to >= from {
        raw * router_core::pow10(u32::from(to - from))
    } else {
        raw / router_core::pow10(u32::from(from - to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_keeps_best() {
        let mut top = TopK::new(3, true);
        for (k, v) in [(5, "a"), (9, "b"), (1, "c"), (7, "d"), (9, "e")] {
            top.push(BigInt::from(k), v);
        }
        let kept: Vec<&str> = top.iter().map(|(_, v)| *v).collect();
        assert_eq!(kept, vec!["b", "e", "d"]);
    }

    #[test]
    fn test_top_k_smallest_first() {
        let mut top = TopK::new(2, false);
        for k in [5, 9, 1] {
            top.push(BigInt::from(k), k);
        }
        let kept: Vec<i32> = top.iter().map(|(_, v)| *v).collect();
        assert_eq!(kept, vec![1, 5]);
        top.clear();
        assert!(top.is_empty());
    }

    #[test]
    fn test_rescale_decimals() {
        assert_eq!(rescale_decimals(&BigInt::from(15), 6, 18), BigInt::from(15) * router_core::pow10(12));
        assert_eq!(rescale_decimals(&BigInt::from(1_999_999), 18, 12), BigInt::from(1));
    }
}
