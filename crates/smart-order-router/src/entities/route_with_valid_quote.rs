use num_bigint::BigInt;
use router_core::{Address, CurrencyAmount, Protocol, Token, TradeType};

use crate::entities::route::Route;
use crate::gas_models::GasModel;

/// Quoter output for one (route, amount slice) that passed validation
#[derive(Debug, Clone)]
pub struct RouteQuoteParams {
    pub route: Route,
    pub amount: CurrencyAmount,
    pub raw_quote: BigInt,
    pub percent: u32,
    pub trade_type: TradeType,
    pub quote_token: Token,
    pub sqrt_price_x96_after_list: Vec<BigInt>,
    pub initialized_ticks_crossed_list: Vec<u32>,
    pub quoter_gas_estimate: u64,
}

/// A route bound to one slice of the trade, its quote and its gas cost
#[derive(Debug, Clone)]
pub struct RouteWithValidQuote {
    pub route: Route,
    /// Slice of the trade amount routed here (input for exact input)
    pub amount: CurrencyAmount,
    pub raw_quote: BigInt,
    pub quote: CurrencyAmount,
    /// Quote net of gas: lowered for exact input, raised for exact output
    pub quote_adjusted_for_gas: CurrencyAmount,
    pub percent: u32,
    pub trade_type: TradeType,
    pub quote_token: Token,
    pub gas_estimate: u64,
    pub gas_cost_in_token: CurrencyAmount,
    pub gas_cost_in_usd: CurrencyAmount,
    pub sqrt_price_x96_after_list: Vec<BigInt>,
    pub initialized_ticks_crossed_list: Vec<u32>,
    pub quoter_gas_estimate: u64,
    pub pool_addresses: Vec<Address>,
    pub token_path: Vec<Token>,
}

impl RouteWithValidQuote {
    pub fn new(params: RouteQuoteParams, gas_model: &dyn GasModel) -> Self {
        let quote = CurrencyAmount::from_raw(params.quote_token.clone(), params.raw_quote.clone());
        let pool_addresses = params.route.pool_addresses();
        let token_path = params.route.path().to_vec();

        let mut rwq = Self {
            route: params.route,
            amount: params.amount,
            raw_quote: params.raw_quote,
            quote_adjusted_for_gas: quote.clone(),
            quote,
            percent: params.percent,
            trade_type: params.trade_type,
            gas_estimate: 0,
            gas_cost_in_token: CurrencyAmount::zero(params.quote_token.clone()),
            gas_cost_in_usd: CurrencyAmount::zero(params.quote_token.clone()),
            quote_token: params.quote_token,
            sqrt_price_x96_after_list: params.sqrt_price_x96_after_list,
            initialized_ticks_crossed_list: params.initialized_ticks_crossed_list,
            quoter_gas_estimate: params.quoter_gas_estimate,
            pool_addresses,
            token_path,
        };

        let cost = gas_model.estimate_gas_cost(&rwq);
        rwq.gas_estimate = cost.gas_estimate;
        rwq.quote_adjusted_for_gas = match rwq.trade_type {
            TradeType::ExactInput => rwq.quote.sub(&cost.gas_cost_in_token),
            TradeType::ExactOutput => rwq.quote.add(&cost.gas_cost_in_token),
        };
        rwq.gas_cost_in_token = cost.gas_cost_in_token;
        rwq.gas_cost_in_usd = cost.gas_cost_in_usd;
        rwq
    }

    pub fn protocol(&self) -> Protocol {
        self.route.protocol()
    }

    /// Total initialized ticks crossed over every hop.
    pub fn ticks_crossed(&self) -> u32 {
        self.initialized_ticks_crossed_list.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::route::V2Route;
    use crate::gas_models::GasCost;
    use amm::Pair;
    use router_core::ChainId;

    struct FlatGas(u64);

    impl GasModel for FlatGas {
        fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost {
            GasCost {
                gas_estimate: 100_000,
                gas_cost_in_token: CurrencyAmount::from_raw(route.quote_token.clone(), self.0),
                gas_cost_in_usd: CurrencyAmount::from_raw(route.quote_token.clone(), self.0),
            }
        }
    }

    fn make_params(trade_type: TradeType) -> RouteQuoteParams {
        let a = Token::new(ChainId::Mainnet, "0x0a", 18, Some("A"), None);
        let b = Token::new(ChainId::Mainnet, "0x0b", 18, Some("B"), None);
        let pair = Pair::new(a.clone(), b.clone(), 1_000_000u64, 1_000_000u64, false);
        RouteQuoteParams {
            route: Route::V2(V2Route::new(vec![pair], a.clone(), b.clone()).unwrap()),
            amount: CurrencyAmount::from_raw(a, 1_000),
            raw_quote: BigInt::from(990),
            percent: 100,
            trade_type,
            quote_token: b,
            sqrt_price_x96_after_list: vec![],
            initialized_ticks_crossed_list: vec![0],
            quoter_gas_estimate: 0,
        }
    }

    #[test]
    fn test_exact_input_subtracts_gas() {
        let rwq = RouteWithValidQuote::new(make_params(TradeType::ExactInput), &FlatGas(40));
        assert_eq!(rwq.quote.raw, BigInt::from(990));
        assert_eq!(rwq.quote_adjusted_for_gas.raw, BigInt::from(950));
        assert_eq!(rwq.gas_estimate, 100_000);
        assert_eq!(rwq.pool_addresses.len(), 1);
    }

    #[test]
    fn test_exact_output_adds_gas() {
        let rwq = RouteWithValidQuote::new(make_params(TradeType::ExactOutput), &FlatGas(40));
        assert_eq!(rwq.quote_adjusted_for_gas.raw, BigInt::from(1030));
    }
}
