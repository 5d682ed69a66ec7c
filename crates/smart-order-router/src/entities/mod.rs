pub mod route;
pub mod route_with_valid_quote;

pub use route::{routes_to_string, MixedRoute, RoutablePool, Route, V2Route, V3Route};
pub use route_with_valid_quote::{RouteQuoteParams, RouteWithValidQuote};
