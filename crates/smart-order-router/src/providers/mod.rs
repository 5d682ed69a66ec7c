//! Collaborator interfaces the router reads chain data through

pub mod chain;
pub mod pool;
pub mod snapshot;
pub mod subgraph;
pub mod token;

pub use chain::{
    ArbitrumGasData, BalanceProvider, BlockNumberProvider, GasPrice, GasPriceProvider, L2GasData,
    L2GasDataProvider, OptimismGasData, SimulationStatus, Simulator,
};
pub use pool::{V2PoolAccessor, V2PoolProvider, V3PoolAccessor, V3PoolProvider};
pub use snapshot::{PoolSnapshot, SnapshotProvider, V2PairRecord, V3PoolRecord};
pub use subgraph::{SubgraphPool, V2SubgraphPool, V2SubgraphProvider, V3SubgraphPool, V3SubgraphProvider};
pub use token::{
    TokenAccessor, TokenListProvider, TokenProvider, TokenValidationResult, TokenValidationResults,
    TokenValidatorProvider,
};
