//! chain-providers: Data-provider ports for the swap router
//!
//! Every external collaborator (pool discovery, pool state, token metadata,
//! quoting, gas price, rollup fee data, node access) is an async trait here.
//! Each port ships with an in-memory implementation that serves fixed data,
//! used by tests and as a front-end over pre-fetched state.

pub mod chain;
pub mod gas_price;
pub mod l2;
pub mod pool;
pub mod quote;
pub mod subgraph;
pub mod token;

pub use chain::{
    ChainProvider, InMemoryChainProvider, InMemorySimulationProvider, SimulationResult, TransactionRequest,
    TransactionSimulationProvider,
};
pub use gas_price::{GasPrice, GasPriceProvider, StaticGasPriceProvider};
pub use l2::{ArbitrumGasData, L2GasData, L2GasDataProvider, OptimismGasData, StaticL2GasDataProvider};
pub use pool::{
    InMemoryV2PoolProvider, InMemoryV3PoolProvider, V2PoolAccessor, V2PoolProvider, V3PoolAccessor, V3PoolProvider,
};
pub use quote::{AmountQuote, FnQuoteProvider, LocalV2QuoteProvider, QuoteProvider, RouteWithQuotes};
pub use subgraph::{
    InMemorySubgraphProvider, SubgraphPool, SubgraphProvider, SubgraphToken, V2SubgraphPool, V3SubgraphPool,
};
pub use token::{
    InMemoryBlocklist, InMemoryTokenProvider, InMemoryTokenValidator, TokenAccessor, TokenListProvider,
    TokenProvider, TokenValidationAccessor, TokenValidationResult, TokenValidatorProvider,
};
