//! Fetching, storing and valuing exchange option chains.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod store;
pub mod valuation;

pub use config::ChainConfig;
pub use error::{ChainError, Result};
pub use fetcher::{parse_option_chain, MarketDataSource, TseDataFetcher};
pub use models::{OptionContract, OptionType};
pub use store::{ContractStore, InMemoryContractStore, SqliteContractStore};
pub use valuation::{value_chain, value_contract, ContractValuation, MarketInputs};
