use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

pub const DEFAULT_API_URL: &str = "https://api.tse.ir/api/OptionChain";

/// Settings of the option-chain tooling; every field has a default, so a config
/// file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// endpoint returning the option chain as a json array
    pub api_url: String,
    /// sqlite file holding the `option_contracts` table
    pub database_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            database_path: PathBuf::from("option_chain.db"),
            request_timeout_secs: 10,
            user_agent: concat!("option-chain/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ChainConfig {
    /// Reads a json config file, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str::<Self>(&text)?
            }
            None => Self::default(),
        };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ChainError::Config(format!(
                "api_url '{}' is not an http(s) url",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ChainError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
