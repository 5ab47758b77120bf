use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::models::OptionContract;

/// Source of raw option-chain quotes.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// One request against the quote provider; the json body is returned untouched.
    async fn fetch_option_chain(&self) -> Result<Value>;

    async fn fetch_contracts(&self) -> Result<Vec<OptionContract>> {
        let raw = self.fetch_option_chain().await?;
        parse_option_chain(raw)
    }
}

/// Tehran Stock Exchange option-chain client.
pub struct TseDataFetcher {
    client: Client,
    base_url: String,
}

impl TseDataFetcher {
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketDataSource for TseDataFetcher {
    async fn fetch_option_chain(&self) -> Result<Value> {
        info!(url = %self.base_url, "fetching option chain");

        let response = match self
            .client
            .get(&self.base_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %self.base_url, "option chain request failed: {}", e);
                return Err(e.into());
            }
        };

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}

/// Turns the provider's json array into contracts, rejecting the whole chain on
/// the first malformed row.
pub fn parse_option_chain(raw: Value) -> Result<Vec<OptionContract>> {
    let rows = match raw {
        Value::Array(rows) => rows,
        other => {
            return Err(ChainError::InvalidRecord(format!(
                "expected a json array of contracts, got {}",
                kind(&other)
            )))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let contract: OptionContract = serde_json::from_value(row)
                .map_err(|e| ChainError::InvalidRecord(format!("row {}: {}", i, e)))?;
            contract.check()?;
            Ok(contract)
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
