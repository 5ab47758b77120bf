use chrono::NaiveDate;
use pricing::{BlackScholes, PricingError, Valuation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::OptionContract;

/// Market state shared by every contract of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub spot: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContractValuation {
    pub contract: OptionContract,
    pub valuation: Valuation,
    /// quoted mid price minus the model price
    pub edge: Option<f64>,
}

pub fn value_contract(
    contract: &OptionContract,
    market: &MarketInputs,
    valuation_date: NaiveDate,
) -> Result<ContractValuation, PricingError> {
    let params = contract.parameters(
        market.spot,
        market.risk_free_rate,
        market.volatility,
        valuation_date,
    );
    let valuation = BlackScholes::valuation(&params, contract.option_type)?;

    Ok(ContractValuation {
        contract: contract.clone(),
        valuation,
        edge: contract.mid_price().map(|mid| mid - valuation.price),
    })
}

/// Values every contract the model accepts; rejected ones (expired, bad inputs)
/// are logged and left out. Input order is kept.
pub fn value_chain(
    contracts: &[OptionContract],
    market: &MarketInputs,
    valuation_date: NaiveDate,
) -> Vec<ContractValuation> {
    contracts
        .iter()
        .filter_map(|contract| match value_contract(contract, market, valuation_date) {
            Ok(valuation) => Some(valuation),
            Err(err) => {
                warn!(
                    symbol = %contract.symbol,
                    option_type = %contract.option_type,
                    strike = contract.strike_price,
                    expiration = %contract.expiration_date,
                    "skipping contract: {}",
                    err
                );
                None
            }
        })
        .collect()
}
