use chrono::NaiveDate;
pub use pricing::OptionType;
use pricing::OptionParameters;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ChainError;

const DAYS_PER_YEAR: f64 = 365.0;

/// Parses the stored `option_type` column, case-insensitively.
pub fn parse_option_type(s: &str) -> Result<OptionType, ChainError> {
    match s.to_ascii_lowercase().as_str() {
        "call" => Ok(OptionType::Call),
        "put" => Ok(OptionType::Put),
        other => Err(ChainError::InvalidRecord(format!("unknown option type '{}'", other))),
    }
}

fn deserialize_option_type<'de, D>(deserializer: D) -> Result<OptionType, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_option_type(&text).map_err(serde::de::Error::custom)
}

/// One row of an option chain as quoted by the exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_option_type")]
    pub option_type: OptionType,
    pub strike_price: f64,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub bid_price: Option<f64>,
    #[serde(default)]
    pub ask_price: Option<f64>,
}

impl OptionContract {
    pub fn new(
        symbol: impl Into<String>,
        option_type: OptionType,
        strike_price: f64,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            option_type,
            strike_price,
            expiration_date,
            bid_price: None,
            ask_price: None,
        }
    }

    pub fn with_quotes(mut self, bid_price: Option<f64>, ask_price: Option<f64>) -> Self {
        self.bid_price = bid_price;
        self.ask_price = ask_price;
        self
    }

    /// Rejects records the store or the pricer cannot make sense of.
    pub fn check(&self) -> Result<(), ChainError> {
        if self.symbol.trim().is_empty() {
            return Err(ChainError::InvalidRecord("empty symbol".into()));
        }
        if !self.strike_price.is_finite() || self.strike_price <= 0.0 {
            return Err(ChainError::InvalidRecord(format!(
                "{}: strike {} is not positive",
                self.symbol, self.strike_price
            )));
        }
        for (side, quote) in [("bid", self.bid_price), ("ask", self.ask_price)] {
            if let Some(quote) = quote {
                if !quote.is_finite() || quote < 0.0 {
                    return Err(ChainError::InvalidRecord(format!(
                        "{}: {} quote {} is not a price",
                        self.symbol, side, quote
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn mid_price(&self) -> Option<f64> {
        match (self.bid_price, self.ask_price) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            (Some(quote), None) | (None, Some(quote)) => Some(quote),
            (None, None) => None,
        }
    }

    /// Calendar days until expiration in years; zero or negative once expired.
    pub fn time_to_expiry(&self, valuation_date: NaiveDate) -> f64 {
        (self.expiration_date - valuation_date).num_days() as f64 / DAYS_PER_YEAR
    }

    pub fn parameters(
        &self,
        spot: f64,
        risk_free_rate: f64,
        volatility: f64,
        valuation_date: NaiveDate,
    ) -> OptionParameters {
        OptionParameters::new(
            spot,
            self.strike_price,
            self.time_to_expiry(valuation_date),
            risk_free_rate,
            volatility,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn option_type_text() {
        assert_eq!(parse_option_type("call").unwrap(), OptionType::Call);
        assert_eq!(parse_option_type("PUT").unwrap(), OptionType::Put);
        assert!(parse_option_type("straddle").is_err());
        assert_eq!(OptionType::Put.to_string(), "put");
    }

    #[test]
    fn mid_price() {
        let contract = OptionContract::new("KHODRO", OptionType::Call, 2000.0, date(2026, 12, 1));
        assert_eq!(contract.mid_price(), None);
        assert_eq!(contract.clone().with_quotes(Some(10.0), Some(12.0)).mid_price(), Some(11.0));
        assert_eq!(contract.clone().with_quotes(None, Some(12.0)).mid_price(), Some(12.0));
        assert_eq!(contract.with_quotes(Some(10.0), None).mid_price(), Some(10.0));
    }

    #[test]
    fn time_to_expiry_in_years() {
        let contract = OptionContract::new("KHODRO", OptionType::Put, 2000.0, date(2027, 10, 16));
        assert_approx_eq!(contract.time_to_expiry(date(2026, 10, 16)), 1.0, 1e-12);
        assert_approx_eq!(contract.time_to_expiry(date(2027, 10, 16)), 0.0, 1e-12);
        assert!(contract.time_to_expiry(date(2027, 11, 1)) < 0.0);

        let params = contract.parameters(2100.0, 0.2, 0.4, date(2026, 10, 16));
        assert_eq!(params.strike, 2000.0);
        assert_eq!(params.spot, 2100.0);
        assert_eq!(params.volatility, 0.4);
    }

    #[test]
    fn json_layout() {
        let contract: OptionContract = serde_json::from_str(
            r#"{"symbol":"KHODRO","option_type":"call","strike_price":2000.0,
                "expiration_date":"2026-12-01","bid_price":15.5}"#,
        )
        .unwrap();
        assert_eq!(contract.id, None);
        assert_eq!(contract.option_type, OptionType::Call);
        assert_eq!(contract.expiration_date, date(2026, 12, 1));
        assert_eq!(contract.bid_price, Some(15.5));
        assert_eq!(contract.ask_price, None);
    }

    #[test]
    fn check_rejects_bad_records() {
        let contract = OptionContract::new("", OptionType::Call, 2000.0, date(2026, 12, 1));
        assert!(contract.check().is_err());
        let contract = OptionContract::new("KHODRO", OptionType::Call, 0.0, date(2026, 12, 1));
        assert!(contract.check().is_err());
        let contract = OptionContract::new("KHODRO", OptionType::Call, 10.0, date(2026, 12, 1));
        assert!(contract.check().is_ok());
        assert!(contract.clone().with_quotes(Some(0.0), Some(1.5)).check().is_ok());
    }

    #[test]
    fn check_rejects_bad_quotes() {
        let contract = OptionContract::new("KHODRO", OptionType::Call, 10.0, date(2026, 12, 1));
        for (bid, ask) in [
            (Some(f64::NAN), None),
            (None, Some(-1.0)),
            (Some(1.0), Some(f64::INFINITY)),
        ] {
            assert!(matches!(
                contract.clone().with_quotes(bid, ask).check(),
                Err(ChainError::InvalidRecord(_))
            ));
        }
    }

    #[test]
    fn json_option_type_ignores_case() {
        for (text, expected) in [("Call", OptionType::Call), ("CALL", OptionType::Call), ("Put", OptionType::Put)] {
            let contract: OptionContract = serde_json::from_value(serde_json::json!({
                "symbol": "KHODRO",
                "option_type": text,
                "strike_price": 2000.0,
                "expiration_date": "2026-12-01"
            }))
            .unwrap();
            assert_eq!(contract.option_type, expected);
        }

        let straddle = serde_json::from_value::<OptionContract>(serde_json::json!({
            "symbol": "KHODRO",
            "option_type": "straddle",
            "strike_price": 2000.0,
            "expiration_date": "2026-12-01"
        }));
        assert!(straddle.is_err());
    }
}
