use crate::error::PricingError;

/// Inputs of a single Black-Scholes valuation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptionParameters {
    /// the underlying's price at valuation time
    pub spot: f64,
    /// the strike or exercise price of the option
    pub strike: f64,
    /// (T - t) in years, where T is the time of the option's expiration and t is the current time
    pub time_to_expiry: f64,
    /// the continuously compounded annual risk-free rate, may be negative
    pub risk_free_rate: f64,
    /// the annualized standard deviation of the underlying's returns
    pub volatility: f64,
}

impl OptionParameters {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
        }
    }

    /// Checks the model's domain: spot, strike, time and volatility strictly positive,
    /// every field finite.
    pub fn validate(&self) -> Result<(), PricingError> {
        let positive = [
            ("spot", self.spot),
            ("strike", self.strike),
            ("time_to_expiry", self.time_to_expiry),
            ("volatility", self.volatility),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PricingError::InvalidParameter { name, value });
            }
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParameter {
                name: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Price and Greeks of one side of an option, as returned by a full valuation.
/// Vega is per unit of volatility and theta per year.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Valuation {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_parameters() {
        assert!(OptionParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).validate().is_ok());
        // negative rates are allowed
        assert!(OptionParameters::new(100.0, 100.0, 1.0, -0.01, 0.2).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_domain() {
        let err = OptionParameters::new(100.0, 100.0, 0.0, 0.05, 0.2)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidParameter { name: "time_to_expiry", .. }
        ));

        let err = OptionParameters::new(100.0, -1.0, 1.0, 0.05, 0.2)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameter { name: "strike", .. }));

        assert!(OptionParameters::new(f64::NAN, 100.0, 1.0, 0.05, 0.2).validate().is_err());
        assert!(OptionParameters::new(100.0, 100.0, f64::INFINITY, 0.05, 0.2).validate().is_err());
        assert!(OptionParameters::new(100.0, 100.0, 1.0, f64::NAN, 0.2).validate().is_err());
    }
}
