use crate::common::models::{OptionParameters, OptionType, Valuation};
use crate::error::PricingError;
use probability::distribution::{Continuous, Distribution, Gaussian};

pub(crate) fn cdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.distribution(d)
}

pub(crate) fn pdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.density(d)
}

pub trait OptionPrice {
    type Params;
    fn put(params: &Self::Params) -> Result<f64, PricingError>;
    fn call(params: &Self::Params) -> Result<f64, PricingError>;
}

fn finite(quantity: &'static str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::NumericOverflow(quantity))
    }
}

/// Intermediate terms shared by the price and all Greeks of one valuation,
/// so d1 and d2 are derived once per call.
struct Terms {
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vola: f64,
    sqrt_t: f64,
    d1: f64,
    d2: f64,
    /// e^(-rT); may be infinite, results using it are checked by the caller
    discount: f64,
}

impl Terms {
    fn new(params: &OptionParameters) -> Result<Self, PricingError> {
        if let Err(err) = params.validate() {
            tracing::debug!(%err, ?params, "rejected option parameters");
            return Err(err);
        }

        let sqrt_t = params.time_to_expiry.sqrt();
        let sigma_exp = params.volatility * sqrt_t;
        let d1 = ((params.spot / params.strike).ln()
            + (params.risk_free_rate + params.volatility.powi(2) / 2.0) * params.time_to_expiry)
            / sigma_exp;
        let d1 = finite("d1", d1)?;
        let d2 = finite("d2", d1 - sigma_exp)?;
        let discount = (-params.risk_free_rate * params.time_to_expiry).exp();

        Ok(Self {
            spot: params.spot,
            strike: params.strike,
            time: params.time_to_expiry,
            rate: params.risk_free_rate,
            vola: params.volatility,
            sqrt_t,
            d1,
            d2,
            discount,
        })
    }

    fn call_price(&self) -> f64 {
        self.spot * cdf(self.d1) - self.strike * self.discount * cdf(self.d2)
    }

    fn put_price(&self) -> f64 {
        self.strike * self.discount * cdf(-self.d2) - self.spot * cdf(-self.d1)
    }

    fn delta_call(&self) -> f64 {
        cdf(self.d1)
    }

    fn delta_put(&self) -> f64 {
        cdf(self.d1) - 1.0
    }

    fn gamma(&self) -> f64 {
        pdf(self.d1) / (self.spot * self.vola * self.sqrt_t)
    }

    fn vega(&self) -> f64 {
        self.spot * pdf(self.d1) * self.sqrt_t
    }

    /// time decay common to both sides
    fn theta_decay(&self) -> f64 {
        -self.spot * pdf(self.d1) * self.vola / (2.0 * self.sqrt_t)
    }

    fn theta_call(&self) -> f64 {
        self.theta_decay() - self.rate * self.strike * self.discount * cdf(self.d2)
    }

    fn theta_put(&self) -> f64 {
        self.theta_decay() + self.rate * self.strike * self.discount * cdf(-self.d2)
    }

    fn rho_call(&self) -> f64 {
        self.strike * self.time * self.discount * cdf(self.d2)
    }

    fn rho_put(&self) -> f64 {
        -self.strike * self.time * self.discount * cdf(-self.d2)
    }
}

fn evaluate(
    params: &OptionParameters,
    quantity: &'static str,
    f: impl FnOnce(&Terms) -> f64,
) -> Result<f64, PricingError> {
    let terms = Terms::new(params)?;
    finite(quantity, f(&terms))
}

/// European put and call prices and Greeks for non-dividend paying stocks.
/// Vega is reported per unit of volatility and theta per year, unscaled.
/// https://en.wikipedia.org/wiki/Black-Scholes_model
pub struct BlackScholes;

impl BlackScholes {
    pub fn d1(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "d1", |t| t.d1)
    }

    pub fn d2(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "d2", |t| t.d2)
    }

    pub fn call_price(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "call price", Terms::call_price)
    }

    pub fn put_price(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "put price", Terms::put_price)
    }

    pub fn delta_call(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "call delta", Terms::delta_call)
    }

    pub fn delta_put(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "put delta", Terms::delta_put)
    }

    /// Same for calls and puts.
    pub fn gamma(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "gamma", Terms::gamma)
    }

    /// Same for calls and puts.
    pub fn vega(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "vega", Terms::vega)
    }

    pub fn theta_call(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "call theta", Terms::theta_call)
    }

    pub fn theta_put(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "put theta", Terms::theta_put)
    }

    pub fn rho_call(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "call rho", Terms::rho_call)
    }

    pub fn rho_put(params: &OptionParameters) -> Result<f64, PricingError> {
        evaluate(params, "put rho", Terms::rho_put)
    }

    /// Price and all Greeks of one side in a single pass.
    pub fn valuation(
        params: &OptionParameters,
        option_type: OptionType,
    ) -> Result<Valuation, PricingError> {
        let t = Terms::new(params)?;
        let valuation = match option_type {
            OptionType::Call => Valuation {
                price: finite("call price", t.call_price())?,
                delta: finite("call delta", t.delta_call())?,
                gamma: finite("gamma", t.gamma())?,
                vega: finite("vega", t.vega())?,
                theta: finite("call theta", t.theta_call())?,
                rho: finite("call rho", t.rho_call())?,
            },
            OptionType::Put => Valuation {
                price: finite("put price", t.put_price())?,
                delta: finite("put delta", t.delta_put())?,
                gamma: finite("gamma", t.gamma())?,
                vega: finite("vega", t.vega())?,
                theta: finite("put theta", t.theta_put())?,
                rho: finite("put rho", t.rho_put())?,
            },
        };
        Ok(valuation)
    }
}

impl OptionPrice for BlackScholes {
    type Params = OptionParameters;

    fn call(params: &OptionParameters) -> Result<f64, PricingError> {
        Self::call_price(params)
    }

    fn put(params: &OptionParameters) -> Result<f64, PricingError> {
        Self::put_price(params)
    }
}
