//! Closed-form valuation of European vanilla options.

pub mod analytic;
pub mod common;
pub mod error;

pub use analytic::black_scholes::{BlackScholes, OptionPrice};
pub use common::models::{OptionParameters, OptionType, Valuation};
pub use error::PricingError;
