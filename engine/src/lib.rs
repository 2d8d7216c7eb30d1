// Engine library root: the price-localization pipeline behind the calculator.

pub mod config;
pub mod data;
pub mod error;
pub mod pricing;
pub mod services;

pub use error::EngineError;
pub use services::PricingSession;
