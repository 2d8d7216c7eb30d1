pub mod fx_provider;
pub mod session;

pub use fx_provider::{FxRateProvider, OfflineRateSource, OpenErApiSource, RateSource};
pub use session::PricingSession;
