// services/session/mod.rs
// The pricing session: one user's upload -> configure -> results workflow.
// State lives in PricingSession; the step handlers are split into sibling
// modules, each adding an impl block.

use crate::config::CalculatorSettings;
use crate::data::csv_parser::{ColumnMapping, ParsedTable};
use crate::error::SessionError;
use crate::pricing::Rates;
use crate::services::fx_provider::{FxRateProvider, RateSource, RatesStatus};
use shared::{countries, Country, Product, Step, Strategy};
use std::sync::Arc;
use uuid::Uuid;

pub mod configure;
pub mod results;
pub mod upload;

pub use results::{CellValue, CountryPrice};

pub struct PricingSession {
    id: Uuid,
    settings: CalculatorSettings,
    step: Step,

    // upload
    file_name: Option<String>,
    table: Option<ParsedTable>,

    // configure
    mapping: ColumnMapping,
    base_currency: String,
    home: &'static Country,

    // results
    products: Vec<Product>,
    selected: Option<usize>,
    strategy: Strategy,
    fx: FxRateProvider,

    error: Option<String>,
}

impl PricingSession {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_settings(CalculatorSettings::default(), source)
    }

    pub fn with_settings(settings: CalculatorSettings, source: Arc<dyn RateSource>) -> Self {
        let base_currency = settings.default_base_currency.to_uppercase();
        let home = countries::first_for_currency(&base_currency).unwrap_or_else(countries::default_home);
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, %base_currency, "Created pricing session");
        PricingSession {
            id,
            step: Step::Upload,
            file_name: None,
            table: None,
            mapping: ColumnMapping::default(),
            base_currency: home.currency.to_string(),
            home,
            products: Vec::new(),
            selected: None,
            strategy: settings.default_strategy,
            fx: FxRateProvider::new(source),
            error: None,
            settings,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Moving back never needs validation. Forward moves go through
    /// `continue_to_configure` and `generate_prices`.
    pub fn back_to(&mut self, step: Step) -> Result<(), SessionError> {
        if step > self.step {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                to: step,
                reason: "forward moves must be validated".to_string(),
            });
        }
        tracing::debug!(session_id = %self.id, from = ?self.step, to = ?step, "Moving back");
        self.step = step;
        Ok(())
    }

    /// Everything back to a fresh session, FX cache included.
    pub fn start_over(&mut self) {
        tracing::info!(session_id = %self.id, "Starting over");
        let source = self.fx.source();
        *self = Self::with_settings(self.settings.clone(), source);
    }

    /// Last inline error (upload or generate), if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rates_status(&self) -> &RatesStatus {
        self.fx.status()
    }

    pub fn rates_notice(&self) -> Option<&str> {
        self.fx.notice()
    }

    pub fn dismiss_rates_notice(&mut self) {
        self.fx.dismiss_notice();
    }

    pub fn fx(&self) -> &FxRateProvider {
        &self.fx
    }

    /// Live rates for the current base currency, once fetched.
    pub fn current_rates(&self) -> Option<&Rates> {
        match self.fx.status() {
            RatesStatus::Ready(currency) if *currency == self.base_currency => self.fx.active_rates(),
            _ => None,
        }
    }

    fn transition_error(&self, to: Step, reason: &str) -> SessionError {
        SessionError::InvalidTransition {
            from: self.step,
            to,
            reason: reason.to_string(),
        }
    }
}
