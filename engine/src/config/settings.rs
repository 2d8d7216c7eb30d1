// Calculator settings, loaded from the bundled default.json or a user file.
use crate::error::EngineError;
use serde::Deserialize;
use shared::{countries, Strategy};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Base URL of the FX service; the base currency code is appended.
    pub fx_endpoint: String,
    pub request_timeout_secs: u64,
    pub default_base_currency: String,
    pub default_strategy: Strategy,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            fx_endpoint: "https://open.er-api.com/v6/latest".to_string(),
            request_timeout_secs: 10,
            default_base_currency: "USD".to_string(),
            default_strategy: Strategy::Ppp,
        }
    }
}

impl CalculatorSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json_str(config_str)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let config_str = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&config_str)?;
        tracing::info!(path = %path.display(), "Loaded calculator settings");
        Ok(settings)
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let settings: CalculatorSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.fx_endpoint.trim().is_empty() {
            return Err(EngineError::ConfigError("fx_endpoint must not be empty".to_string()));
        }
        if countries::first_for_currency(&self.default_base_currency).is_none() {
            return Err(EngineError::ConfigError(format!(
                "default_base_currency '{}' is not used by any known country",
                self.default_base_currency
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rates_url(&self, base_currency: &str) -> String {
        format!("{}/{}", self.fx_endpoint.trim_end_matches('/'), base_currency.to_uppercase())
    }
}
