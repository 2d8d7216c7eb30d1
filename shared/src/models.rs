use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A reference-table entry. Instances only live in [`crate::COUNTRIES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Country {
    pub iso3: &'static str,
    pub iso2: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
    /// Local currency units per international dollar.
    pub ppp: f64,
    /// Set when the PPP factor is an estimate rather than published data.
    pub estimated: bool,
}

impl Country {
    pub fn flag(&self) -> String {
        crate::utils::flag_emoji(self.iso2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Live exchange rate only.
    Lazy,
    Ratio,
    #[default]
    Ppp,
    Final,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Strategy::Lazy, Strategy::Ratio, Strategy::Ppp, Strategy::Final];

    pub fn key(&self) -> &'static str {
        match self {
            Strategy::Lazy => "lazy",
            Strategy::Ratio => "ratio",
            Strategy::Ppp => "ppp",
            Strategy::Final => "final",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Lazy => "Lazy Conversion",
            Strategy::Ratio => "PPP Ratio",
            Strategy::Ppp => "PPP Power",
            Strategy::Final => "Final (.99)",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Strategy::Lazy => "Live FX rate only",
            Strategy::Ratio => "Purchasing power ratio",
            Strategy::Ppp => "PPP-adjusted price",
            Strategy::Final => "Psychological pricing",
        }
    }

    /// Whether the strategy needs live exchange rates.
    pub fn needs_rates(&self) -> bool {
        matches!(self, Strategy::Lazy)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown pricing strategy '{0}'. Use one of: lazy, ratio, ppp, final.")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.key() == key)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

/// Workflow position. Ordering follows the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    #[default]
    Upload = 1,
    Configure = 2,
    Results = 3,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Upload => "Upload",
            Step::Configure => "Configure",
            Step::Results => "Results",
        }
    }
}
