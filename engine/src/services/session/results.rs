// Step 3: product selection, strategy switching, the per-country grid and export.
use super::PricingSession;
use crate::data::export::{export_product, ExportFile};
use crate::error::SessionError;
use crate::pricing::{compute_value, format_value};
use crate::services::fx_provider::RatesStatus;
use serde::Serialize;
use shared::{countries, Country, Product, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CellValue {
    Value(f64),
    /// Waiting on the live rate fetch.
    Pending,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryPrice {
    pub country: &'static Country,
    pub is_home: bool,
    pub value: CellValue,
    pub display: String,
}

impl PricingSession {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Case-insensitive substring match on the product name.
    pub fn search_products(&self, query: &str) -> Vec<&Product> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .collect()
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected.and_then(|i| self.products.get(i))
    }

    pub fn select_product(&mut self, name: &str) -> Result<&Product, SessionError> {
        let index = self
            .products
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| SessionError::UnknownProduct(name.to_string()))?;
        self.selected = Some(index);
        Ok(&self.products[index])
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// One cell per country for the selected product under the active
    /// strategy, home first. Empty when no product is selected.
    pub fn result_grid(&self) -> Vec<CountryPrice> {
        let Some(product) = self.selected_product() else {
            return Vec::new();
        };
        let pending = self.strategy.needs_rates()
            && matches!(self.fx.status(), RatesStatus::Pending(currency) if *currency == self.base_currency);
        let rates = self.current_rates();

        countries::home_first(self.home)
            .into_iter()
            .map(|country| {
                let value = if pending {
                    CellValue::Pending
                } else {
                    match compute_value(product.price, self.home, country, rates, self.strategy) {
                        Some(v) => CellValue::Value(v),
                        None => CellValue::Unavailable,
                    }
                };
                let display = match value {
                    CellValue::Pending => "…".to_string(),
                    CellValue::Value(v) => format_value(Some(v), self.strategy, country.currency),
                    CellValue::Unavailable => format_value(None, self.strategy, country.currency),
                };
                CountryPrice {
                    country,
                    is_home: country.iso3 == self.home.iso3,
                    value,
                    display,
                }
            })
            .collect()
    }

    /// Refetches rates for the current base currency (cache first).
    pub async fn refresh_rates(&mut self) {
        let currency = self.base_currency.clone();
        self.fx.fetch_rates(&currency).await;
    }

    /// CSV export for the selected product. Does not change session state.
    pub fn export_selected(&self) -> Result<ExportFile, SessionError> {
        let product = self.selected_product().ok_or(SessionError::NoProductSelected)?;
        let file = export_product(
            product,
            &self.base_currency,
            self.home,
            countries::all(),
            self.current_rates(),
        )?;
        tracing::info!(session_id = %self.id, file = %file.file_name, "Exported pricing table");
        Ok(file)
    }
}
