// Step 2: column mapping, base currency and home country, and the
// Configure -> Results transition.
use super::PricingSession;
use crate::data::csv_parser::ColumnMapping;
use crate::error::{ConfigError, SessionError};
use crate::services::fx_provider::{FetchOutcome, RateFetch};
use shared::{countries, Country, Step};

impl PricingSession {
    pub fn mapping(&self) -> ColumnMapping {
        self.mapping
    }

    pub fn set_name_column(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_configure_step()?;
        self.mapping.name = index;
        Ok(())
    }

    pub fn set_price_column(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_configure_step()?;
        self.mapping.price = index;
        Ok(())
    }

    // Products are priced in the base currency they were generated with, so
    // step-2 settings only change before generation.
    fn require_configure_step(&self) -> Result<(), SessionError> {
        if self.step != Step::Configure {
            return Err(self.transition_error(Step::Configure, "settings can only change at the configure step"));
        }
        Ok(())
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn home_country(&self) -> &'static Country {
        self.home
    }

    /// One country per distinct currency, matched case-insensitively on the
    /// currency code or the country name. An empty query matches everything.
    pub fn currency_options(&self, query: &str) -> Vec<&'static Country> {
        let query = query.trim().to_lowercase();
        countries::unique_currency_countries()
            .into_iter()
            .filter(|c| c.currency.to_lowercase().contains(&query) || c.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Sets the base currency and resets home to the first country using it.
    pub fn select_currency(&mut self, currency: &str) -> Result<(), SessionError> {
        self.require_configure_step()?;
        let home = countries::first_for_currency(currency)
            .ok_or_else(|| SessionError::UnknownCurrency(currency.to_string()))?;
        self.base_currency = home.currency.to_string();
        self.home = home;
        tracing::debug!(session_id = %self.id, currency = %self.base_currency, home = %home.iso3, "Base currency selected");
        Ok(())
    }

    /// Countries that may serve as home for the current base currency.
    pub fn home_candidates(&self) -> Vec<&'static Country> {
        countries::sharing_currency(&self.base_currency)
    }

    pub fn set_home_country(&mut self, iso3: &str) -> Result<(), SessionError> {
        self.require_configure_step()?;
        let country = countries::by_iso3(iso3).ok_or_else(|| SessionError::UnknownCountry(iso3.to_string()))?;
        if country.currency != self.base_currency {
            return Err(ConfigError::HomeCurrencyMismatch {
                home: country.name.to_string(),
                home_currency: country.currency.to_string(),
                base: self.base_currency.clone(),
            }
            .into());
        }
        self.home = country;
        Ok(())
    }

    /// First violated configure-step constraint, if any.
    pub fn validate_configuration(&self) -> Result<(), ConfigError> {
        let columns = self.table.as_ref().map_or(0, |t| t.column_count());
        for index in [self.mapping.name, self.mapping.price] {
            if index >= columns {
                return Err(ConfigError::ColumnOutOfRange { index, columns });
            }
        }
        if self.mapping.name == self.mapping.price {
            return Err(ConfigError::SameColumn);
        }
        if self.home.currency != self.base_currency {
            return Err(ConfigError::HomeCurrencyMismatch {
                home: self.home.name.to_string(),
                home_currency: self.home.currency.to_string(),
                base: self.base_currency.clone(),
            });
        }
        Ok(())
    }

    pub fn step2_valid(&self) -> bool {
        self.validate_configuration().is_ok()
    }

    /// Builds the product list and moves to Results. The returned fetch (if
    /// any) loads live rates for the base currency; Results is usable before
    /// it completes. Hand the outcome back through `apply_rates`.
    pub fn generate_prices(&mut self) -> Result<Option<RateFetch>, SessionError> {
        if self.step != Step::Configure {
            return Err(self.transition_error(Step::Results, "only reachable from the configure step"));
        }
        if !self.step1_valid() {
            return Err(self.transition_error(Step::Results, "no parsed file"));
        }
        self.validate_configuration()?;

        let products = self.table.as_ref().map(|t| t.products(self.mapping)).unwrap_or_default();
        if products.is_empty() {
            tracing::warn!(session_id = %self.id, "No valid products after column mapping");
            let err = SessionError::NoValidProducts;
            self.error = Some(err.to_string());
            return Err(err);
        }

        tracing::info!(
            session_id = %self.id,
            products = products.len(),
            currency = %self.base_currency,
            home = %self.home.iso3,
            "Generated product list"
        );
        self.products = products;
        self.selected = Some(0);
        self.error = None;
        self.step = Step::Results;
        Ok(self.fx.begin(&self.base_currency))
    }

    pub fn apply_rates(&mut self, outcome: FetchOutcome) {
        self.fx.apply(outcome);
    }

    /// `generate_prices` followed by the rate fetch, awaited inline.
    pub async fn generate_and_fetch(&mut self) -> Result<(), SessionError> {
        if let Some(fetch) = self.generate_prices()? {
            let outcome = fetch.run().await;
            self.apply_rates(outcome);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fx_provider::tests::StubRateSource;
    use crate::services::fx_provider::RatesStatus;
    use crate::services::session::tests::session_with_sample;

    fn configured() -> PricingSession {
        let mut session = session_with_sample();
        session.continue_to_configure().unwrap();
        session
    }

    #[test]
    fn test_sample_is_valid_by_default() {
        let session = configured();
        assert_eq!(session.mapping(), ColumnMapping { name: 0, price: 1 });
        assert!(session.step2_valid());
    }

    #[test]
    fn test_same_column_rejected() {
        let mut session = configured();
        session.set_price_column(0).unwrap();
        assert_eq!(session.validate_configuration(), Err(ConfigError::SameColumn));
        let err = session.generate_prices().unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::SameColumn)));
        assert_eq!(session.step(), Step::Configure);
    }

    #[test]
    fn test_column_out_of_range() {
        let mut session = configured();
        session.set_name_column(5).unwrap();
        assert_eq!(
            session.validate_configuration(),
            Err(ConfigError::ColumnOutOfRange { index: 5, columns: 2 })
        );
    }

    #[test]
    fn test_select_currency_picks_first_country() {
        let mut session = configured();
        session.select_currency("eur").unwrap();
        assert_eq!(session.base_currency(), "EUR");
        assert_eq!(session.home_country().iso3, "DEU");
        let candidates: Vec<_> = session.home_candidates().iter().map(|c| c.iso3).collect();
        assert_eq!(candidates, vec!["DEU", "FRA", "ITA", "ESP", "NLD"]);
        assert!(matches!(session.select_currency("ZZZ"), Err(SessionError::UnknownCurrency(_))));
    }

    #[test]
    fn test_home_must_share_base_currency() {
        let mut session = configured();
        session.select_currency("EUR").unwrap();
        session.set_home_country("FRA").unwrap();
        assert_eq!(session.home_country().iso3, "FRA");
        let err = session.set_home_country("GBR").unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::HomeCurrencyMismatch { .. })));
        assert_eq!(session.home_country().iso3, "FRA");
        assert!(matches!(session.set_home_country("ATL"), Err(SessionError::UnknownCountry(_))));
    }

    #[test]
    fn test_currency_options_filter() {
        let session = configured();
        assert_eq!(session.currency_options("").len(), countries::unique_currency_countries().len());
        let british: Vec<_> = session.currency_options("united k").iter().map(|c| c.currency).collect();
        assert_eq!(british, vec!["GBP"]);
        let euro: Vec<_> = session.currency_options("eur").iter().map(|c| c.iso3).collect();
        assert_eq!(euro, vec!["DEU"]);
    }

    #[test]
    fn test_no_valid_products_returns_to_configure() {
        let mut session = PricingSession::new(StubRateSource::working());
        session.load_file("p.csv", "Name,Price\nMug,free\nCup,\n").unwrap();
        session.continue_to_configure().unwrap();
        let err = session.generate_prices().unwrap_err();
        assert!(matches!(err, SessionError::NoValidProducts));
        assert_eq!(session.step(), Step::Configure);
        assert_eq!(session.error(), Some("No valid products found. Check your column selections."));
    }

    #[test]
    fn test_generate_selects_first_product_and_marks_rates_pending() {
        let mut session = configured();
        let fetch = session.generate_prices().unwrap();
        assert_eq!(session.step(), Step::Results);
        assert_eq!(session.products().len(), 5);
        assert_eq!(session.selected_product().unwrap().name, "Long Black Jeans");
        assert_eq!(fetch.unwrap().currency(), "USD");
        assert_eq!(session.rates_status(), &RatesStatus::Pending("USD".to_string()));
    }

    #[test]
    fn test_generate_only_from_configure() {
        let mut session = session_with_sample();
        assert!(matches!(session.generate_prices(), Err(SessionError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_settings_locked_once_results_reached() {
        let mut session = configured();
        session.generate_and_fetch().await.unwrap();
        assert_eq!(session.step(), Step::Results);

        assert!(matches!(session.select_currency("JPY"), Err(SessionError::InvalidTransition { .. })));
        assert!(matches!(session.set_home_country("JPN"), Err(SessionError::InvalidTransition { .. })));
        assert!(matches!(session.set_price_column(0), Err(SessionError::InvalidTransition { .. })));
        assert!(matches!(session.set_name_column(1), Err(SessionError::InvalidTransition { .. })));
        assert_eq!(session.base_currency(), "USD");
        assert_eq!(session.home_country().iso3, "USA");
        assert_eq!(session.mapping(), ColumnMapping { name: 0, price: 1 });
        assert!(session.step2_valid());

        // going back unlocks them again
        session.back_to(Step::Configure).unwrap();
        session.select_currency("JPY").unwrap();
        assert_eq!(session.home_country().iso3, "JPN");
    }

    #[test]
    fn test_settings_locked_at_upload_step() {
        let mut session = session_with_sample();
        assert!(matches!(session.select_currency("EUR"), Err(SessionError::InvalidTransition { .. })));
        assert_eq!(session.base_currency(), "USD");
    }

    #[tokio::test]
    async fn test_regenerate_same_currency_uses_cache() {
        let source = StubRateSource::working();
        let mut session = PricingSession::new(source.clone());
        session.load_file("p.csv", crate::data::csv_parser::SAMPLE_CSV).unwrap();
        session.continue_to_configure().unwrap();
        session.generate_and_fetch().await.unwrap();

        session.back_to(Step::Configure).unwrap();
        assert!(session.generate_prices().unwrap().is_none());
        assert_eq!(session.rates_status(), &RatesStatus::Ready("USD".to_string()));

        session.back_to(Step::Configure).unwrap();
        session.select_currency("EUR").unwrap();
        assert!(session.generate_prices().unwrap().is_some());
        assert_eq!(source.call_count(), 1);
    }
}
