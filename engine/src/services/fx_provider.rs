//! Live exchange rates with a per-session cache.
//!
//! The network sits behind [`RateSource`]. [`FxRateProvider`] owns the cache
//! and the fetch status; a fetch can be detached as a [`RateFetch`] so the
//! caller decides whether to await it inline or spawn it on the runtime.

use crate::config::CalculatorSettings;
use crate::error::FxError;
use crate::pricing::Rates;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const RATES_UNAVAILABLE_NOTICE: &str = "Live rates unavailable. Lazy Conversion will show N/A.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: Rates,
    /// Last update time reported by the provider, if any.
    pub provider_updated_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest(&self, base_currency: &str) -> Result<RateSnapshot, FxError>;
}

#[derive(Debug, Deserialize)]
struct OpenErApiResponse {
    result: String,
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default)]
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

/// Parses an open.er-api.com `/v6/latest/{BASE}` payload.
pub fn parse_rates_response(body: &str, requested_base: &str) -> Result<RateSnapshot, FxError> {
    let parsed: OpenErApiResponse =
        serde_json::from_str(body).map_err(|e| FxError::Malformed(e.to_string()))?;

    if parsed.result != "success" {
        let reason = parsed.error_type.unwrap_or(parsed.result);
        return Err(FxError::Unsuccessful(reason));
    }
    let rates = parsed
        .rates
        .ok_or_else(|| FxError::Malformed("missing 'rates' mapping".to_string()))?;

    Ok(RateSnapshot {
        base: parsed.base_code.unwrap_or_else(|| requested_base.to_uppercase()),
        rates,
        provider_updated_at: parsed.time_last_update_unix.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        fetched_at: Utc::now(),
    })
}

/// HTTP source backed by open.er-api.com.
#[derive(Clone)]
pub struct OpenErApiSource {
    client: Client,
    settings: CalculatorSettings,
}

impl OpenErApiSource {
    pub fn new(settings: &CalculatorSettings) -> Result<Self, FxError> {
        let client = Client::builder().timeout(settings.request_timeout()).build()?;
        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl RateSource for OpenErApiSource {
    async fn latest(&self, base_currency: &str) -> Result<RateSnapshot, FxError> {
        let url = self.settings.rates_url(base_currency);
        tracing::debug!(%url, "Requesting live FX rates");
        // Error payloads still carry a JSON body with result != "success".
        let body = self.client.get(&url).send().await?.text().await?;
        parse_rates_response(&body, base_currency)
    }
}

/// Source that never reaches the network; every fetch degrades.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRateSource;

#[async_trait]
impl RateSource for OfflineRateSource {
    async fn latest(&self, _base_currency: &str) -> Result<RateSnapshot, FxError> {
        Err(FxError::Unsuccessful("offline".to_string()))
    }
}

/// Base currency -> rates. Entries are never replaced once stored.
#[derive(Debug, Clone, Default)]
pub struct FxCache {
    entries: HashMap<String, RateSnapshot>,
}

impl FxCache {
    pub fn get(&self, currency: &str) -> Option<&RateSnapshot> {
        self.entries.get(&currency.to_uppercase())
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.get(currency).is_some()
    }

    /// Returns false when the currency was already cached.
    pub fn insert(&mut self, currency: &str, snapshot: RateSnapshot) -> bool {
        let key = currency.to_uppercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, snapshot);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RatesStatus {
    #[default]
    Idle,
    Pending(String),
    Ready(String),
    Unavailable(String),
}

/// A fetch that has been started but not yet run. Owns everything it needs,
/// so it can outlive a borrow of the session.
pub struct RateFetch {
    currency: String,
    source: Arc<dyn RateSource>,
}

impl RateFetch {
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub async fn run(self) -> FetchOutcome {
        let result = self.source.latest(&self.currency).await;
        FetchOutcome {
            currency: self.currency,
            result,
        }
    }
}

impl fmt::Debug for RateFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateFetch").field("currency", &self.currency).finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub currency: String,
    pub result: Result<RateSnapshot, FxError>,
}

pub struct FxRateProvider {
    source: Arc<dyn RateSource>,
    cache: FxCache,
    status: RatesStatus,
    notice: Option<String>,
}

impl FxRateProvider {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            cache: FxCache::default(),
            status: RatesStatus::Idle,
            notice: None,
        }
    }

    /// Marks `currency` as the one the results view wants. Returns a fetch to
    /// run only on a cache miss.
    pub fn begin(&mut self, currency: &str) -> Option<RateFetch> {
        let currency = currency.to_uppercase();
        self.notice = None;
        if self.cache.contains(&currency) {
            tracing::debug!(%currency, "FX rates served from session cache");
            self.status = RatesStatus::Ready(currency);
            return None;
        }
        tracing::info!(%currency, "Fetching live FX rates");
        self.status = RatesStatus::Pending(currency.clone());
        Some(RateFetch {
            currency,
            source: self.source.clone(),
        })
    }

    /// Commits a finished fetch under its own currency key. Status only moves
    /// if the view is still waiting on that currency.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { currency, result } = outcome;
        let awaited = self.status == RatesStatus::Pending(currency.clone());
        match result {
            Ok(snapshot) => {
                tracing::info!(%currency, rates = snapshot.rates.len(), "Live FX rates received");
                self.cache.insert(&currency, snapshot);
                if awaited {
                    self.status = RatesStatus::Ready(currency);
                }
            }
            Err(e) => {
                tracing::warn!(%currency, error = %e, "Live FX rates unavailable");
                if awaited {
                    self.status = RatesStatus::Unavailable(currency);
                    self.notice = Some(RATES_UNAVAILABLE_NOTICE.to_string());
                }
            }
        }
    }

    /// Cache first, network on a miss. Failures never escape; they show up as
    /// [`RatesStatus::Unavailable`] and a notice.
    pub async fn fetch_rates(&mut self, currency: &str) -> Option<&Rates> {
        if let Some(fetch) = self.begin(currency) {
            let outcome = fetch.run().await;
            self.apply(outcome);
        }
        self.active_rates()
    }

    /// Rates for the currency the view is showing, once they are in.
    pub fn active_rates(&self) -> Option<&Rates> {
        match &self.status {
            RatesStatus::Ready(currency) => self.cache.get(currency).map(|s| &s.rates),
            _ => None,
        }
    }

    pub fn active_snapshot(&self) -> Option<&RateSnapshot> {
        match &self.status {
            RatesStatus::Ready(currency) => self.cache.get(currency),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RatesStatus::Pending(_))
    }

    pub fn status(&self) -> &RatesStatus {
        &self.status
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn cache(&self) -> &FxCache {
        &self.cache
    }

    pub fn source(&self) -> Arc<dyn RateSource> {
        self.source.clone()
    }
}
