//! The reference-price provider is an external collaborator (§1, §6): an
//! HTTP+JSON service exposing a quote endpoint and a company-profile
//! endpoint, both API-keyed with a 5-second timeout. This module defines
//! the fetch contract as traits so the cache layers (§4.3, §4.4) don't
//! care whether they're talking to the real service or a test double.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    /// Last-traded price for `symbol`, or `None` on any failure
    /// (network error, non-2xx, rate-limited, or malformed body).
    async fn fetch_quote(&self, symbol: &str) -> Option<Decimal>;
}

#[async_trait]
pub trait CompanyProfileSource: Send + Sync {
    /// Market capitalisation for `symbol`, or `None` on any failure.
    async fn fetch_market_cap(&self, symbol: &str) -> Option<Decimal>;
}

/// Real HTTP+JSON client for the external reference-price service.
///
/// Without an API key, every fetch is skipped and treated as a failure —
/// callers fall back per §4.3/§4.5 without ever touching the network.
pub struct HttpMarketDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(serde::Deserialize)]
struct QuoteResponse {
    price: Decimal,
}

#[derive(serde::Deserialize)]
struct ProfileResponse {
    market_cap: Decimal,
}

impl HttpMarketDataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("failed to build reqwest client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl ReferencePriceSource for HttpMarketDataClient {
    async fn fetch_quote(&self, symbol: &str) -> Option<Decimal> {
        if !self.has_credentials() {
            return None;
        }
        let url = format!("{}/v1/quote/{}", self.base_url, symbol);
        let resp = match self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(%symbol, error = %err, "reference price fetch failed");
                return None;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%symbol, "reference price fetch rate-limited");
            return None;
        }
        if !resp.status().is_success() {
            warn!(%symbol, status = %resp.status(), "reference price fetch non-success");
            return None;
        }

        match resp.json::<QuoteResponse>().await {
            Ok(body) if body.price > Decimal::ZERO => Some(body.price),
            Ok(_) => None,
            Err(err) => {
                warn!(%symbol, error = %err, "reference price fetch malformed body");
                None
            }
        }
    }
}

#[async_trait]
impl CompanyProfileSource for HttpMarketDataClient {
    async fn fetch_market_cap(&self, symbol: &str) -> Option<Decimal> {
        if !self.has_credentials() {
            return None;
        }
        let url = format!("{}/v1/profile/{}", self.base_url, symbol);
        let resp = match self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(%symbol, error = %err, "company profile fetch failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(%symbol, status = %resp.status(), "company profile fetch non-success");
            return None;
        }

        match resp.json::<ProfileResponse>().await {
            Ok(body) => Some(body.market_cap),
            Err(err) => {
                warn!(%symbol, error = %err, "company profile fetch malformed body");
                None
            }
        }
    }
}

/// Test/demo double that never touches the network.
pub struct StaticMarketDataSource {
    pub quote: Option<Decimal>,
    pub market_cap: Option<Decimal>,
}

#[async_trait]
impl ReferencePriceSource for StaticMarketDataSource {
    async fn fetch_quote(&self, _symbol: &str) -> Option<Decimal> {
        self.quote
    }
}

#[async_trait]
impl CompanyProfileSource for StaticMarketDataSource {
    async fn fetch_market_cap(&self, _symbol: &str) -> Option<Decimal> {
        self.market_cap
    }
}
