//! Engine configuration (§6): tuning knobs for liquidity provisioning and
//! external market-data access, overridable via environment variables.
//! Kept dependency-free here (plain `std::env`, no `dotenv`) since the
//! engine crate has no process bootstrap of its own — that belongs to
//! `exchange-service`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enable_liquidity: bool,
    pub fallback_price: Decimal,
    pub refresh_interval_ms: u64,
    pub price_cache_ttl_seconds: u64,
    /// Empty string disables external fetches, forcing fallback behavior.
    pub api_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_liquidity: true,
            fallback_price: Decimal::new(10000, 2),
            refresh_interval_ms: 5000,
            price_cache_ttl_seconds: 30,
            api_key: String::new(),
        }
    }
}

impl EngineConfig {
    /// Loads from environment variables, falling back to defaults for any
    /// unset or unparsable value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enable_liquidity: std::env::var("ENABLE_LIQUIDITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_liquidity),
            fallback_price: std::env::var("FALLBACK_PRICE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fallback_price),
            refresh_interval_ms: std::env::var("REFRESH_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_interval_ms),
            price_cache_ttl_seconds: std::env::var("PRICE_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.price_cache_ttl_seconds),
            api_key: std::env::var("API_KEY").unwrap_or(defaults.api_key),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }
}
