//! Upstream payload shapes and valuation response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::valuation::status::StatusInfo;

/// Per-currency value map; only USD is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyValues {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<Option<f64>>,
}

impl Sparkline {
    /// Finite sample prices, nulls dropped.
    pub fn prices(&self) -> Vec<f64> {
        self.price
            .iter()
            .flatten()
            .copied()
            .filter(|p| p.is_finite())
            .collect()
    }
}

/// `GET /coins/{id}` response, trimmed to the fields the valuation needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: CurrencyValues,
    #[serde(default)]
    pub market_cap: CurrencyValues,
    pub circulating_supply: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: CurrencyValues,
    #[serde(default)]
    pub sparkline_7d: Sparkline,
}

/// One row of `GET /coins/markets`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub sparkline_in_7d: Sparkline,
}

/// Single-coin MVRV estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvrvReport {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub circulating_supply: Option<f64>,
    pub price_change_24h_pct: Option<f64>,
    pub price_change_7d_pct: Option<f64>,
    pub market_cap_change_24h_pct: Option<f64>,
    pub market_value: f64,
    pub realized_value: f64,
    pub mvrv: f64,
    pub holder_profit_pct: f64,
    pub status: StatusInfo,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub mvrv: f64,
    pub status: StatusInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub coins: Vec<ComparisonEntry>,
    pub calculated_at: DateTime<Utc>,
}
