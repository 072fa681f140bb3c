//! MVRV valuation built on top of the proxy cache.
//!
//! Upstream data is only ever read through [`ProxyCache::resolve`], so the
//! valuation endpoints share cache entries and TTL with `/proxy`.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::proxy::ProxyCache;
use crate::valuation::{
    calculator::valuate,
    status::StatusInfo,
    types::{CoinDetail, ComparisonEntry, ComparisonReport, MarketEntry, MvrvReport},
};

/// Upstream path for a single coin's market data with a 7-day sparkline.
pub fn coin_endpoint(coin_id: &str) -> String {
    format!(
        "/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=true",
        coin_id
    )
}

/// Upstream path for a market snapshot of several coins.
pub fn markets_endpoint(coin_ids: &[String]) -> String {
    format!(
        "/coins/markets?vs_currency=usd&ids={}&order=market_cap_desc&sparkline=true&price_change_percentage=24h,7d",
        coin_ids.join(",")
    )
}

/// CoinGecko ids are lowercase slugs.
pub fn is_valid_coin_id(coin_id: &str) -> bool {
    !coin_id.is_empty()
        && coin_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub struct ValuationService {
    proxy: Arc<ProxyCache>,
    comparison_coins: Vec<String>,
}

impl ValuationService {
    pub fn new(proxy: Arc<ProxyCache>, comparison_coins: Vec<String>) -> Self {
        Self {
            proxy,
            comparison_coins,
        }
    }

    pub async fn coin_report(&self, coin_id: &str) -> Result<MvrvReport, AppError> {
        let coin_id = coin_id.trim().to_lowercase();
        if !is_valid_coin_id(&coin_id) {
            return Err(AppError::Validation(format!("Invalid coin id: {:?}", coin_id)));
        }

        let payload = self.proxy.resolve(&coin_endpoint(&coin_id)).await?;
        let detail: CoinDetail = decode(payload)?;
        let market = detail.market_data.ok_or_else(|| {
            AppError::NotFound("Coin not found or invalid data from API.".to_string())
        })?;

        let price = market.current_price.usd.ok_or_else(|| missing("current_price.usd"))?;
        let market_cap = market.market_cap.usd.ok_or_else(|| missing("market_cap.usd"))?;
        let valuation = valuate(&detail.id, price, market_cap, &market.sparkline_7d.prices())?;

        Ok(MvrvReport {
            symbol: detail.symbol.to_uppercase(),
            id: detail.id,
            name: detail.name,
            current_price: price,
            market_cap,
            circulating_supply: market.circulating_supply,
            price_change_24h_pct: market.price_change_percentage_24h,
            price_change_7d_pct: market.price_change_percentage_7d_in_currency.usd,
            market_cap_change_24h_pct: market.market_cap_change_percentage_24h,
            market_value: valuation.market_value,
            realized_value: valuation.realized_value,
            mvrv: valuation.mvrv,
            holder_profit_pct: valuation.holder_profit_pct,
            status: StatusInfo::for_ratio(valuation.mvrv),
            calculated_at: Utc::now(),
        })
    }

    /// Compare `coin_ids`, or the configured set when `None`.
    pub async fn compare(
        &self,
        coin_ids: Option<Vec<String>>,
    ) -> Result<ComparisonReport, AppError> {
        let ids = match coin_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => self.comparison_coins.clone(),
        };
        if let Some(bad) = ids.iter().find(|id| !is_valid_coin_id(id)) {
            return Err(AppError::Validation(format!("Invalid coin id: {:?}", bad)));
        }

        let payload = self.proxy.resolve(&markets_endpoint(&ids)).await?;
        let markets: Vec<MarketEntry> = decode(payload)?;
        if markets.is_empty() {
            return Err(no_comparison_data());
        }

        let mut coins = Vec::with_capacity(markets.len());
        for market in markets {
            let (Some(price), Some(market_cap)) = (market.current_price, market.market_cap) else {
                tracing::warn!(
                    "Skipping {} in comparison: price or market cap missing",
                    market.id
                );
                continue;
            };
            let history = market.sparkline_in_7d.prices();
            let valuation = match valuate(&market.id, price, market_cap, &history) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!("Skipping {} in comparison: {}", market.id, err);
                    continue;
                }
            };
            coins.push(ComparisonEntry {
                symbol: market.symbol.to_uppercase(),
                id: market.id,
                name: market.name,
                price,
                market_cap,
                mvrv: valuation.mvrv,
                status: StatusInfo::for_ratio(valuation.mvrv),
            });
        }

        if coins.is_empty() {
            return Err(no_comparison_data());
        }

        Ok(ComparisonReport {
            coins,
            calculated_at: Utc::now(),
        })
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload)
        .map_err(|err| AppError::Parse(format!("Unexpected upstream payload: {}", err)))
}

fn no_comparison_data() -> AppError {
    AppError::NotFound("No data returned for comparison coins.".to_string())
}

fn missing(field: &str) -> AppError {
    AppError::NotFound(format!("Upstream data is missing {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::tests::MockUpstream;
    use serde_json::json;
    use std::time::Duration;

    fn service_with(mock: &MockUpstream) -> ValuationService {
        let proxy = Arc::new(ProxyCache::new(
            Arc::new(mock.clone()),
            Duration::from_secs(600),
        ));
        ValuationService::new(
            proxy,
            vec!["bitcoin".to_string(), "ethereum".to_string()],
        )
    }

    fn bitcoin_detail() -> Value {
        json!({
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "btc",
            "market_data": {
                "current_price": { "usd": 50000.0, "eur": 46000.0 },
                "market_cap": { "usd": 1000000.0 },
                "circulating_supply": 20.0,
                "price_change_percentage_24h": 1.5,
                "market_cap_change_percentage_24h": 1.4,
                "price_change_percentage_7d_in_currency": { "usd": -3.2 },
                "sparkline_7d": { "price": [40000.0, null, 60000.0] }
            }
        })
    }

    #[test]
    fn coin_ids_are_slugs() {
        assert!(is_valid_coin_id("avalanche-2"));
        assert!(!is_valid_coin_id(""));
        assert!(!is_valid_coin_id("bitcoin/../x"));
        assert!(!is_valid_coin_id("bit coin"));
    }

    #[test]
    fn markets_endpoint_joins_ids() {
        let endpoint = markets_endpoint(&["bitcoin".to_string(), "solana".to_string()]);
        assert!(endpoint.starts_with("/coins/markets?vs_currency=usd&ids=bitcoin,solana&"));
    }

    #[tokio::test]
    async fn coin_report_computes_mvrv_from_cached_payload() {
        let mock = MockUpstream::new(vec![Ok(bitcoin_detail())]);
        let service = service_with(&mock);

        let report = service.coin_report("Bitcoin").await.unwrap();

        // supply 20, average 50000, ratio 0.70 -> realized 700000
        assert_eq!(report.symbol, "BTC");
        assert!((report.realized_value - 700_000.0).abs() < 1e-6);
        assert!((report.mvrv - 1.0 / 0.70).abs() < 1e-9);
        assert_eq!(report.price_change_7d_pct, Some(-3.2));
        assert_eq!(mock.requested(), vec![coin_endpoint("bitcoin")]);

        service.coin_report("bitcoin").await.unwrap();
        assert_eq!(mock.calls(), 1, "second report should come from cache");
    }

    #[tokio::test]
    async fn coin_without_market_data_is_not_found() {
        let mock = MockUpstream::new(vec![Ok(json!({
            "id": "ghost", "name": "Ghost", "symbol": "gho"
        }))]);
        let service = service_with(&mock);

        assert!(matches!(
            service.coin_report("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn invalid_coin_id_never_reaches_upstream() {
        let mock = MockUpstream::new(vec![]);
        let service = service_with(&mock);

        assert!(matches!(
            service.coin_report("../admin").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn compare_uses_configured_set_and_skips_incomplete_rows() {
        let mock = MockUpstream::new(vec![Ok(json!([
            {
                "id": "bitcoin", "name": "Bitcoin", "symbol": "btc",
                "current_price": 100.0, "market_cap": 1000.0,
                "sparkline_in_7d": { "price": [] }
            },
            {
                "id": "ethereum", "name": "Ethereum", "symbol": "eth",
                "current_price": null, "market_cap": 500.0
            }
        ]))]);
        let service = service_with(&mock);

        let report = service.compare(None).await.unwrap();

        assert_eq!(report.coins.len(), 1);
        assert_eq!(report.coins[0].symbol, "BTC");
        assert!((report.coins[0].mvrv - 1.0 / 0.70).abs() < 1e-9);
        assert_eq!(
            mock.requested(),
            vec![markets_endpoint(&["bitcoin".to_string(), "ethereum".to_string()])]
        );
    }

    #[tokio::test]
    async fn empty_market_list_is_not_found() {
        let mock = MockUpstream::new(vec![Ok(json!([]))]);
        let service = service_with(&mock);

        assert!(matches!(
            service.compare(Some(vec!["solana".to_string()])).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn compare_with_only_incomplete_rows_is_not_found() {
        let mock = MockUpstream::new(vec![Ok(json!([
            {
                "id": "solana", "name": "Solana", "symbol": "sol",
                "current_price": null, "market_cap": 500.0
            },
            {
                "id": "cardano", "name": "Cardano", "symbol": "ada",
                "current_price": 0.0, "market_cap": 0.0
            }
        ]))]);
        let service = service_with(&mock);

        match service.compare(Some(vec!["solana".to_string(), "cardano".to_string()])).await {
            Err(AppError::NotFound(msg)) => {
                assert_eq!(msg, "No data returned for comparison coins.")
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn upstream_errors_pass_through_unchanged() {
        let mock = MockUpstream::new(vec![Err(AppError::Upstream {
            status: 429,
            body: json!({ "status": { "error_message": "rate limited" } }),
        })]);
        let service = service_with(&mock);

        match service.coin_report("bitcoin").await {
            Err(AppError::Upstream { status, .. }) => assert_eq!(status, 429),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}
