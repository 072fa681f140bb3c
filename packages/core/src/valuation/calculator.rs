//! Realized value estimate and MVRV ratio

use crate::error::AppError;

const DEFAULT_REALIZATION_RATIO: f64 = 0.75;

/// Share of the current (or 7-day average) price assumed as realized price.
pub fn realization_ratio(coin_id: &str) -> f64 {
    match coin_id {
        "bitcoin" => 0.70,
        "ethereum" => 0.72,
        "solana" | "avalanche-2" | "cardano" | "polkadot" => 0.68,
        _ => DEFAULT_REALIZATION_RATIO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub market_value: f64,
    pub realized_value: f64,
    pub mvrv: f64,
    pub holder_profit_pct: f64,
}

/// Estimate realized value.
///
/// With sparkline samples the realized price is the sample mean scaled by
/// the coin's ratio, applied to the implied supply (`market_cap / price`).
/// Without samples the market cap itself is scaled.
pub fn realized_value(
    coin_id: &str,
    current_price: f64,
    market_cap: f64,
    sparkline: &[f64],
) -> Result<f64, AppError> {
    ensure_positive("current_price", current_price)?;
    ensure_positive("market_cap", market_cap)?;

    let ratio = realization_ratio(coin_id);
    if sparkline.is_empty() {
        return Ok(market_cap * ratio);
    }

    let average_price = sparkline.iter().sum::<f64>() / sparkline.len() as f64;
    let realized = (market_cap / current_price) * average_price * ratio;
    ensure_positive("realized_value", realized)?;
    Ok(realized)
}

pub fn valuate(
    coin_id: &str,
    current_price: f64,
    market_cap: f64,
    sparkline: &[f64],
) -> Result<Valuation, AppError> {
    let realized_value = realized_value(coin_id, current_price, market_cap, sparkline)?;
    let mvrv = market_cap / realized_value;

    Ok(Valuation {
        market_value: market_cap,
        realized_value,
        mvrv,
        holder_profit_pct: (mvrv - 1.0) * 100.0,
    })
}

fn ensure_positive(field: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::Parse(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}
