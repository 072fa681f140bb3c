//! MVRV endpoints
//!
//! - `GET /mvrv/:coin_id`: single-coin estimate
//! - `GET /mvrv/compare?ids=`: comparison set (configured default when `ids` is absent)

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::config::split_coin_list;
use crate::error::AppError;
use crate::valuation::{ComparisonReport, MvrvReport, ValuationService};

/// Shared state for the valuation routes.
pub type ValuationState = Arc<ValuationService>;

pub fn create_valuation_router(service: ValuationState) -> Router {
    Router::new()
        .route("/mvrv/compare", get(compare_mvrv))
        .route("/mvrv/:coin_id", get(coin_mvrv))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub ids: Option<String>,
}

async fn coin_mvrv(
    State(service): State<ValuationState>,
    Path(coin_id): Path<String>,
) -> Result<Json<MvrvReport>, AppError> {
    service.coin_report(&coin_id).await.map(Json)
}

async fn compare_mvrv(
    State(service): State<ValuationState>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> Result<Json<ComparisonReport>, AppError> {
    let Query(params) = query.map_err(|rejection| {
        AppError::Validation(format!("Invalid query: {}", rejection.body_text()))
    })?;
    let ids = params.ids.as_deref().map(split_coin_list);
    service.compare(ids).await.map(Json)
}
