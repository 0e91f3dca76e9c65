//! Metrics and forecast handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use ledgerly_core::{FinancialMetrics, Forecast};

use crate::{AppError, AppState};

/// GET /api/financial-metrics - empty value when the caller has no data
pub async fn financial_metrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FinancialMetrics>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.metrics(user_id)?))
}

/// GET /api/forecast
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Forecast>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.forecast(user_id)?))
}
