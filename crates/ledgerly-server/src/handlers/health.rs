//! Health handler

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use ledgerly_core::ServiceStatus;

use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub details: ServiceStatus,
}

/// GET /api/health - backend availability and the caller's counts
pub async fn health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HealthResponse>, AppError> {
    let user_id = state.user_id(&headers)?;
    let details = state.service.status(user_id).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        details,
    }))
}
