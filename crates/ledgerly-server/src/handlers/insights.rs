//! AI insight handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use ledgerly_core::AiInsight;

use crate::{AppError, AppState};

/// GET /api/ai-insights
pub async fn list_ai_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AiInsight>>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.insights(user_id)?))
}

/// POST /api/generate-insights - replaces the caller's insight set
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AiInsight>>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.regenerate_insights(user_id).await?))
}
