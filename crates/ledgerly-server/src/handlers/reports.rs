//! Report handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use ledgerly_core::service::DEFAULT_REPORT_TITLE;
use ledgerly_core::{Report, ReportType};

use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateReportRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
}

/// POST /api/generate-report - responds with the rendered document
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<GenerateReportRequest>>,
) -> Result<Response, AppError> {
    let user_id = state.user_id(&headers)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let title = request
        .title
        .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());
    let report_type = match request.report_type.as_deref() {
        None => ReportType::default(),
        Some(t) => t
            .parse::<ReportType>()
            .map_err(|e| AppError::bad_request(&e))?,
    };

    let generated = state
        .service
        .generate_report(user_id, &title, report_type)
        .await?;

    let content_type = HeaderValue::from_str(&generated.content_type)
        .map_err(|_| AppError::internal("Invalid document content type"))?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe(&generated.filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"report.pdf\""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        generated.document,
    )
        .into_response())
}

/// Keep a filename printable and free of quotes for the header value
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != '"' && *c != '\\')
        .collect()
}

/// GET /api/reports - newest first
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Report>>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.reports(user_id)?))
}

#[cfg(test)]
mod tests {
    use super::header_safe;

    #[test]
    fn test_header_safe() {
        assert_eq!(header_safe("Q1_Review.pdf"), "Q1_Review.pdf");
        assert_eq!(header_safe("\"Big\"_Plans.pdf"), "Big_Plans.pdf");
        assert_eq!(header_safe("Café_Report.pdf"), "Caf_Report.pdf");
    }
}
