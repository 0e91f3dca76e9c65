//! Financial data handlers: listing, CSV upload, sample template

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use ledgerly_core::{Transaction, SAMPLE_CSV};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

/// GET /api/financial-data
pub async fn list_financial_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let user_id = state.user_id(&headers)?;
    Ok(Json(state.service.transactions(user_id)?))
}

fn is_csv(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    content_type == Some("text/csv")
        || file_name.is_some_and(|n| n.to_ascii_lowercase().ends_with(".csv"))
}

/// POST /api/upload-financial-data - multipart form with a `file` field
pub async fn upload_financial_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let user_id = state.user_id(&headers)?;
    let mut upload: Option<(Option<String>, Option<String>, Vec<u8>)> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        // Check file size limit
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        upload = Some((file_name, content_type, bytes.to_vec()));
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    if !is_csv(file_name.as_deref(), content_type.as_deref()) {
        return Err(AppError::bad_request("Only CSV files are supported"));
    }

    let count = state.service.ingest_csv(user_id, &data)?;
    info!(user_id, count, file = ?file_name, "Upload stored");

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {} financial records", count),
        count,
    }))
}

/// GET /api/sample-csv - downloadable template
pub async fn sample_csv() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sample-financial-data.csv\"",
            ),
        ],
        SAMPLE_CSV,
    )
}

#[cfg(test)]
mod tests {
    use super::is_csv;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Some("books.csv"), None));
        assert!(is_csv(Some("BOOKS.CSV"), Some("application/octet-stream")));
        assert!(is_csv(Some("export"), Some("text/csv")));
        assert!(!is_csv(Some("books.xlsx"), Some("application/vnd.ms-excel")));
        assert!(!is_csv(None, None));
    }
}
