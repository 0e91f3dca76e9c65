//! Ledgerly Web Server
//!
//! Axum-based REST API for the Ledgerly finance dashboard.
//!
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Upload size limit on CSV imports
//! - Caller identified by the `x-user-id` header (no authentication)
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use ledgerly_core::ai::AIBackend;
use ledgerly_core::config::ServerSettings;
use ledgerly_core::{Error as CoreError, FinanceService, UserId};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Header naming the calling user
pub const USER_ID_HEADER: &str = "x-user-id";

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// User assumed when the request carries no `x-user-id`
    pub default_user_id: UserId,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Built dashboard to serve for non-API paths
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_user_id: ledgerly_core::config::DEFAULT_USER_ID,
            allowed_origins: vec![],
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings, default_user_id: UserId) -> Self {
        Self {
            default_user_id,
            allowed_origins: settings.allowed_origins.clone(),
            static_dir: settings.static_dir.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub service: FinanceService,
    pub config: ServerConfig,
}

impl AppState {
    /// Resolve the caller from the `x-user-id` header
    pub fn user_id(&self, headers: &HeaderMap) -> Result<UserId, AppError> {
        match headers.get(USER_ID_HEADER) {
            None => Ok(self.config.default_user_id),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<UserId>().ok())
                .filter(|id| *id > 0)
                .ok_or_else(|| AppError::bad_request("Invalid x-user-id header")),
        }
    }
}

/// Create the application router
pub fn create_router(service: FinanceService, config: ServerConfig) -> Router {
    let static_dir = config.static_dir.clone();
    let cors = cors_layer(&config.allowed_origins);

    let state = Arc::new(AppState { service, config });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/financial-data", get(handlers::list_financial_data))
        .route(
            "/upload-financial-data",
            post(handlers::upload_financial_data)
                // room for multipart framing around a full-size file
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024)),
        )
        .route("/sample-csv", get(handlers::sample_csv))
        .route("/financial-metrics", get(handlers::financial_metrics))
        .route("/forecast", get(handlers::forecast))
        .route("/ai-insights", get(handlers::list_ai_insights))
        .route("/generate-insights", post(handlers::generate_insights))
        .route("/generate-report", post(handlers::generate_report))
        .route("/reports", get(handlers::list_reports));

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for downloads
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(USER_ID_HEADER),
        ])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if allowed_origins.is_empty() {
        return cors;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Start the server
pub async fn serve(
    service: FinanceService,
    config: ServerConfig,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    check_ai_connection(&service).await;
    if service.renderer().is_none() {
        info!("Document renderer not configured (set LEDGERLY_RENDERER_URL to enable PDF reports)");
    }

    let app = create_router(service, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(service: &FinanceService) {
    match service.ai() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    host = client.host(),
                    model = client.model(),
                    "AI backend connected"
                );
            } else {
                warn!(
                    host = client.host(),
                    model = client.model(),
                    "AI backend configured but not responding"
                );
            }
        }
        None => {
            info!("AI backend not configured (set OLLAMA_HOST to enable AI insights)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::Parse(_) | CoreError::Validation(_) | CoreError::NoData => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Generation(_) | CoreError::Render(_) => StatusCode::BAD_GATEWAY,
            CoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => {
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    // Return generic message to client
                    message: "An internal error occurred".to_string(),
                    // Keep full error for logging
                    internal: Some(err.into()),
                };
            }
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %err, "Upstream failure");
        }

        Self {
            status,
            message: err.to_string(),
            internal: None,
        }
    }
}
