//! Document renderer backends
//!
//! The renderer turns a report body (markdown) into a binary document,
//! usually a PDF. The bytes are passed through untouched.
//!
//! - `DocumentRenderer` trait: render + content type
//! - `RendererClient` enum: concrete wrapper, chosen from [`RendererConfig`]
//! - `HttpRenderer` posts JSON to an external document service
//! - `MockRenderer` produces a small deterministic PDF

mod http;
mod mock;

pub use http::HttpRenderer;
pub use mock::MockRenderer;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use crate::config::{RendererConfig, RendererKind};
use crate::error::Result;
use crate::metrics::FinancialSummary;
use crate::models::ReportType;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Everything the renderer needs to lay out one report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub title: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Markdown body from the narrative generator
    pub content: String,
    pub generated_at: DateTime<Utc>,
    pub summary: FinancialSummary,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>>;

    /// MIME type of the rendered bytes
    fn content_type(&self) -> &str {
        PDF_CONTENT_TYPE
    }

    /// Short description for status output
    fn describe(&self) -> String;
}

#[derive(Clone)]
pub enum RendererClient {
    Http(HttpRenderer),
    Mock(MockRenderer),
}

impl RendererClient {
    /// Build the renderer named by the configuration
    ///
    /// Returns `Ok(None)` when rendering is disabled or the HTTP renderer
    /// has no URL.
    pub fn from_config(config: &RendererConfig) -> Result<Option<Self>> {
        match config.backend {
            RendererKind::None => Ok(None),
            RendererKind::Mock => Ok(Some(Self::mock())),
            RendererKind::Http => {
                let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                    warn!("Document renderer has no URL configured, reports disabled");
                    return Ok(None);
                };
                let http_client = Client::builder()
                    .timeout(Duration::from_secs(config.timeout_secs))
                    .build()?;
                Ok(Some(Self::Http(HttpRenderer::with_client(http_client, url))))
            }
        }
    }

    pub fn mock() -> Self {
        Self::Mock(MockRenderer)
    }
}

#[async_trait]
impl DocumentRenderer for RendererClient {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        match self {
            Self::Http(r) => r.render(document).await,
            Self::Mock(r) => r.render(document).await,
        }
    }

    fn content_type(&self) -> &str {
        match self {
            Self::Http(r) => r.content_type(),
            Self::Mock(r) => r.content_type(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Http(r) => r.describe(),
            Self::Mock(r) => r.describe(),
        }
    }
}
