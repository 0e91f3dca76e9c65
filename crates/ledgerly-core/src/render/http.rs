//! HTTP document service
//!
//! POSTs the [`ReportDocument`] as JSON; the response body is the document.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};

use super::{DocumentRenderer, ReportDocument, PDF_CONTENT_TYPE};

#[derive(Clone)]
pub struct HttpRenderer {
    http_client: Client,
    url: String,
}

impl HttpRenderer {
    pub fn with_client(http_client: Client, url: &str) -> Self {
        Self {
            http_client,
            url: url.to_string(),
        }
    }
}

fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(format!("document renderer: {}", e))
    } else {
        Error::Render(format!("Failed to reach document renderer: {}", e))
    }
}

#[async_trait]
impl DocumentRenderer for HttpRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .post(&self.url)
            .header("Accept", PDF_CONTENT_TYPE)
            .json(document)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Render(format!(
                "Document renderer error {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        if bytes.is_empty() {
            return Err(Error::Render(
                "Document renderer returned an empty document".into(),
            ));
        }
        debug!(bytes = bytes.len(), title = %document.title, "Rendered document");

        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("http ({})", self.url)
    }
}
