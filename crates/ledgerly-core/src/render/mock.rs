//! Deterministic renderer for tests and demo mode

use async_trait::async_trait;

use crate::error::Result;

use super::{DocumentRenderer, ReportDocument};

/// Wraps the title and body in a minimal PDF envelope
#[derive(Clone, Debug, Default)]
pub struct MockRenderer;

#[async_trait]
impl DocumentRenderer for MockRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let body = format!(
            "%PDF-1.4\n% {} ({})\n{}\n%%EOF\n",
            document.title, document.report_type, document.content
        );
        Ok(body.into_bytes())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
