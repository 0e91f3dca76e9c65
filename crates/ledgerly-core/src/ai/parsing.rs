//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in prose or code fences, so the
//! outermost `{...}` span is extracted before decoding.

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{GeneratedInsight, InsightType};

/// Upper bound on insights kept from one response
pub const MAX_INSIGHTS: usize = 3;

const RAW_PREVIEW_LEN: usize = 200;

#[derive(Debug, Deserialize)]
struct InsightsEnvelope {
    #[serde(default)]
    insights: Vec<RawInsight>,
}

#[derive(Debug, Deserialize)]
struct RawInsight {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, rename = "type")]
    insight_type: String,
}

/// Parse the insights payload, keeping at most [`MAX_INSIGHTS`]
///
/// Entries without a title or content are skipped; an unknown `type` falls
/// back to `info`. A response with nothing usable is a generation error.
pub fn parse_insights(response: &str) -> Result<Vec<GeneratedInsight>> {
    let json_str = extract_json(response)?;
    let envelope: InsightsEnvelope = serde_json::from_str(json_str).map_err(|e| {
        Error::Generation(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            preview(json_str)
        ))
    })?;

    let insights: Vec<GeneratedInsight> = envelope
        .insights
        .into_iter()
        .filter(|raw| !raw.title.trim().is_empty() && !raw.content.trim().is_empty())
        .take(MAX_INSIGHTS)
        .map(|raw| {
            let insight_type = raw.insight_type.parse().unwrap_or_else(|_| {
                warn!(insight_type = %raw.insight_type, "Unknown insight type, using info");
                InsightType::Info
            });
            GeneratedInsight {
                title: raw.title.trim().to_string(),
                content: raw.content.trim().to_string(),
                insight_type,
            }
        })
        .collect();

    if insights.is_empty() {
        return Err(Error::Generation(format!(
            "No insights in AI response | Raw: {}",
            preview(json_str)
        )));
    }

    Ok(insights)
}

fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    match (response.find('{'), response.rfind('}')) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::Generation(format!(
            "No JSON found in AI response | Raw: {}",
            preview(response)
        ))),
    }
}

/// Truncate long responses for error messages
fn preview(s: &str) -> String {
    match s.char_indices().nth(RAW_PREVIEW_LEN) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
