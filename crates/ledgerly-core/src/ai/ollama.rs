//! Ollama backend implementation
//!
//! Talks to the Ollama HTTP API (`/api/generate`, non-streaming).

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics::FinancialSummary;
use crate::models::{AiInsight, GeneratedInsight, ReportType, Transaction};
use crate::prompts::{PromptId, PromptLibrary};

use super::context::{insight_vars, render_prompt, report_vars, RenderedPrompt};
use super::parsing::parse_insights;
use super::AIBackend;

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    /// Create a backend around an existing client and prompt library
    pub fn with_client(
        http_client: Client,
        base_url: &str,
        model: &str,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            prompts: Arc::new(RwLock::new(prompts)),
        }
    }

    async fn generate(&self, prompt: RenderedPrompt) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.user,
            system: prompt.system,
            stream: false,
            format: prompt.json_output.then_some("json"),
            options: OllamaOptions {
                temperature: prompt.temperature,
                num_predict: prompt.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Ollama API error {}: {}",
                status, body
            )));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(model = %self.model, chars = ollama_response.response.len(), "Ollama response");

        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn generate_insights(
        &self,
        summary: &FinancialSummary,
        sample: &[Transaction],
    ) -> Result<Vec<GeneratedInsight>> {
        let vars = insight_vars(summary, sample);
        let prompt = render_prompt(&self.prompts, PromptId::FinancialInsights, &vars)?;
        let response = self.generate(prompt).await?;
        parse_insights(&response)
    }

    async fn generate_report(
        &self,
        summary: &FinancialSummary,
        insights: &[AiInsight],
        report_type: ReportType,
    ) -> Result<String> {
        let vars = report_vars(summary, insights, report_type);
        let prompt = render_prompt(&self.prompts, PromptId::FinancialReport, &vars)?;
        let body = self.generate(prompt).await?;
        if body.trim().is_empty() {
            return Err(Error::Generation("Empty report from Ollama".into()));
        }
        Ok(body)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
