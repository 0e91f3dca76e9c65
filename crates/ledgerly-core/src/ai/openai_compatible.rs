//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//! - hosted OpenAI-style endpoints (with an API key)

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

/// OpenAI-compatible backend
///
/// Insight requests ask for a JSON object response (`response_format`);
/// servers that ignore the field still work since the payload is extracted
/// from the text.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OpenAICompatibleBackend {
    /// Create a backend around an existing client and prompt library
    pub fn with_client(
        http_client: Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            prompts: Arc::new(RwLock::new(prompts)),
        }
    }

    fn build_request(&self, prompt: RenderedPrompt) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user,
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
            response_format: prompt.json_output.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            stream: false,
        }
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: RenderedPrompt) -> Result<String> {
        let request = self.build_request(prompt);

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("No response from OpenAI API".into()))?;
        debug!(model = %self.model, chars = content.len(), "OpenAI-compatible response");

        Ok(content)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn generate_insights(
        &self,
        summary: &FinancialSummary,
        sample: &[Transaction],
    ) -> Result<Vec<GeneratedInsight>> {
        let vars = insight_vars(summary, sample);
        let prompt = render_prompt(&self.prompts, PromptId::FinancialInsights, &vars)?;
        let response = self.chat_completion(prompt).await?;
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
        let body = self.chat_completion(prompt).await?;
        if body.trim().is_empty() {
            return Err(Error::Generation("Empty report from OpenAI API".into()));
        }
        Ok(body)
    }

    async fn health_check(&self) -> bool {
        // /v1/models is standard; /health covers LocalAI and llama-server
        for path in ["/v1/models", "/health"] {
            let mut req = self
                .http_client
                .get(format!("{}{}", self.base_url, path))
                .timeout(Duration::from_secs(5));
            if let Some(ref api_key) = self.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }
            if let Ok(resp) = req.send().await {
                if resp.status().is_success() {
                    return true;
                }
            }
        }

        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str, api_key: Option<&str>) -> OpenAICompatibleBackend {
        OpenAICompatibleBackend::with_client(
            Client::new(),
            base_url,
            "gpt-4o",
            api_key.map(str::to_string),
            PromptLibrary::new(),
        )
    }

    fn prompt(json_output: bool) -> RenderedPrompt {
        RenderedPrompt {
            system: Some("You are terse.".into()),
            user: "Summarize.".into(),
            temperature: Some(0.2),
            max_tokens: Some(2000),
            json_output,
        }
    }

    #[test]
    fn test_request_has_system_and_user_messages() {
        let backend = backend("http://localhost:8000/", None);
        assert_eq!(backend.host(), "http://localhost:8000");

        let json = serde_json::to_value(backend.build_request(prompt(false))).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Summarize.");
        assert_eq!(json["max_tokens"], 2000);
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let backend = backend("http://localhost:8000", None);
        let json = serde_json::to_value(backend.build_request(prompt(true))).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_without_system_section() {
        let backend = backend("http://x", Some("secret"));
        let mut p = prompt(false);
        p.system = None;
        let json = serde_json::to_value(backend.build_request(p)).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }
}
