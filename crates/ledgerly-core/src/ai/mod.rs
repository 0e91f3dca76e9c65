//! Pluggable narrative generator backends
//!
//! # Architecture
//!
//! - `AIBackend` trait: insight and report generation plus availability
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_config(&config.ai)?;
//!
//! if let Some(ref client) = ai {
//!     let insights = client.generate_insights(&summary, &sample).await?;
//! }
//! ```
//!
//! Backends report failures as they see them (HTTP errors, timeouts,
//! unusable responses); wrapping them for the caller is the service's job.

pub mod context;
mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;

pub use context::{recent_sample, RenderedPrompt, INSIGHT_SAMPLE_SIZE};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use parsing::MAX_INSIGHTS;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::config::{AiBackendKind, AiConfig};
use crate::error::Result;
use crate::metrics::FinancialSummary;
use crate::models::{AiInsight, GeneratedInsight, ReportType, Transaction};
use crate::prompts::PromptLibrary;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Up to [`MAX_INSIGHTS`] insights from a summary and transaction sample
    async fn generate_insights(
        &self,
        summary: &FinancialSummary,
        sample: &[Transaction],
    ) -> Result<Vec<GeneratedInsight>>;

    /// Markdown report body
    async fn generate_report(
        &self,
        summary: &FinancialSummary,
        insights: &[AiInsight],
        report_type: ReportType,
    ) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for status output)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build the client named by the configuration
    ///
    /// Returns `Ok(None)` when generation is disabled or the backend lacks
    /// a host; callers then report the feature as not configured.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        if config.backend == AiBackendKind::None {
            return Ok(None);
        }
        if config.backend == AiBackendKind::Mock {
            return Ok(Some(Self::mock()));
        }

        let Some(host) = config.host.as_deref().filter(|h| !h.trim().is_empty()) else {
            warn!(backend = %config.backend, "AI backend has no host configured, generation disabled");
            return Ok(None);
        };

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let prompts = match config.prompts_dir {
            Some(ref dir) => PromptLibrary::with_override_dir(dir.clone()),
            None => PromptLibrary::new(),
        };
        let model = config.model_or_default();

        let client = match config.backend {
            AiBackendKind::OpenaiCompatible => {
                AIClient::OpenAICompatible(OpenAICompatibleBackend::with_client(
                    http_client,
                    host,
                    &model,
                    config.api_key.clone(),
                    prompts,
                ))
            }
            _ => AIClient::Ollama(OllamaBackend::with_client(
                http_client,
                host,
                &model,
                prompts,
            )),
        };

        Ok(Some(client))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Backend name for status output
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Ollama(_) => "ollama",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate_insights(
        &self,
        summary: &FinancialSummary,
        sample: &[Transaction],
    ) -> Result<Vec<GeneratedInsight>> {
        match self {
            AIClient::Ollama(b) => b.generate_insights(summary, sample).await,
            AIClient::OpenAICompatible(b) => b.generate_insights(summary, sample).await,
            AIClient::Mock(b) => b.generate_insights(summary, sample).await,
        }
    }

    async fn generate_report(
        &self,
        summary: &FinancialSummary,
        insights: &[AiInsight],
        report_type: ReportType,
    ) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate_report(summary, insights, report_type).await,
            AIClient::OpenAICompatible(b) => {
                b.generate_report(summary, insights, report_type).await
            }
            AIClient::Mock(b) => b.generate_report(summary, insights, report_type).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
