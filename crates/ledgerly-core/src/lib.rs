//! Ledgerly Core Library
//!
//! Shared functionality for the Ledgerly small-business finance tool:
//! - CSV ingestion that normalizes loosely formatted transaction exports
//! - Financial metrics engine (totals, series, KPIs, trends, target areas)
//! - Storage backends (in-memory and SQLite)
//! - Pluggable narrative generators (Ollama, OpenAI-compatible, mock)
//! - Prompt library for customizable AI prompts
//! - Document renderer client for PDF reports

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod format;
pub mod import;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod render;
pub mod service;
pub mod storage;

/// Test utilities including mock LLM and renderer server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use config::{AiBackendKind, AiConfig, AppConfig, RendererConfig, RendererKind, StorageConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{Forecast, PeriodForecast};
pub use import::SAMPLE_CSV;
pub use metrics::{compute_metrics, FinancialMetrics, FinancialSummary};
pub use models::*;
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use render::{DocumentRenderer, HttpRenderer, MockRenderer, RendererClient, ReportDocument};
pub use service::{FinanceService, GeneratedReport, ServiceStatus};
pub use storage::{open_storage, MemoryStorage, Storage};
