//! Finance service: the operations the API and CLI expose
//!
//! Owns the storage backend, the optional narrative generator and the
//! optional document renderer. Metrics are recomputed from a fresh read of
//! the store on every call.
//!
//! Insight regeneration is serialized per user and runs stage-then-swap:
//! the new set is generated first and only then replaces the stored one, so
//! a failed generation leaves the previous insights in place.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::{recent_sample, AIBackend, AIClient, INSIGHT_SAMPLE_SIZE};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::forecast::{forecast, Forecast};
use crate::import::{normalize_record, read_records, validate_records};
use crate::metrics::{compute_metrics, FinancialMetrics, FinancialSummary};
use crate::models::{AiInsight, NewReport, Report, ReportType, Transaction, UserId};
use crate::render::{DocumentRenderer, RendererClient, ReportDocument};
use crate::storage::{open_storage, Storage};

pub const DEFAULT_REPORT_TITLE: &str = "Financial Report";

/// A stored report together with its rendered document
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    pub document: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Narrative generator availability
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    pub backend: String,
    pub model: String,
    pub host: String,
    pub available: bool,
}

/// Backend configuration and per-user counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub storage: String,
    pub ai: Option<AiStatus>,
    pub renderer: Option<String>,
    pub transactions: usize,
    pub insights: usize,
    pub reports: usize,
}

pub struct FinanceService {
    storage: Arc<dyn Storage>,
    ai: Option<AIClient>,
    renderer: Option<RendererClient>,
    insight_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl FinanceService {
    pub fn new(
        storage: Arc<dyn Storage>,
        ai: Option<AIClient>,
        renderer: Option<RendererClient>,
    ) -> Self {
        Self {
            storage,
            ai,
            renderer,
            insight_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open storage and build the configured collaborators
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let storage = open_storage(&config.storage)?;
        let ai = AIClient::from_config(&config.ai)?;
        let renderer = RendererClient::from_config(&config.renderer)?;

        info!(
            storage = storage.name(),
            ai = ai.as_ref().map(|a| a.backend_name()).unwrap_or("none"),
            renderer = renderer.is_some(),
            "Finance service ready"
        );
        Ok(Self::new(storage, ai, renderer))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    pub fn renderer(&self) -> Option<&RendererClient> {
        self.renderer.as_ref()
    }

    /// Parse, validate and store a CSV upload in one step
    ///
    /// Returns the number of stored transactions. Nothing is stored unless
    /// every row normalizes.
    pub fn ingest_csv(&self, user_id: UserId, data: &[u8]) -> Result<usize> {
        let records = read_records(data)?;
        if !validate_records(&records) {
            return Err(Error::Validation(
                "No valid financial data found in file".into(),
            ));
        }

        let today = Utc::now().date_naive();
        let transactions = records
            .iter()
            .map(|r| normalize_record(r, user_id, today))
            .collect::<Result<Vec<_>>>()?;

        let count = self.storage.insert_transactions(&transactions)?;
        info!(user_id, count, "Imported financial records");
        Ok(count)
    }

    pub fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        self.storage.list_transactions(user_id)
    }

    /// Metrics over everything the user has stored (empty value when none)
    pub fn metrics(&self, user_id: UserId) -> Result<FinancialMetrics> {
        let transactions = self.storage.list_transactions(user_id)?;
        Ok(compute_metrics(&transactions))
    }

    pub fn forecast(&self, user_id: UserId) -> Result<Forecast> {
        Ok(forecast(&self.metrics(user_id)?))
    }

    pub fn insights(&self, user_id: UserId) -> Result<Vec<AiInsight>> {
        self.storage.list_insights(user_id)
    }

    /// Replace the user's insights with a freshly generated set
    pub async fn regenerate_insights(&self, user_id: UserId) -> Result<Vec<AiInsight>> {
        let ai = self.require_ai()?;

        let lock = self.insight_lock(user_id)?;
        let result = {
            let _guard = lock.lock().await;
            self.replace_insights_locked(ai, user_id).await
        };
        drop(lock);
        self.release_insight_lock(user_id);
        result
    }

    async fn replace_insights_locked(
        &self,
        ai: &AIClient,
        user_id: UserId,
    ) -> Result<Vec<AiInsight>> {
        let transactions = self.storage.list_transactions(user_id)?;
        if transactions.is_empty() {
            return Err(Error::NoData);
        }

        let summary = FinancialSummary::from_metrics(&compute_metrics(&transactions));
        let sample = recent_sample(&transactions, INSIGHT_SAMPLE_SIZE);
        debug!(user_id, sample = sample.len(), "Requesting insights");

        let generated = ai
            .generate_insights(&summary, &sample)
            .await
            .map_err(|e| wrap_generation(e, "Failed to generate AI insights"))?;

        let stored = self.storage.replace_insights(user_id, &generated)?;
        info!(user_id, count = stored.len(), "Regenerated insights");
        Ok(stored)
    }

    /// Generate, render and log a report
    ///
    /// Both the generator and the renderer must be configured before any
    /// external call is made. The report is stored only once its document
    /// rendered.
    pub async fn generate_report(
        &self,
        user_id: UserId,
        title: &str,
        report_type: ReportType,
    ) -> Result<GeneratedReport> {
        let ai = self.require_ai()?;
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| Error::NotConfigured("Document renderer".into()))?;

        let transactions = self.storage.list_transactions(user_id)?;
        if transactions.is_empty() {
            return Err(Error::NoData);
        }

        let summary = FinancialSummary::from_metrics(&compute_metrics(&transactions));
        let insights = self.storage.list_insights(user_id)?;

        let content = ai
            .generate_report(&summary, &insights, report_type)
            .await
            .map_err(|e| wrap_generation(e, "Failed to generate financial report"))?;

        let title = match title.trim() {
            "" => DEFAULT_REPORT_TITLE,
            t => t,
        };
        let document = ReportDocument {
            title: title.to_string(),
            report_type,
            content,
            generated_at: Utc::now(),
            summary,
        };
        let bytes = renderer.render(&document).await.map_err(|e| match e {
            Error::Render(_) | Error::Timeout(_) => e,
            other => Error::Render(format!("Failed to render report: {}", other)),
        })?;

        let report = self.storage.insert_report(&NewReport {
            user_id,
            title: document.title,
            content: document.content,
            report_type,
        })?;
        info!(user_id, report_id = report.id, bytes = bytes.len(), "Generated report");

        Ok(GeneratedReport {
            filename: report_filename(&report.title),
            content_type: renderer.content_type().to_string(),
            report,
            document: bytes,
        })
    }

    pub fn reports(&self, user_id: UserId) -> Result<Vec<Report>> {
        self.storage.list_reports(user_id)
    }

    pub async fn status(&self, user_id: UserId) -> Result<ServiceStatus> {
        let ai = match self.ai {
            Some(ref client) => Some(AiStatus {
                backend: client.backend_name().to_string(),
                model: client.model().to_string(),
                host: client.host().to_string(),
                available: client.health_check().await,
            }),
            None => None,
        };

        Ok(ServiceStatus {
            storage: self.storage.name().to_string(),
            ai,
            renderer: self.renderer.as_ref().map(|r| r.describe()),
            transactions: self.storage.count_transactions(user_id)?,
            insights: self.storage.list_insights(user_id)?.len(),
            reports: self.storage.list_reports(user_id)?.len(),
        })
    }

    fn require_ai(&self) -> Result<&AIClient> {
        self.ai
            .as_ref()
            .ok_or_else(|| Error::NotConfigured("AI backend".into()))
    }

    fn insight_lock(&self, user_id: UserId) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .insight_locks
            .lock()
            .map_err(|_| Error::InvalidData("insight lock table poisoned".into()))?;
        Ok(locks.entry(user_id).or_default().clone())
    }

    /// Drop the user's lock once no regeneration holds or awaits it
    fn release_insight_lock(&self, user_id: UserId) {
        if let Ok(mut locks) = self.insight_locks.lock() {
            if locks
                .get(&user_id)
                .is_some_and(|lock| Arc::strong_count(lock) == 1)
            {
                locks.remove(&user_id);
            }
        }
    }

    #[cfg(test)]
    fn insight_lock_count(&self) -> usize {
        self.insight_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// Timeouts stay retryable; every other failure becomes a generation error
fn wrap_generation(e: Error, context: &str) -> Error {
    match e {
        Error::Timeout(_) => e,
        other => {
            warn!(error = %other, "{}", context);
            Error::Generation(format!("{}: {}", context, other))
        }
    }
}

/// `Q1 Review` becomes `Q1_Review.pdf`
pub fn report_filename(title: &str) -> String {
    let stem: Vec<&str> = title.split_whitespace().collect();
    format!("{}.pdf", stem.join("_"))
}
