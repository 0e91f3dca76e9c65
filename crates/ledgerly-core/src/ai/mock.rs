//! Mock backend for testing
//!
//! Produces deterministic insights and reports derived from the summary, so
//! tests and demo mode work without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::format::{format_currency, format_percentage};
use crate::metrics::FinancialSummary;
use crate::models::{AiInsight, GeneratedInsight, InsightType, ReportType, Transaction};

use super::AIBackend;

#[derive(Clone, Debug, Default)]
enum Behavior {
    #[default]
    Succeed,
    Fail(String),
    Timeout,
}

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// A backend whose generation calls fail with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            healthy: true,
            behavior: Behavior::Fail(message.to_string()),
            ..Self::default()
        }
    }

    /// A backend whose generation calls time out
    pub fn timing_out() -> Self {
        Self {
            healthy: true,
            behavior: Behavior::Timeout,
            ..Self::default()
        }
    }

    /// Generation calls made so far, shared across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(Error::Generation(message.clone())),
            Behavior::Timeout => Err(Error::Timeout("mock backend".into())),
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate_insights(
        &self,
        summary: &FinancialSummary,
        sample: &[Transaction],
    ) -> Result<Vec<GeneratedInsight>> {
        self.begin_call()?;

        let cash_flow = if summary.net_cash_flow >= 0.0 {
            GeneratedInsight {
                title: "Positive cash flow".into(),
                content: format!(
                    "Net cash flow is {} with {:.1} months of runway.",
                    format_currency(summary.net_cash_flow),
                    summary.runway
                ),
                insight_type: InsightType::Positive,
            }
        } else {
            GeneratedInsight {
                title: "Negative cash flow".into(),
                content: format!(
                    "Spending exceeds income by {}.",
                    format_currency(-summary.net_cash_flow)
                ),
                insight_type: InsightType::Warning,
            }
        };

        let expenses = GeneratedInsight {
            title: "Expense growth".into(),
            content: format!(
                "Expenses changed {} month over month.",
                format_percentage(summary.expense_growth_rate)
            ),
            insight_type: if summary.expense_growth_rate > summary.revenue_growth_rate {
                InsightType::Warning
            } else {
                InsightType::Info
            },
        };

        let revenue = GeneratedInsight {
            title: "Revenue trend".into(),
            content: format!(
                "Revenue changed {} across {} recent transactions.",
                format_percentage(summary.revenue_growth_rate),
                sample.len()
            ),
            insight_type: InsightType::Info,
        };

        Ok(vec![cash_flow, expenses, revenue])
    }

    async fn generate_report(
        &self,
        summary: &FinancialSummary,
        insights: &[AiInsight],
        report_type: ReportType,
    ) -> Result<String> {
        self.begin_call()?;

        let mut body = format!(
            "# Executive Summary\n\nThis {} report covers {} in revenue and {} in expenses.\n\n\
             # Financial Performance Overview\n\nNet cash flow: {}. Runway: {:.1} months.\n",
            report_type,
            format_currency(summary.total_revenue),
            format_currency(summary.total_expenses),
            format_currency(summary.net_cash_flow),
            summary.runway
        );
        if !insights.is_empty() {
            body.push_str("\n# Insights and Recommendations\n\n");
            for insight in insights {
                body.push_str(&format!("- {}: {}\n", insight.title, insight.content));
            }
        }

        Ok(body)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(net: f64) -> FinancialSummary {
        FinancialSummary {
            total_revenue: 5000.0,
            total_expenses: 5000.0 - net,
            net_cash_flow: net,
            average_monthly_revenue: 416.67,
            average_monthly_expenses: 208.33,
            revenue_growth_rate: 0.0,
            expense_growth_rate: 10.0,
            runway: 12.0,
        }
    }

    #[tokio::test]
    async fn test_three_deterministic_insights() {
        let mock = MockBackend::new();
        let first = mock.generate_insights(&summary(2500.0), &[]).await.unwrap();
        let second = mock.generate_insights(&summary(2500.0), &[]).await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[0].insight_type, InsightType::Positive);
        assert_eq!(first[1].insight_type, InsightType::Warning);
        assert_eq!(mock.clone().calls(), 2);
    }

    #[tokio::test]
    async fn test_negative_cash_flow_warns() {
        let insights = MockBackend::new()
            .generate_insights(&summary(-1000.0), &[])
            .await
            .unwrap();
        assert_eq!(insights[0].title, "Negative cash flow");
        assert!(insights[0].content.contains("$1,000"));
    }

    #[tokio::test]
    async fn test_report_mentions_type_and_insights() {
        let insight = AiInsight {
            id: 1,
            user_id: 1,
            title: "Runway".into(),
            content: "Twelve months".into(),
            insight_type: InsightType::Info,
            generated_at: chrono::Utc::now(),
        };
        let body = MockBackend::new()
            .generate_report(&summary(2500.0), &[insight], ReportType::Quarterly)
            .await
            .unwrap();
        assert!(body.starts_with("# Executive Summary"));
        assert!(body.contains("quarterly report"));
        assert!(body.contains("- Runway: Twelve months"));
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let err = MockBackend::failing("model exploded")
            .generate_insights(&summary(0.0), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m == "model exploded"));

        let err = MockBackend::timing_out()
            .generate_report(&summary(0.0), &[], ReportType::Monthly)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_health() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
