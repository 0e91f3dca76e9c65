//! Shapes produced by the metrics engine
//!
//! Everything serializes in camelCase since these are handed straight to
//! the dashboard and to prompt rendering.

use serde::{Deserialize, Serialize};

/// Revenue and expenses accumulated for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
}

/// Revenue and expenses accumulated for one Sunday-aligned week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeeklyBucket {
    /// Short label of the week start, e.g. `Jan 14`
    pub week: String,
    pub revenue: f64,
    pub expenses: f64,
}

/// Total spend in one expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub gross_margin: f64,
    pub operating_margin: f64,
    /// Monthly; positive means spending more than earning
    pub burn_rate: f64,
    pub customer_acquisition_cost: f64,
    pub average_revenue_per_user: f64,
    pub churn_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Revenue of one monthly bucket relative to the mean bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityFactor {
    /// 1-based position in the monthly series
    pub month: u32,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub revenue_direction: TrendDirection,
    pub expense_direction: TrendDirection,
    pub seasonality: Vec<SeasonalityFactor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rule-based recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetArea {
    pub category: String,
    pub issue: String,
    pub priority: Priority,
    pub recommendation: String,
}

/// Everything derived from a user's transactions
///
/// This is a pure view. It is recomputed from the full collection on every
/// request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    /// Months of expenses covered by net cash flow, never negative
    pub runway: f64,
    pub revenue_growth_rate: f64,
    pub expense_growth_rate: f64,
    pub monthly_data: Vec<MonthlyBucket>,
    pub weekly_data: Vec<WeeklyBucket>,
    pub expense_breakdown: Vec<CategoryAmount>,
    pub kpis: Kpis,
    pub trends: Trends,
    pub target_areas: Vec<TargetArea>,
}

impl FinancialMetrics {
    /// The canonical value for a user with no transactions
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.monthly_data.is_empty()
    }
}

/// Condensed figures handed to the narrative generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    pub average_monthly_revenue: f64,
    pub average_monthly_expenses: f64,
    pub revenue_growth_rate: f64,
    pub expense_growth_rate: f64,
    pub runway: f64,
}

impl FinancialSummary {
    /// Averages are annualized over twelve months regardless of how many
    /// months of data exist.
    pub fn from_metrics(metrics: &FinancialMetrics) -> Self {
        Self {
            total_revenue: metrics.total_revenue,
            total_expenses: metrics.total_expenses,
            net_cash_flow: metrics.net_cash_flow,
            average_monthly_revenue: metrics.total_revenue / 12.0,
            average_monthly_expenses: metrics.total_expenses / 12.0,
            revenue_growth_rate: metrics.revenue_growth_rate,
            expense_growth_rate: metrics.expense_growth_rate,
            runway: metrics.runway,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics_shape() {
        let json = serde_json::to_value(FinancialMetrics::empty()).unwrap();
        assert_eq!(json["totalRevenue"], 0.0);
        assert_eq!(json["monthlyData"], serde_json::json!([]));
        assert_eq!(json["trends"]["revenueDirection"], "stable");
        assert_eq!(json["trends"]["expenseDirection"], "stable");
        assert_eq!(json["kpis"]["churnRate"], 0.0);
        assert_eq!(json["targetAreas"], serde_json::json!([]));
    }

    #[test]
    fn test_summary_uses_engine_growth_rates() {
        let metrics = FinancialMetrics {
            total_revenue: 12000.0,
            total_expenses: 6000.0,
            net_cash_flow: 6000.0,
            runway: 12.0,
            revenue_growth_rate: -4.0,
            expense_growth_rate: 11.5,
            ..Default::default()
        };
        let summary = FinancialSummary::from_metrics(&metrics);
        assert_eq!(summary.average_monthly_revenue, 1000.0);
        assert_eq!(summary.average_monthly_expenses, 500.0);
        assert_eq!(summary.revenue_growth_rate, -4.0);
        assert_eq!(summary.expense_growth_rate, 11.5);
        assert_eq!(summary.runway, 12.0);
    }
}
