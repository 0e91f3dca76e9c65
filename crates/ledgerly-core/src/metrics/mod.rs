//! Financial metrics engine
//!
//! A pure transformation from a flat list of dated transactions into
//! aggregate totals, monthly and weekly series, KPI ratios, trend
//! classification and rule-based target areas. No I/O happens here; the
//! same input always yields the same [`FinancialMetrics`].

mod aggregate;
mod kpis;
mod targets;
mod trends;
mod types;

pub use aggregate::{growth_rate, week_start};
pub use kpis::ESTIMATED_CHURN_RATE;
pub use types::{
    CategoryAmount, FinancialMetrics, FinancialSummary, Kpis, MonthlyBucket, Priority,
    SeasonalityFactor, TargetArea, TrendDirection, Trends, WeeklyBucket,
};

use tracing::debug;

use crate::models::Transaction;

/// Derive every metric from a user's full transaction collection
pub fn compute_metrics(transactions: &[Transaction]) -> FinancialMetrics {
    if transactions.is_empty() {
        return FinancialMetrics::empty();
    }

    let totals = aggregate::totals(transactions);
    let runway = aggregate::runway(&totals);
    let expense_breakdown = aggregate::expense_breakdown(transactions);
    let monthly_data = aggregate::monthly_series(transactions);
    let weekly_data = aggregate::weekly_series(transactions);
    let kpis = kpis::calculate_kpis(transactions, &totals);
    let trends = trends::identify_trends(&monthly_data);
    let target_areas = targets::identify_target_areas(&expense_breakdown, &kpis);
    let (revenue_growth_rate, expense_growth_rate) = aggregate::growth_rates(&monthly_data);

    debug!(
        transactions = transactions.len(),
        months = monthly_data.len(),
        weeks = weekly_data.len(),
        target_areas = target_areas.len(),
        "Computed financial metrics"
    );

    FinancialMetrics {
        total_revenue: totals.revenue,
        total_expenses: totals.expenses,
        net_cash_flow: totals.net_cash_flow,
        runway,
        revenue_growth_rate,
        expense_growth_rate,
        monthly_data,
        weekly_data,
        expense_breakdown,
        kpis,
        trends,
        target_areas,
    }
}
