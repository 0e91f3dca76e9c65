//! Forward projection from current metrics
//!
//! Monthly baselines are the annualized totals (total / 12), grown by the
//! most recent month-over-month growth rate.

use serde::{Deserialize, Serialize};

use crate::metrics::FinancialMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PeriodForecast {
    pub revenue: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
}

impl PeriodForecast {
    fn scaled(revenue: f64, expenses: f64, months: f64) -> Self {
        let revenue = revenue * months;
        let expenses = expenses * months;
        Self {
            revenue,
            expenses,
            net_cash_flow: revenue - expenses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub next_month_revenue: f64,
    pub next_month_expenses: f64,
    pub quarterly_forecast: PeriodForecast,
    pub yearly_forecast: PeriodForecast,
    /// Average monthly expenses minus average monthly revenue
    pub burn_rate: f64,
    pub runway_months: f64,
}

pub fn forecast(metrics: &FinancialMetrics) -> Forecast {
    if metrics.is_empty() {
        return Forecast::default();
    }

    let monthly_revenue = metrics.total_revenue / 12.0;
    let monthly_expenses = metrics.total_expenses / 12.0;

    let next_month_revenue = monthly_revenue * (1.0 + metrics.revenue_growth_rate / 100.0);
    let next_month_expenses = monthly_expenses * (1.0 + metrics.expense_growth_rate / 100.0);

    Forecast {
        next_month_revenue,
        next_month_expenses,
        quarterly_forecast: PeriodForecast::scaled(next_month_revenue, next_month_expenses, 3.0),
        yearly_forecast: PeriodForecast::scaled(next_month_revenue, next_month_expenses, 12.0),
        burn_rate: monthly_expenses - monthly_revenue,
        runway_months: metrics.runway,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MonthlyBucket;

    #[test]
    fn test_empty_metrics_forecast_zero() {
        assert_eq!(forecast(&FinancialMetrics::empty()), Forecast::default());
    }

    #[test]
    fn test_growth_applied_to_monthly_baseline() {
        let metrics = FinancialMetrics {
            total_revenue: 12000.0,
            total_expenses: 6000.0,
            net_cash_flow: 6000.0,
            runway: 12.0,
            revenue_growth_rate: 10.0,
            expense_growth_rate: -50.0,
            monthly_data: vec![MonthlyBucket::default()],
            ..Default::default()
        };
        let f = forecast(&metrics);

        assert!((f.next_month_revenue - 1100.0).abs() < 1e-9);
        assert!((f.next_month_expenses - 250.0).abs() < 1e-9);
        assert!((f.quarterly_forecast.revenue - 3300.0).abs() < 1e-9);
        assert!((f.quarterly_forecast.net_cash_flow - 2550.0).abs() < 1e-9);
        assert!((f.yearly_forecast.expenses - 3000.0).abs() < 1e-9);
        assert_eq!(f.burn_rate, -500.0);
        assert_eq!(f.runway_months, 12.0);
    }
}
