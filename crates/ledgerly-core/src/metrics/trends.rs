//! Trend direction and seasonality over the monthly series

use super::types::{MonthlyBucket, SeasonalityFactor, TrendDirection, Trends};

/// Revenue slope beyond which the trend counts as moving
const REVENUE_SLOPE_THRESHOLD: f64 = 500.0;
const EXPENSE_SLOPE_THRESHOLD: f64 = 200.0;

/// Months needed before a direction is reported
const MIN_MONTHS: usize = 3;

fn direction(first: f64, last: f64, threshold: f64) -> TrendDirection {
    let slope = (last - first) / 2.0;
    if slope > threshold {
        TrendDirection::Increasing
    } else if slope < -threshold {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

pub fn identify_trends(monthly: &[MonthlyBucket]) -> Trends {
    if monthly.len() < MIN_MONTHS {
        return Trends::default();
    }

    let recent = &monthly[monthly.len() - MIN_MONTHS..];
    let (first, last) = (&recent[0], &recent[MIN_MONTHS - 1]);

    Trends {
        revenue_direction: direction(first.revenue, last.revenue, REVENUE_SLOPE_THRESHOLD),
        expense_direction: direction(first.expenses, last.expenses, EXPENSE_SLOPE_THRESHOLD),
        seasonality: seasonality(monthly),
    }
}

fn seasonality(monthly: &[MonthlyBucket]) -> Vec<SeasonalityFactor> {
    let mean = monthly.iter().map(|m| m.revenue).sum::<f64>() / monthly.len() as f64;
    let mean = if mean == 0.0 { 1.0 } else { mean };

    monthly
        .iter()
        .enumerate()
        .map(|(i, m)| SeasonalityFactor {
            month: i as u32 + 1,
            factor: m.revenue / mean,
        })
        .collect()
}
