//! Totals and period bucketing

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::models::Transaction;

use super::types::{CategoryAmount, MonthlyBucket, WeeklyBucket};

/// Revenue, expenses and what is left over
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub revenue: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let (revenue, expenses) = transactions.iter().fold((0.0, 0.0), |(r, e), tx| {
        if tx.is_income() {
            (r + tx.amount, e)
        } else {
            (r, e + tx.amount)
        }
    });

    Totals {
        revenue,
        expenses,
        net_cash_flow: revenue - expenses,
    }
}

/// Months of average monthly spend covered by net cash flow
pub fn runway(totals: &Totals) -> f64 {
    if totals.expenses > 0.0 {
        (totals.net_cash_flow / (totals.expenses / 12.0)).max(0.0)
    } else {
        0.0
    }
}

/// Expense totals per category, in order of first appearance
pub fn expense_breakdown(transactions: &[Transaction]) -> Vec<CategoryAmount> {
    let mut breakdown: Vec<CategoryAmount> = Vec::new();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        match breakdown.iter_mut().find(|c| c.category == tx.category) {
            Some(entry) => entry.amount += tx.amount,
            None => breakdown.push(CategoryAmount {
                category: tx.category.clone(),
                amount: tx.amount,
            }),
        }
    }

    breakdown
}

/// Revenue and expenses per `YYYY-MM`, ascending
pub fn monthly_series(transactions: &[Transaction]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for tx in transactions {
        let entry = months
            .entry(tx.date.format("%Y-%m").to_string())
            .or_default();
        accumulate(entry, tx);
    }

    months
        .into_iter()
        .map(|(month, (revenue, expenses))| MonthlyBucket {
            month,
            revenue,
            expenses,
        })
        .collect()
}

/// Revenue and expenses per Sunday-aligned week, ascending by week start
pub fn weekly_series(transactions: &[Transaction]) -> Vec<WeeklyBucket> {
    let mut weeks: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for tx in transactions {
        accumulate(weeks.entry(week_start(tx.date)).or_default(), tx);
    }

    weeks
        .into_iter()
        .map(|(start, (revenue, expenses))| WeeklyBucket {
            week: start.format("%b %-d").to_string(),
            revenue,
            expenses,
        })
        .collect()
}

/// The Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Percent change from `previous` to `current`; zero when undefined
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let rate = (current - previous) / previous * 100.0;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}

/// Revenue and expense growth between the last two months
pub fn growth_rates(monthly: &[MonthlyBucket]) -> (f64, f64) {
    match monthly {
        [.., prev, last] => (
            growth_rate(last.revenue, prev.revenue),
            growth_rate(last.expenses, prev.expenses),
        ),
        _ => (0.0, 0.0),
    }
}

fn accumulate(bucket: &mut (f64, f64), tx: &Transaction) {
    if tx.is_income() {
        bucket.0 += tx.amount;
    } else {
        bucket.1 += tx.amount;
    }
}
