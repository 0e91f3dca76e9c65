//! Metrics and forecast commands

use anyhow::{Context as _, Result};
use ledgerly_core::format::{format_compact_currency, format_currency, format_percentage};

use super::Context;

pub fn cmd_metrics(ctx: &Context, json: bool) -> Result<()> {
    let service = ctx.service()?;
    let m = service.metrics(ctx.user_id)?;

    if json {
        let out = serde_json::to_string_pretty(&m).context("Failed to serialize metrics")?;
        println!("{}", out);
        return Ok(());
    }

    if m.is_empty() {
        println!("No financial data yet. Import some with: ledgerly import --file FILE");
        return Ok(());
    }

    println!();
    println!("📊 Financial Metrics");
    println!("   ─────────────────────────────");
    println!("   Revenue:        {}", format_currency(m.total_revenue));
    println!("   Expenses:       {}", format_currency(m.total_expenses));
    println!("   Net cash flow:  {}", format_currency(m.net_cash_flow));
    println!("   Runway:         {:.1} months", m.runway);
    println!(
        "   Growth:         revenue {}, expenses {}",
        format_percentage(m.revenue_growth_rate),
        format_percentage(m.expense_growth_rate)
    );

    println!();
    println!("   Gross margin:     {:.1}%", m.kpis.gross_margin);
    println!("   Operating margin: {:.1}%", m.kpis.operating_margin);
    println!("   Burn rate:        {}/mo", format_currency(m.kpis.burn_rate));
    println!(
        "   Trends:           revenue {}, expenses {}",
        m.trends.revenue_direction.as_str(),
        m.trends.expense_direction.as_str()
    );

    println!();
    println!("   {:<8} {:>12} {:>12}", "MONTH", "REVENUE", "EXPENSES");
    for bucket in &m.monthly_data {
        println!(
            "   {:<8} {:>12} {:>12}",
            bucket.month,
            format_compact_currency(bucket.revenue),
            format_compact_currency(bucket.expenses)
        );
    }

    if !m.expense_breakdown.is_empty() {
        println!();
        println!("   Expense breakdown:");
        for c in &m.expense_breakdown {
            let share = if m.total_expenses > 0.0 {
                c.amount / m.total_expenses * 100.0
            } else {
                0.0
            };
            println!(
                "     {:<24} {:>12} ({:.0}%)",
                c.category,
                format_currency(c.amount),
                share
            );
        }
    }

    if !m.target_areas.is_empty() {
        println!();
        println!("⚠️  Target areas:");
        for area in &m.target_areas {
            println!(
                "   [{}] {}: {}",
                area.priority.as_str(),
                area.category,
                area.issue
            );
            println!("         → {}", area.recommendation);
        }
    }

    Ok(())
}

pub fn cmd_forecast(ctx: &Context) -> Result<()> {
    let service = ctx.service()?;
    let f = service.forecast(ctx.user_id)?;

    println!();
    println!("🔮 Forecast");
    println!("   ─────────────────────────────");
    println!(
        "   Next month:  revenue {}, expenses {}",
        format_currency(f.next_month_revenue),
        format_currency(f.next_month_expenses)
    );
    println!(
        "   Next quarter: net {}",
        format_currency(f.quarterly_forecast.net_cash_flow)
    );
    println!(
        "   Next year:   net {}",
        format_currency(f.yearly_forecast.net_cash_flow)
    );
    println!("   Burn rate:   {}/mo", format_currency(f.burn_rate));
    println!("   Runway:      {:.1} months", f.runway_months);

    Ok(())
}
