//! AI insight command

use anyhow::{Context as _, Result};
use ledgerly_core::{AIBackend, InsightType};

use super::Context;

pub async fn cmd_insights(ctx: &Context, regenerate: bool) -> Result<()> {
    let service = ctx.service()?;

    let insights = if regenerate {
        if let Some(client) = service.ai() {
            println!("🤖 Generating insights with {} ({})...", client.model(), client.host());
        }
        service
            .regenerate_insights(ctx.user_id)
            .await
            .context("Insight generation failed")?
    } else {
        service.insights(ctx.user_id)?
    };

    if insights.is_empty() {
        println!("No insights yet. Generate some with: ledgerly insights --regenerate");
        return Ok(());
    }

    println!();
    for insight in &insights {
        let icon = match insight.insight_type {
            InsightType::Positive => "✅",
            InsightType::Warning => "⚠️ ",
            InsightType::Info => "💡",
        };
        println!("{} {}", icon, insight.title);
        println!("   {}", insight.content);
        println!();
    }
    println!(
        "Generated {}",
        insights[0].generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}
