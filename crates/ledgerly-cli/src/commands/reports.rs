//! Report generation and listing commands

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use ledgerly_core::ReportType;

use super::{truncate, Context};

pub async fn cmd_report(
    ctx: &Context,
    title: Option<&str>,
    report_type: &str,
    out: Option<&Path>,
) -> Result<()> {
    let report_type: ReportType = report_type.parse().map_err(|e: String| anyhow!(e))?;
    let service = ctx.service()?;

    println!("📝 Generating {} report...", report_type);

    let generated = service
        .generate_report(ctx.user_id, title.unwrap_or_default(), report_type)
        .await
        .context("Report generation failed")?;

    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| generated.filename.clone().into());
    std::fs::write(&path, &generated.document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "✅ \"{}\" saved to {} ({} bytes, {})",
        generated.report.title,
        path.display(),
        generated.document.len(),
        generated.content_type
    );
    Ok(())
}

pub fn cmd_reports(ctx: &Context) -> Result<()> {
    let service = ctx.service()?;
    let reports = service.reports(ctx.user_id)?;

    if reports.is_empty() {
        println!("No reports yet. Generate one with: ledgerly report --title \"Q1 Review\"");
        return Ok(());
    }

    println!();
    println!("{:>5}  {:<16}  {:<10}  {}", "ID", "GENERATED", "TYPE", "TITLE");
    println!("{}", "-".repeat(72));
    for report in &reports {
        println!(
            "{:>5}  {:<16}  {:<10}  {}",
            report.id,
            report.generated_at.format("%Y-%m-%d %H:%M"),
            report.report_type.as_str(),
            truncate(&report.title, 36)
        );
    }

    Ok(())
}
