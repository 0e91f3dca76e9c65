//! Status command implementation

use anyhow::Result;

use super::Context;

pub async fn cmd_status(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    println!();
    println!("📊 Ledgerly Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Storage: {}", config.storage.describe());

    if let Some(path) = ctx.db_path() {
        match std::fs::metadata(path) {
            Ok(metadata) => {
                let size_kb = metadata.len() as f64 / 1024.0;
                if size_kb < 1024.0 {
                    println!("   Size: {:.1} KB", size_kb);
                } else {
                    println!("   Size: {:.1} MB", size_kb / 1024.0);
                }
            }
            Err(_) => println!("   Size: (database not initialized)"),
        }
    }

    let service = match ctx.service() {
        Ok(service) => service,
        Err(e) => {
            println!();
            println!("   ❌ Error opening storage: {:#}", e);
            println!();
            return Ok(());
        }
    };

    let status = service.status(ctx.user_id).await?;

    println!();
    match &status.ai {
        Some(ai) if ai.available => println!(
            "   🤖 AI backend: {} ({} at {})",
            ai.backend, ai.model, ai.host
        ),
        Some(ai) => println!(
            "   ⚠️  AI backend: {} configured but not responding at {}",
            ai.backend, ai.host
        ),
        None => println!("   💡 AI backend: not configured (set OLLAMA_HOST)"),
    }
    match &status.renderer {
        Some(renderer) => println!("   📄 Renderer: {}", renderer),
        None => println!("   💡 Renderer: not configured (set LEDGERLY_RENDERER_URL)"),
    }

    println!();
    println!("   User: {}", ctx.user_id);
    println!("   Transactions: {}", status.transactions);
    println!("   Insights: {}", status.insights);
    println!("   Reports: {}", status.reports);
    println!();

    Ok(())
}
