//! Server command implementation

use std::path::PathBuf;

use anyhow::Result;
use ledgerly_server::ServerConfig;

use super::Context;

pub async fn cmd_serve(
    ctx: Context,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    let settings = &ctx.config.server;
    let host = host.unwrap_or_else(|| settings.host.clone());
    let port = port.unwrap_or(settings.port);

    let mut config = ServerConfig::from_settings(settings, ctx.user_id);
    if static_dir.is_some() {
        config.static_dir = static_dir;
    }

    println!("🚀 Starting Ledgerly web server...");
    println!("   Storage: {}", ctx.config.storage.describe());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Default user: {}", config.default_user_id);
    if let Some(dir) = &config.static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !config.allowed_origins.is_empty() {
        println!("   CORS origins: {}", config.allowed_origins.join(", "));
    }
    if host != "127.0.0.1" && host != "localhost" {
        println!();
        println!("   ⚠️  No authentication - any caller can act as any user");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let service = ctx.service()?;
    ledgerly_server::serve(service, config, &host, port).await
}
