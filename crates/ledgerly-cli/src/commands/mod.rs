//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared context (config, storage, user) and init
//! - `import` - CSV import, transaction listing, sample template
//! - `insights` - AI insight listing and regeneration
//! - `metrics` - Metrics and forecast
//! - `prompts` - Prompt library management commands
//! - `reports` - Report generation commands
//! - `serve` - Web server command
//! - `status` - Storage, AI backend and renderer status

pub mod core;
pub mod import;
pub mod insights;
pub mod metrics;
pub mod prompts;
pub mod reports;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use self::core::*;
pub use import::*;
pub use insights::*;
pub use metrics::*;
pub use prompts::*;
pub use reports::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
