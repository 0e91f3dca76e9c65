//! Prompts-related command implementations

use std::path::PathBuf;

use anyhow::{bail, Result};
use ledgerly_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

use super::Context;

fn override_dir(ctx: &Context) -> Option<PathBuf> {
    ctx.config
        .ai
        .prompts_dir
        .clone()
        .or_else(default_prompts_dir)
}

fn library(ctx: &Context) -> PromptLibrary {
    match override_dir(ctx) {
        Some(dir) => PromptLibrary::with_override_dir(dir),
        None => PromptLibrary::embedded_only(),
    }
}

/// Resolve a prompt ID given on the command line
pub fn parse_prompt_id(value: &str) -> Option<PromptId> {
    PromptId::all()
        .iter()
        .copied()
        .find(|id| id.as_str() == value)
}

/// List all available prompts and their override status
pub fn cmd_prompts_list(ctx: &Context) -> Result<()> {
    let mut library = library(ctx);

    println!("Available Prompts:\n");
    println!(
        "{:<24} {:>7}  {:<22}  {}",
        "ID", "VERSION", "TASK TYPE", "OVERRIDE"
    );
    println!("{}", "-".repeat(68));

    for id in PromptId::all() {
        let prompt = library.get(*id)?;
        let override_status = if prompt.is_override {
            "✓ Custom"
        } else {
            "Default"
        };
        println!(
            "{:<24} {:>7}  {:<22}  {}",
            id.as_str(),
            prompt.metadata.version,
            prompt.metadata.task_type,
            override_status
        );
    }

    println!();
    println!(
        "Override directory: {}",
        override_dir(ctx)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!();
    println!("To customize a prompt, place <id>.md in the override directory and restart the server.");

    Ok(())
}

/// Show the content of a specific prompt
pub fn cmd_prompts_show(ctx: &Context, prompt_id: &str) -> Result<()> {
    let Some(id) = parse_prompt_id(prompt_id) else {
        let known: Vec<&str> = PromptId::all().iter().map(|id| id.as_str()).collect();
        bail!(
            "Unknown prompt ID: {} (available: {})",
            prompt_id,
            known.join(", ")
        );
    };

    let mut library = library(ctx);
    let prompt = library.get(id)?;

    println!("Prompt: {}", prompt.metadata.id);
    println!("Version: {}", prompt.metadata.version);
    println!("Task Type: {}", prompt.metadata.task_type);
    println!(
        "Source: {}",
        if prompt.is_override {
            "Override"
        } else {
            "Default"
        }
    );
    println!();
    println!("--- Content ---");
    println!("{}", prompt.content);

    Ok(())
}

/// Show the path where prompt overrides should be placed
pub fn cmd_prompts_path(ctx: &Context) -> Result<()> {
    match override_dir(ctx) {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!();
                eprintln!("Note: This directory does not exist yet.");
                eprintln!("Create it to start adding custom prompts.");
            }
        }
        None => {
            eprintln!("Could not determine prompts directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
