//! `civicdraft doctor` — Diagnose configuration and endpoint health.

use civicdraft_config::AppConfig;
use civicdraft_core::completion::CompletionBackend;
use civicdraft_providers::OpenAiCompatBackend;
use std::time::Duration;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("CivicDraft Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  [ok] Config file found: {}", config_path.display());
    } else {
        println!("  [--] No config file — run `civicdraft init` (defaults in effect)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok] Config valid");
            config
        }
        Err(e) => {
            println!("  [!!] Config invalid: {e}");
            println!("\n  1 issue found. See above for details.");
            return Ok(());
        }
    };

    match &config.api_key {
        Some(api_key) => {
            println!("  [ok] API key configured");
            let backend = OpenAiCompatBackend::new(
                "openai",
                &config.api_url,
                api_key,
                &config.model,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            match backend.health_check().await {
                Ok(true) => println!("  [ok] Completion endpoint reachable: {}", config.api_url),
                Ok(false) | Err(_) => {
                    println!("  [!!] Completion endpoint unreachable: {}", config.api_url);
                    issues += 1;
                }
            }
        }
        None => {
            println!("  [--] No API key — agent will run on keyword heuristics only");
            issues += 1;
        }
    }

    println!("  [..] Research endpoint: {}", config.tools.research_url);
    println!("  [..] Bill lookup endpoint: {}", config.tools.bills_url);

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
