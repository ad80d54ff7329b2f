//! `civicdraft draft` — One agent turn against a markdown document.

use civicdraft_agent::PolicyAgent;
use civicdraft_config::AppConfig;
use civicdraft_core::completion::CompletionBackend;
use civicdraft_core::document::Document;
use civicdraft_providers::OpenAiCompatBackend;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(
    message: &str,
    file: &Path,
    title: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let backend: Option<Arc<dyn CompletionBackend>> = match &config.api_key {
        Some(api_key) => {
            let backend = OpenAiCompatBackend::new(
                "openai",
                &config.api_url,
                api_key,
                &config.model,
                Duration::from_secs(config.request_timeout_secs),
            )
            .map_err(|e| format!("Failed to build completion backend: {e}"))?;
            Some(Arc::new(backend))
        }
        None => {
            eprintln!("  No API key configured — running on keyword heuristics only.");
            eprintln!(
                "  Set CIVICDRAFT_API_KEY or add api_key to {}",
                AppConfig::config_dir().join("config.toml").display()
            );
            None
        }
    };

    let registry = Arc::new(civicdraft_tools::default_registry(
        &config.tools.research_url,
        &config.tools.bills_url,
        Duration::from_secs(config.tools.timeout_secs),
    ));

    let agent = PolicyAgent::with_settings(
        backend,
        registry,
        Duration::from_secs(config.tools.timeout_secs),
        config.classify_temperature,
        config.synthesize_temperature,
        config.max_tokens,
    );

    let content = if file.exists() {
        std::fs::read_to_string(file)?
    } else {
        String::new()
    };
    let title = title
        .or_else(|| {
            file.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Untitled Proposal".to_string());
    let document = Document::new(title, content);

    eprint!("  Thinking...");
    let response = agent.process(message, &document, &[]).await;
    eprint!("\r              \r");

    println!("{}", response.reply);

    if !response.tools_used.is_empty() {
        println!();
        println!("  Tools used: {}", response.tools_used.join(", "));
    }

    if let Some(updated) = response.updated_document {
        std::fs::write(file, &updated.content)?;
        println!("  Updated {}", file.display());
    }

    Ok(())
}
