use anyhow::{Context, Result};
use colored::*;

use crate::client::OllamaClient;
use crate::config::Config;
use crate::research::{ResearchEngine, ResearchError};

use super::args::{Cli, Command, Overrides};
use super::render;
use super::util::mask_api_key;

pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Config(args)) => handle_config(&args.overrides),
        Some(Command::Check) => handle_check(&load_config(&cli.overrides)?).await,
        None => {
            let query = cli.query.join(" ").trim().to_owned();
            if query.is_empty() {
                show_welcome_message()?;
                return Ok(());
            }
            let config = load_config(&cli.overrides)?;
            handle_research(&query, &config, cli.json).await
        }
    }
}

fn load_config(overrides: &Overrides) -> Result<Config> {
    overrides
        .apply(Config::load_builder()?)
        .build()
        .context("Invalid configuration")
}

async fn handle_research(query: &str, config: &Config, json: bool) -> Result<()> {
    let engine = ResearchEngine::from_config(config)?;

    if !json {
        render::header(query, config);
    }

    let outcome = match engine.research(query).await {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("{}", "❌ Research failed".bold().red());
            eprintln!("   {}", failure_guidance(&error, config));
            return Err(error.into());
        }
    };

    if json {
        let body = serde_json::to_string_pretty(&outcome)
            .context("Failed to serialize research outcome")?;
        println!("{body}");
    } else {
        render::outcome(&outcome);
    }
    Ok(())
}

fn failure_guidance(error: &ResearchError, config: &Config) -> String {
    match error {
        ResearchError::Stage { .. } => format!(
            "Check that the generation service at {} is running and the model '{}' is available, then retry.",
            config.llm.base_url, config.llm.model
        ),
        ResearchError::EmptyQuery => "Provide a research question, e.g. scout \"state of fusion energy\"".to_string(),
        ResearchError::IllegalTransition { .. } | ResearchError::StepLimit { .. } => {
            "The workflow stopped unexpectedly. Retry the run; report the issue if it persists.".to_string()
        }
    }
}

fn handle_config(overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(Config::load_builder()?).build()?;
    if !overrides.is_empty() {
        config.save()?;
        println!(
            "✅ Configuration saved to {}",
            Config::config_path()?.display()
        );
    }

    println!("📋 Current configuration:");
    println!("   Generation URL: {}", config.llm.base_url);
    println!("   Model: {}", config.llm.model);
    println!("   Temperature: {}", config.llm.temperature);
    println!("   Context Window: {}", config.llm.context_window);
    println!("   Timeout: {}s", config.llm.timeout_secs);
    println!(
        "   Search API Key: {}",
        mask_api_key(config.search.api_key.as_deref())
    );
    Ok(())
}

async fn handle_check(config: &Config) -> Result<()> {
    let client = OllamaClient::new(&config.llm)?;

    match client.list_models().await {
        Ok(models) => {
            println!("{} {}", "✅ Connected to".green(), client.base_url());
            if models.iter().any(|name| name == client.model()) {
                println!("   Model '{}' is available", client.model());
            } else {
                println!(
                    "   {} model '{}' is not pulled (available: {})",
                    "⚠️".yellow(),
                    client.model(),
                    if models.is_empty() { "none".to_string() } else { models.join(", ") }
                );
            }
        }
        Err(error) => {
            println!("{} {}", "❌ Cannot reach".red(), client.base_url());
            println!("   {error:#}");
        }
    }

    if config.search.is_configured() {
        println!(
            "✅ Web search enabled (key {})",
            mask_api_key(config.search.api_key.as_deref())
        );
    } else {
        println!("⚠️  No search API key: web search will use mock data (set TAVILY_API_KEY)");
    }
    Ok(())
}

fn show_welcome_message() -> Result<()> {
    let config_path = Config::config_path()?;

    println!("🧠 scout - multi-stage AI research orchestrator");
    println!();
    println!("📖 What scout does:");
    println!("   • Plans a research strategy for your question");
    println!("   • Searches the web, analyzes findings and loops until confident");
    println!("   • Fact-checks, writes a structured report and a visual summary");
    println!();
    println!("🚀 Usage:");
    println!("   scout \"What are the latest developments in quantum computing?\"");
    println!("   scout --json \"How is AI transforming healthcare?\"");
    println!("   scout check");
    println!("   scout config --model llama3.2:latest --tavily-key <key>");
    println!();
    if !config_path.exists() {
        println!("⚙️  No config file yet; defaults and environment variables are used.");
    }
    Ok(())
}
