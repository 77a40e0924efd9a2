use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::ConfigBuilder;

use super::commands;

/// Entry point for the `scout` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "scout",
    about = "Multi-stage AI research: plan, search, analyze, fact-check, write, summarize",
    version,
    long_about = None
)]
pub struct Cli {
    /// Optional subcommand (e.g., `check`)
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// Print the full outcome as JSON instead of the formatted report
    #[arg(long)]
    pub json: bool,

    /// Log stage progress to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Research question: words typed after `scout`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Update settings and save them to the config file.
    Config(ConfigArgs),
    /// Test connectivity to the generation service and report search mode.
    Check,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Settings that can be overridden for one run or saved with `scout config`.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Model identifier on the generation service
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generation service
    #[arg(long = "llm-url")]
    pub llm_url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Context window size requested from the model
    #[arg(long = "context-window")]
    pub context_window: Option<u32>,

    /// Request timeout for the generation service, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Search API key (omit to use mock search results)
    #[arg(long = "tavily-key")]
    pub tavily_key: Option<String>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.llm_url.is_none()
            && self.temperature.is_none()
            && self.context_window.is_none()
            && self.timeout.is_none()
            && self.tavily_key.is_none()
    }

    pub fn apply(&self, builder: ConfigBuilder) -> ConfigBuilder {
        builder
            .with_llm(|llm| {
                if let Some(model) = &self.model {
                    llm.model = model.clone();
                }
                if let Some(url) = &self.llm_url {
                    llm.base_url = url.clone();
                }
                if let Some(temperature) = self.temperature {
                    llm.temperature = temperature;
                }
                if let Some(context_window) = self.context_window {
                    llm.context_window = context_window;
                }
                if let Some(timeout) = self.timeout {
                    llm.timeout_secs = timeout;
                }
            })
            .with_search(|search| {
                if let Some(key) = &self.tavily_key {
                    search.api_key = Some(key.clone());
                }
            })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::run(self).await
    }
}
