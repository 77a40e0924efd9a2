use anyhow::{Result, bail};

use super::constants::MAX_TEMPERATURE;
use super::types::Config;

pub fn validate(config: &Config) -> Result<()> {
    let llm = &config.llm;
    if llm.base_url.trim().is_empty() {
        bail!("Generation service URL is empty. Set SCOUT_LLM_BASE_URL or pass --llm-url");
    }
    if llm.model.trim().is_empty() {
        bail!("Model identifier is empty. Set SCOUT_MODEL or pass --model");
    }
    if !(0.0..=MAX_TEMPERATURE).contains(&llm.temperature) {
        bail!(
            "Temperature {} is out of range (expected 0.0 to {MAX_TEMPERATURE})",
            llm.temperature
        );
    }
    if llm.context_window == 0 {
        bail!("Context window must be greater than zero");
    }
    if llm.timeout_secs == 0 || config.search.timeout_secs == 0 {
        bail!("Timeouts must be greater than zero seconds");
    }
    if config.search.base_url.trim().is_empty() {
        bail!("Search service URL is empty. Set SCOUT_SEARCH_BASE_URL");
    }
    Ok(())
}
