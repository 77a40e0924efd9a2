use super::constants::*;
use super::types::{LlmSettings, SearchSettings};

pub fn default_user_agent() -> String {
    format!("scout/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            context_window: DEFAULT_CONTEXT_WINDOW,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }
}
