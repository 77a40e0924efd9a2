use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub llm: LlmSettings,
    pub search: SearchSettings,
}

/// Connection settings for the language-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Context window (`num_ctx`) requested from the model.
    pub context_window: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Connection settings for the web-search service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// `None` puts the search stage in mock mode.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SearchSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
pub(super) struct FileConfig {
    #[serde(default)]
    pub llm: Option<FileLlmSettings>,
    #[serde(default)]
    pub search: Option<FileSearchSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileLlmSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub context_window: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileSearchSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Serialization helpers
#[derive(Serialize)]
pub(super) struct PersistedConfig<'a> {
    pub llm: PersistedLlm<'a>,
    pub search: PersistedSearch<'a>,
}

#[derive(Serialize)]
pub(super) struct PersistedLlm<'a> {
    pub base_url: &'a str,
    pub model: &'a str,
    pub temperature: f32,
    pub context_window: u32,
    pub timeout_secs: u64,
    pub user_agent: &'a str,
}

#[derive(Serialize)]
pub(super) struct PersistedSearch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
    pub base_url: &'a str,
    pub timeout_secs: u64,
}

impl<'a> From<&'a Config> for PersistedConfig<'a> {
    fn from(config: &'a Config) -> Self {
        PersistedConfig {
            llm: PersistedLlm {
                base_url: &config.llm.base_url,
                model: &config.llm.model,
                temperature: config.llm.temperature,
                context_window: config.llm.context_window,
                timeout_secs: config.llm.timeout_secs,
                user_agent: &config.llm.user_agent,
            },
            search: PersistedSearch {
                api_key: config.search.api_key.as_deref(),
                base_url: &config.search.base_url,
                timeout_secs: config.search.timeout_secs,
            },
        }
    }
}
