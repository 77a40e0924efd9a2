use anyhow::Result;

use super::types::{Config, LlmSettings, SearchSettings};
use super::validation::validate;

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) llm: LlmSettings,
    pub(super) search: SearchSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            llm: LlmSettings::default(),
            search: SearchSettings::default(),
        }
    }

    pub fn with_llm<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut LlmSettings),
    {
        update(&mut self.llm);
        self
    }

    pub fn with_search<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut SearchSettings),
    {
        update(&mut self.search);
        self
    }

    /// Blank search keys are treated as absent so they select mock mode.
    pub fn build(mut self) -> Result<Config> {
        if self
            .search
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.search.api_key = None;
        }

        let config = Config {
            llm: self.llm,
            search: self.search,
        };
        validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
