use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path};

use super::Config;
use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{FileConfig, PersistedConfig};
use super::validation::validate;

impl Config {
    pub fn config_path() -> Result<std::path::PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".scout/config");
        Ok(path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn load() -> Result<Self> {
        Self::load_builder()?.build()
    }

    /// Defaults, file and environment layers, left open for CLI overrides.
    pub fn load_builder() -> Result<ConfigBuilder> {
        let path = Self::config_path()?;
        let mut builder = ConfigBuilder::new();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        apply_env_overrides(builder)
    }

    pub fn save(&self) -> Result<()> {
        validate(self)?;
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let payload = PersistedConfig::from(self);
        let json = serde_json::to_string_pretty(&payload)
            .context("Failed to serialize configuration to JSON")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let file: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        Ok(file.apply(builder))
    }
}

impl FileConfig {
    pub fn apply(self, builder: ConfigBuilder) -> ConfigBuilder {
        let llm = self.llm.unwrap_or_default();
        let search = self.search.unwrap_or_default();

        builder
            .with_llm(|settings| {
                if let Some(base_url) = llm.base_url {
                    settings.base_url = base_url;
                }
                if let Some(model) = llm.model {
                    settings.model = model;
                }
                if let Some(temperature) = llm.temperature {
                    settings.temperature = temperature;
                }
                if let Some(context_window) = llm.context_window {
                    settings.context_window = context_window;
                }
                if let Some(timeout) = llm.timeout_secs {
                    settings.timeout_secs = timeout;
                }
                if let Some(user_agent) = llm.user_agent {
                    settings.user_agent = user_agent;
                }
            })
            .with_search(|settings| {
                if let Some(api_key) = search.api_key {
                    settings.api_key = Some(api_key);
                }
                if let Some(base_url) = search.base_url {
                    settings.base_url = base_url;
                }
                if let Some(timeout) = search.timeout_secs {
                    settings.timeout_secs = timeout;
                }
            })
    }
}
