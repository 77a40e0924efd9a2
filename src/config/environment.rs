use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

use super::builder::ConfigBuilder;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(base_url) = env_string("SCOUT_LLM_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(model) = env_string("SCOUT_MODEL")? {
        builder = builder.with_llm(|llm| llm.model = model);
    }

    if let Some(temperature) = env_parsed::<f32>("SCOUT_TEMPERATURE")? {
        builder = builder.with_llm(|llm| llm.temperature = temperature);
    }

    if let Some(context_window) = env_parsed::<u32>("SCOUT_CONTEXT_WINDOW")? {
        builder = builder.with_llm(|llm| llm.context_window = context_window);
    }

    if let Some(timeout) = env_parsed::<u64>("SCOUT_TIMEOUT_SECS")? {
        builder = builder.with_llm(|llm| llm.timeout_secs = timeout);
    }

    if let Some(api_key) = env_string("TAVILY_API_KEY")? {
        builder = builder.with_search(|search| search.api_key = Some(api_key));
    }

    if let Some(base_url) = env_string("SCOUT_SEARCH_BASE_URL")? {
        builder = builder.with_search(|search| search.base_url = base_url);
    }

    Ok(builder)
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_string(key)? {
        Some(value) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .with_context(|| format!("Failed to parse {key} value '{value}'"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
