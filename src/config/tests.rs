use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

use crate::config::constants::{
    DEFAULT_CONTEXT_WINDOW, DEFAULT_LLM_BASE_URL, DEFAULT_MODEL, DEFAULT_SEARCH_BASE_URL,
    DEFAULT_TEMPERATURE,
};
use crate::config::environment::{env_parsed, env_string};
use crate::config::Config;

const SCOUT_VARS: [&str; 7] = [
    "SCOUT_LLM_BASE_URL",
    "SCOUT_MODEL",
    "SCOUT_TEMPERATURE",
    "SCOUT_CONTEXT_WINDOW",
    "SCOUT_TIMEOUT_SECS",
    "TAVILY_API_KEY",
    "SCOUT_SEARCH_BASE_URL",
];

fn env_lock<'a>() -> std::sync::MutexGuard<'a, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn new(vars: &[(&str, Option<&str>)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect::<Vec<_>>();
        for (key, value) in vars {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        Self { saved }
    }

    /// Points HOME at `home` and clears every scout variable before applying `vars`.
    fn isolated(home: &str, vars: &[(&str, Option<&str>)]) -> Self {
        let mut all: Vec<(&str, Option<&str>)> = vec![("HOME", Some(home))];
        all.extend(SCOUT_VARS.iter().map(|key| (*key, None)));
        all.extend_from_slice(vars);
        Self::new(&all)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[test]
fn load_uses_defaults_without_file_or_env() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(temp_home.path().to_str().unwrap(), &[]);

    let config = Config::load().unwrap();
    assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
    assert_eq!(config.llm.model, DEFAULT_MODEL);
    assert_eq!(config.llm.temperature, DEFAULT_TEMPERATURE);
    assert_eq!(config.llm.context_window, DEFAULT_CONTEXT_WINDOW);
    assert_eq!(config.search.base_url, DEFAULT_SEARCH_BASE_URL);
    assert!(!config.search.is_configured());
}

#[test]
fn load_from_env_only() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(
        temp_home.path().to_str().unwrap(),
        &[
            ("SCOUT_LLM_BASE_URL", Some("http://gpu-box:11434")),
            ("SCOUT_MODEL", Some("qwen2.5:14b")),
            ("SCOUT_TEMPERATURE", Some("0.3")),
            ("SCOUT_CONTEXT_WINDOW", Some("8192")),
            ("TAVILY_API_KEY", Some("tvly-env")),
        ],
    );

    let config = Config::load().unwrap();
    assert_eq!(config.llm.base_url, "http://gpu-box:11434");
    assert_eq!(config.llm.model, "qwen2.5:14b");
    assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.llm.context_window, 8192);
    assert_eq!(config.search.api_key.as_deref(), Some("tvly-env"));
}

#[test]
fn load_prefers_env_over_file() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let config_dir = temp_home.path().join(".scout");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config"),
        r#"{
            "llm": { "model": "file-model", "timeout_secs": 20, "context_window": 2048 },
            "search": { "api_key": "tvly-file" }
        }"#,
    )
    .unwrap();

    let _env = EnvGuard::isolated(
        temp_home.path().to_str().unwrap(),
        &[("SCOUT_MODEL", Some("env-model"))],
    );

    let config = Config::load().unwrap();
    assert_eq!(config.llm.model, "env-model");
    assert_eq!(config.llm.timeout_secs, 20);
    assert_eq!(config.llm.context_window, 2048);
    assert_eq!(config.search.api_key.as_deref(), Some("tvly-file"));
}

#[test]
fn blank_search_key_selects_mock_mode() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(
        temp_home.path().to_str().unwrap(),
        &[("TAVILY_API_KEY", Some("   "))],
    );

    let config = Config::load().unwrap();
    assert!(config.search.api_key.is_none());
}

#[test]
fn load_rejects_out_of_range_temperature() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(
        temp_home.path().to_str().unwrap(),
        &[("SCOUT_TEMPERATURE", Some("3.5"))],
    );

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("Temperature"));
}

#[test]
fn load_reports_unparseable_env_value() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(
        temp_home.path().to_str().unwrap(),
        &[("SCOUT_CONTEXT_WINDOW", Some("large"))],
    );

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("SCOUT_CONTEXT_WINDOW"));
}

#[test]
fn builder_rejects_zero_context_window() {
    let err = Config::builder()
        .with_llm(|llm| llm.context_window = 0)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Context window"));
}

#[test]
fn save_persists_nested_structure() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(temp_home.path().to_str().unwrap(), &[]);

    let mut config = Config::builder().build().unwrap();
    config.llm.model = "mistral:7b".to_string();
    config.llm.context_window = 16384;
    config.search.api_key = Some("tvly-saved".to_string());
    config.save().unwrap();

    let persisted = std::fs::read_to_string(Config::config_path().unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(json["llm"]["model"], "mistral:7b");
    assert_eq!(json["llm"]["context_window"], 16384);
    assert_eq!(json["search"]["api_key"], "tvly-saved");

    let reloaded = Config::load().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_env_string() {
    let _lock = env_lock();
    let _env = EnvGuard::new(&[("SCOUT_TEST_VAR", Some("test_value"))]);

    assert_eq!(
        env_string("SCOUT_TEST_VAR").unwrap(),
        Some("test_value".to_string())
    );
    assert_eq!(env_string("SCOUT_NONEXISTENT_VAR").unwrap(), None);
}

#[test]
fn test_env_parsed() {
    let _lock = env_lock();
    let _env = EnvGuard::new(&[("SCOUT_TEST_U64", Some("123")), ("SCOUT_TEST_F32", Some("0.5"))]);

    assert_eq!(env_parsed::<u64>("SCOUT_TEST_U64").unwrap(), Some(123));
    assert_eq!(env_parsed::<f32>("SCOUT_TEST_F32").unwrap(), Some(0.5));
    assert_eq!(env_parsed::<u32>("SCOUT_NONEXISTENT_VAR").unwrap(), None);
}
