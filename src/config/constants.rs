pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CONTEXT_WINDOW: u32 = 4096;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;
pub const MAX_TEMPERATURE: f32 = 2.0;
