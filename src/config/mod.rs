//! Configuration for the scout research orchestrator.
//!
//! Settings are layered in this order, later sources winning:
//! - built-in defaults
//! - the JSON file at `~/.scout/config`
//! - environment variables
//! - command-line overrides applied by the CLI
//!
//! Only construction-time settings live here. A missing search key is not an
//! error: the engine falls back to mock search results.

mod builder;
mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use types::{Config, LlmSettings, SearchSettings};

#[cfg(test)]
mod tests;
