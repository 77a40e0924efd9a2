pub mod engine;
pub mod graph;
pub mod outcome;
pub mod parser;
pub mod prompts;
pub mod router;
pub mod stages;
pub mod state;
pub mod types;

pub use engine::ResearchEngine;
pub use outcome::{ResearchError, ResearchOutcome};
pub use state::RunState;
pub use types::StageKind;
