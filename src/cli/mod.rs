mod args;
mod commands;
mod render;
mod util;

pub use args::Cli;
