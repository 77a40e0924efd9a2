mod cli;
mod client;
mod config;
mod logging;
mod research;
mod search;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);
    cli.run().await
}
