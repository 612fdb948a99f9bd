use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod catalog;
mod cli;
mod config;
mod error;
mod llm;
mod loader;
mod output;
mod parser;
mod processor;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("todcheck=debug")
    } else {
        EnvFilter::new("todcheck=info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Check(args) => cli::check::execute(args).await,
        Commands::Schema => cli::schema::execute(),
    }
}
