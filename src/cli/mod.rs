pub mod check;
pub mod run;
pub mod schema;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "todcheck")]
#[command(
    author,
    version,
    about = "AI-assisted test-of-design analysis for internal controls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the control inventory and write the result table
    Run(RunArgs),

    /// Validate configuration and LLM connectivity, then exit
    Check(CheckArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "todcheck.yaml")]
    pub config: PathBuf,

    /// Override the control inventory CSV
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Override the result table destination
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Override max records analyzed in parallel
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override the model identifier
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Parser, Clone)]
pub struct CheckArgs {
    /// Path to config file
    #[arg(short, long, default_value = "todcheck.yaml")]
    pub config: PathBuf,
}
