use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the scheduler (default)
    Serve {
        /// JSON file with job descriptors to schedule on startup
        #[arg(short, long)]
        descriptors: Option<PathBuf>,
    },
    /// Validate and translate a JSON descriptor file without scheduling anything
    Check {
        path: PathBuf,
    },
    /// Show version information
    Version,
}
