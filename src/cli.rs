use std::path::PathBuf;

use clap::Parser;

/// Browse Bitbucket repositories and pull requests from the terminal.
///
/// Settings come from flags, then BITBUCKET_* / LAZYBB_* environment
/// variables, then a .env file, then the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "lazybb", author, version, about)]
pub struct Cli {
    /// Bitbucket workspace to browse
    #[arg(short, long)]
    pub workspace: Option<String>,

    /// Repository slug used when no repository is selected
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Base URL of the Bitbucket REST API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file (the terminal is busy drawing the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
