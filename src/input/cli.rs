use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "ptov-lab")]
#[command(about = "Model production Arista switches as a GNS3 virtual lab")]
pub struct Cli {
    /// Switches to model, comma or space separated
    #[arg(long, conflicts_with = "file")]
    pub switches: Option<String>,
    /// File with one switch name per line
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// GNS3 server hostname or address
    #[arg(long)]
    pub server: Option<String>,
    /// Name of the GNS3 project to create
    #[arg(long)]
    pub project: Option<String>,
    /// Switch login
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, env = "PTOV_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Build and print the plan without touching the lab server
    #[arg(long)]
    pub plan_only: bool,
    /// Write the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}
