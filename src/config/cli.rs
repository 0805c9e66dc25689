// Command line overrides
// Every flag is optional; a flag that is given wins over file and environment values

use clap::Parser;
use std::path::PathBuf;

/// Serve files and directory listings from a root directory
#[derive(Debug, Parser, Default)]
#[command(name = "statiserver", version, about)]
pub struct Cli {
    /// Config file path (without extension)
    #[arg(short, long, default_value = "statiserver")]
    pub config: String,

    /// Directory to serve
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Worker thread count (defaults to CPU cores)
    #[arg(short, long)]
    pub workers: Option<usize>,
}
