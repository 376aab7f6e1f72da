mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "segprompt", about = "Prompted image segmentation with FastSAM")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image file metadata
    Info(commands::info::InfoArgs),
    /// Print or save the default configuration
    Config(commands::config::ConfigArgs),
    /// Segment one image with one prompt
    Segment(commands::segment::SegmentArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Segment(args) => commands::segment::run(args),
    }
}
