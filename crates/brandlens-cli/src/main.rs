use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod analyze;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "brandlens")]
#[command(about = "Brand trust analysis from public signals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect public signals for a brand and write a trust report.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Default, Args)]
struct AnalyzeArgs {
    /// Brand name to analyze. Prompted for interactively when omitted.
    #[arg(long)]
    brand: Option<String>,

    /// Microblog handle of the brand (with or without a leading '@').
    #[arg(long)]
    handle: Option<String>,

    /// Brand website URL.
    #[arg(long)]
    website: Option<String>,

    /// Directory the report is written to. Defaults to the configured
    /// output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze(args)) => analyze::run(args).await,
        None => analyze::run(AnalyzeArgs::default()).await,
    }
}
