use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;

use cli::{Cli, Commands};
use cli::commands::{handle_cluster_command, handle_metadata_command, handle_query_command};

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file, truncated on each run
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("kusto-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting kusto-cli");

    match cli.command {
        Commands::Query(args) => handle_query_command(args).await,
        Commands::Cluster(args) => handle_cluster_command(args).await,
        Commands::Metadata(args) => handle_metadata_command(args).await,
    }
}
