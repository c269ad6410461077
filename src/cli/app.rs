use super::commands::{ClusterCommands, MetadataCommands, QueryCommands};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kusto-cli")]
#[command(about = "A CLI tool for running queries against Azure Data Explorer (Kusto)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a query against a cluster
    Query(QueryCommands),
    /// Manage named clusters
    Cluster(ClusterCommands),
    /// Show the cloud metadata a cluster publishes
    Metadata(MetadataCommands),
}
