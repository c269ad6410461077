//! Cluster management in the config file

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use kusto_cli::api::url::parse_endpoint;
use kusto_cli::config::{ClusterConfig, Config};

#[derive(Args)]
pub struct ClusterCommands {
    #[command(subcommand)]
    pub command: ClusterSubcommands,
}

#[derive(Subcommand)]
pub enum ClusterSubcommands {
    /// Add a named cluster
    Add {
        /// Name for this cluster (e.g. "help", "prod")
        name: String,
        /// Cluster URL, e.g. https://help.kusto.windows.net
        endpoint: String,
        /// Database used when a query doesn't name one
        #[arg(short, long)]
        database: Option<String>,
    },
    /// List configured clusters
    List,
    /// Remove a cluster
    Remove { name: String },
    /// Select the current cluster
    Select { name: String },
}

pub async fn handle_cluster_command(args: ClusterCommands) -> Result<()> {
    let mut config = Config::load()?;

    match args.command {
        ClusterSubcommands::Add {
            name,
            endpoint,
            database,
        } => {
            parse_endpoint(&endpoint)?;
            config.add_cluster(
                name.clone(),
                ClusterConfig {
                    endpoint,
                    default_database: database,
                },
            )?;
            println!("{} Cluster '{}' added", "✓".bright_green().bold(), name.bright_green().bold());
        }
        ClusterSubcommands::List => list_clusters(&config),
        ClusterSubcommands::Remove { name } => {
            config.remove_cluster(&name)?;
            println!("{} Cluster '{}' removed", "✓".bright_green().bold(), name.bright_yellow());
        }
        ClusterSubcommands::Select { name } => {
            config.set_current_cluster(name.clone())?;
            println!("{} Using cluster '{}'", "✓".bright_green().bold(), name.bright_green().bold());
        }
    }

    Ok(())
}

fn list_clusters(config: &Config) {
    let names = config.list_clusters();
    if names.is_empty() {
        println!("  {}", "⚠️  No clusters configured".bright_yellow().bold());
        println!("  {}", "Add one with 'kusto-cli cluster add <name> <endpoint>'.".dimmed());
        return;
    }

    let current = config.current_cluster.as_deref();
    for name in names {
        let Some(cluster) = config.get_cluster(name) else {
            continue;
        };
        let marker = if current == Some(name.as_str()) { "*" } else { " " };
        let database = cluster.default_database.as_deref().unwrap_or("-");
        println!(
            "{} {}  {}  {}",
            marker.bright_green().bold(),
            name.bold(),
            cluster.endpoint.cyan(),
            database.dimmed()
        );
    }
}
