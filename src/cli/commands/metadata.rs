//! Show the cloud metadata a cluster publishes

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use kusto_cli::api::ReqwestTransport;
use kusto_cli::api::metadata::fetch_cloud_info;
use kusto_cli::api::url::parse_endpoint;
use kusto_cli::config::Config;

use super::resolve_target;

#[derive(Args)]
pub struct MetadataCommands {
    /// Named cluster from the config file
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Cluster URL, overrides --cluster
    #[arg(short, long)]
    pub endpoint: Option<String>,
}

pub async fn handle_metadata_command(args: MetadataCommands) -> Result<()> {
    let config = Config::load()?;
    let target = resolve_target(&config, args.cluster.as_deref(), args.endpoint.as_deref())?;

    let endpoint = parse_endpoint(&target.endpoint)?;
    let transport = ReqwestTransport::new()?;
    let cloud_info = fetch_cloud_info(&transport, &endpoint)
        .await
        .with_context(|| format!("Failed to resolve metadata for {}", endpoint))?;

    println!("🌍 {}", endpoint.as_str().cyan());
    println!(
        "{}",
        serde_json::to_string_pretty(&cloud_info).context("Failed to format cloud info")?
    );

    if cloud_info.kusto_service_resource_id.is_empty() {
        println!("{}", "No service resource id published; the endpoint origin is used as scope".dimmed());
    } else {
        println!("🔑 Scope: {}", cloud_info.scope().bright_green());
    }
    println!("🔐 Authority: {}", cloud_info.authority_host());

    Ok(())
}
