pub mod cluster;
pub mod metadata;
pub mod query;

pub use cluster::{ClusterCommands, handle_cluster_command};
pub use metadata::{MetadataCommands, handle_metadata_command};
pub use query::{QueryCommands, handle_query_command};

use anyhow::{Context, Result};
use kusto_cli::auth::{ClientSecretCredential, StaticTokenCredential, TokenCredential};
use kusto_cli::config::Config;
use std::sync::Arc;

/// Cluster a command runs against
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: Option<String>,
    pub endpoint: String,
    pub default_database: Option<String>,
}

/// `--endpoint` wins over `--cluster`, which wins over the current cluster
pub fn resolve_target(config: &Config, cluster: Option<&str>, endpoint: Option<&str>) -> Result<Target> {
    if let Some(endpoint) = endpoint {
        return Ok(Target {
            name: None,
            endpoint: endpoint.to_string(),
            default_database: None,
        });
    }

    if let Some(name) = cluster {
        let cluster = config
            .get_cluster(name)
            .with_context(|| format!("Cluster '{}' not found. Add it with 'kusto-cli cluster add'", name))?;
        return Ok(Target {
            name: Some(name.to_string()),
            endpoint: cluster.endpoint.clone(),
            default_database: cluster.default_database.clone(),
        });
    }

    let (name, cluster) = config.get_current_cluster().context(
        "No cluster selected. Pass --endpoint, or use 'kusto-cli cluster add' and 'kusto-cli cluster select'",
    )?;
    Ok(Target {
        name: Some(name.clone()),
        endpoint: cluster.endpoint.clone(),
        default_database: cluster.default_database.clone(),
    })
}

/// A static token when one is given, otherwise a service principal from the environment
pub fn credential(token: Option<String>) -> Result<Arc<dyn TokenCredential>> {
    match token {
        Some(token) => Ok(Arc::new(StaticTokenCredential::new(token))),
        None => {
            let credential = ClientSecretCredential::from_env()
                .context("No --token given and no service principal in the environment")?;
            Ok(Arc::new(credential))
        }
    }
}
