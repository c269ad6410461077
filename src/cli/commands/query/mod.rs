pub mod handler;
pub mod params;

use clap::Args;
use std::path::PathBuf;

pub use handler::handle_query_command;

#[derive(Args)]
pub struct QueryCommands {
    /// Query statement to execute (e.g. 'StormEvents | take 10')
    #[arg(help = "Query statement")]
    pub query: Option<String>,

    /// Read the statement from a file instead of the command line
    #[arg(short, long, help = "Path to file containing the query")]
    pub file: Option<PathBuf>,

    /// Named cluster from the config file
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Cluster URL, overrides --cluster
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Database to query, defaults to the cluster's default database
    #[arg(short, long)]
    pub database: Option<String>,

    /// Query parameter as name:kind[=value], repeatable
    #[arg(long = "param", value_name = "NAME:KIND[=VALUE]")]
    pub params: Vec<String>,

    /// Request option as key=value, repeatable
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Bearer token to use instead of AZURE_* service principal variables
    #[arg(long, env = "KUSTO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Pretty print the response JSON
    #[arg(short, long)]
    pub pretty: bool,

    /// Save the response body to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
