//! Query command handler

use anyhow::{Context, Result, bail};
use colored::*;
use kusto_cli::api::{KustoClient, QueryOptions, QueryResponse};
use kusto_cli::config::Config;
use log::info;
use std::fs;
use std::time::Instant;

use super::QueryCommands;
use super::params::{build_parameters, parse_param_spec};
use crate::cli::commands::{credential, resolve_target};

pub async fn handle_query_command(args: QueryCommands) -> Result<()> {
    let statement = read_statement(&args)?;

    let config = Config::load()?;
    let target = resolve_target(&config, args.cluster.as_deref(), args.endpoint.as_deref())?;
    let database = args
        .database
        .clone()
        .or_else(|| target.default_database.clone())
        .context("No database given. Pass --database or set a default database for the cluster")?;

    let options = build_options(&args)?;
    let pretty = args.pretty || config.get_settings().pretty_output;

    eprintln!(
        "🌍 Using cluster: {} ({})",
        target.name.as_deref().unwrap_or("-").bright_green().bold(),
        target.endpoint.cyan()
    );
    eprintln!("📝 Query: {}", statement.dimmed());

    let start = Instant::now();
    let mut builder = KustoClient::builder(target.endpoint.clone(), credential(args.token.clone())?)
        .retry_config(config.get_settings().retry_config());
    if let Some(application) = &config.get_settings().application {
        builder = builder.application(application.clone());
    }
    let client = builder
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", target.endpoint))?;

    info!("Running query against {}/{}", target.endpoint, database);
    let response = client
        .query(&database, &statement, Some(&options))
        .await
        .context("Failed to execute query")?;
    let elapsed = start.elapsed();

    let status_line = format!(
        "{} in {:.2}ms ({} bytes, request id {})",
        response.status,
        elapsed.as_secs_f64() * 1000.0,
        response.len(),
        response.client_request_id
    );
    if response.is_success() {
        eprintln!("{} {}", "✓".bright_green().bold(), status_line);
    } else {
        eprintln!("{} {}", "✗".bright_red().bold(), status_line.red());
    }

    let output = format_output(&response, pretty)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            eprintln!("💾 Results saved to: {}", path.display().to_string().bright_green());
        }
        None => println!("{}", output),
    }

    if !response.is_success() {
        bail!("Query failed with status {}", response.status);
    }
    Ok(())
}

fn read_statement(args: &QueryCommands) -> Result<String> {
    match (&args.query, &args.file) {
        (Some(_), Some(_)) => bail!("Cannot specify both a query string and --file"),
        (None, None) => bail!("Either provide a query string or use --file to specify a query file"),
        (Some(query), None) => Ok(query.clone()),
        (None, Some(path)) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file: {}", path.display()))?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                bail!("Query file is empty: {}", path.display());
            }
            Ok(trimmed.to_string())
        }
    }
}

fn build_options(args: &QueryCommands) -> Result<QueryOptions> {
    let mut options = QueryOptions::new();

    for raw in &args.options {
        let (key, value) = parse_option(raw)?;
        options = options.option(key, value);
    }

    if !args.params.is_empty() {
        let specs = args
            .params
            .iter()
            .map(|spec| parse_param_spec(spec))
            .collect::<Result<Vec<_>>>()?;
        let (definitions, parameters) = build_parameters(&specs)?;
        options = options.parameters(&definitions, &parameters)?;
    }

    Ok(options)
}

/// `key=value`; the value is taken as JSON when it parses, otherwise as a string
pub fn parse_option(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid option '{}': expected key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid option '{}': key is empty", raw);
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn format_output(response: &QueryResponse, pretty: bool) -> Result<String> {
    if pretty {
        if let Ok(json) = response.json() {
            return serde_json::to_string_pretty(&json).context("Failed to format JSON output");
        }
    }
    Ok(String::from_utf8_lossy(&response.body).into_owned())
}
