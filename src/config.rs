use crate::api::resilience::RetryConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_cluster: Option<String>,
    #[serde(default)]
    pub clusters: HashMap<String, ClusterConfig>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_try_timeout_secs")]
    pub try_timeout_secs: u64,
    #[serde(default)]
    pub pretty_output: bool,
    /// Sent as `x-ms-app` on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_try_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            try_timeout_secs: default_try_timeout_secs(),
            pretty_output: false,
            application: None,
        }
    }
}

impl Settings {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            try_timeout: Duration::from_secs(self.try_timeout_secs.max(1)),
            ..RetryConfig::default()
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("kusto-cli")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".kusto-cli")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from `path`; a missing file gives the default config bound to that path
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.path = Some(path.to_path_buf());

        debug!("Loaded config with {} clusters", config.clusters.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = match &self.path {
            Some(path) => path.clone(),
            None => Self::get_config_path()?,
        };
        debug!("Saving config to: {:?}", config_path);

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
                info!("Created config directory: {:?}", config_dir);
            }
        }

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn add_cluster(&mut self, name: String, cluster: ClusterConfig) -> Result<()> {
        info!("Adding cluster: {} ({})", name, cluster.endpoint);
        self.clusters.insert(name.clone(), cluster);

        // First cluster becomes the current one
        if self.current_cluster.is_none() {
            self.current_cluster = Some(name.clone());
            info!("Set {} as current cluster", name);
        }

        self.save()
    }

    pub fn get_cluster(&self, name: &str) -> Option<&ClusterConfig> {
        self.clusters.get(name)
    }

    pub fn get_current_cluster(&self) -> Option<(&String, &ClusterConfig)> {
        let current = self.current_cluster.as_ref()?;
        self.clusters.get(current).map(|cluster| (current, cluster))
    }

    pub fn set_current_cluster(&mut self, name: String) -> Result<()> {
        if !self.clusters.contains_key(&name) {
            anyhow::bail!("Cluster '{}' not found", name);
        }

        info!("Setting current cluster to: {}", name);
        self.current_cluster = Some(name);
        self.save()
    }

    /// Cluster names, sorted
    pub fn list_clusters(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.clusters.keys().collect();
        names.sort();
        names
    }

    pub fn remove_cluster(&mut self, name: &str) -> Result<()> {
        if self.clusters.remove(name).is_none() {
            anyhow::bail!("Cluster '{}' not found", name);
        }
        info!("Removing cluster: {}", name);

        if self.current_cluster.as_deref() == Some(name) {
            warn!("Removed current cluster, clearing current selection");
            self.current_cluster = None;
        }

        self.save()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }
}
