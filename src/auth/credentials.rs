use super::{AccessToken, TokenCredential, TokenRequest};
use crate::api::metadata::DEFAULT_LOGIN_ENDPOINT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Azure AD application (service principal) credential using the
/// client-credentials grant. Tokens are cached per scope.
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    http_client: reqwest::Client,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl ClientSecretCredential {
    pub fn new(tenant_id: String, client_id: String, client_secret: String) -> Self {
        Self {
            tenant_id,
            client_id,
            client_secret,
            authority_host: DEFAULT_LOGIN_ENDPOINT.to_string(),
            http_client: reqwest::Client::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Use a different authority, e.g. the login endpoint a connection resolved
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Read `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`,
    /// loading a `.env` file from the working directory first if there is one.
    pub fn from_env() -> Result<Self> {
        info!("Importing credentials from environment variables");
        dotenvy::dotenv().ok();
        Self::from_vars()
    }

    /// Same as [`from_env`](Self::from_env) but loads the given `.env` file
    pub fn from_env_file(path: &str) -> Result<Self> {
        info!("Importing credentials from .env file: {}", path);

        if !Path::new(path).exists() {
            anyhow::bail!("Environment file not found: {}", path);
        }

        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load .env file '{}'", path))?;
        Self::from_vars()
    }

    fn from_vars() -> Result<Self> {
        let tenant_id = std::env::var("AZURE_TENANT_ID")
            .map_err(|_| anyhow::anyhow!("AZURE_TENANT_ID environment variable not set"))?;
        let client_id = std::env::var("AZURE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("AZURE_CLIENT_ID environment variable not set"))?;
        let client_secret = std::env::var("AZURE_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("AZURE_CLIENT_SECRET environment variable not set"))?;

        let mut credential = Self::new(tenant_id, client_id, client_secret);
        if let Ok(authority) = std::env::var("AZURE_AUTHORITY_HOST") {
            credential.authority_host = authority;
        }
        Ok(credential)
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }

    fn cached(&self, scope: &str) -> Option<AccessToken> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(scope)
            .filter(|token| token.is_valid_for(EXPIRY_MARGIN))
            .cloned()
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let token_url = self.token_url();
        debug!("Requesting token from {} for scope {}", token_url, scope);

        let response = self
            .http_client
            .post(&token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await
            .with_context(|| format!("Token request to {} failed", token_url))?;

        debug!("Token request status: {}", response.status());

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Authentication failed: {}", error_text);
        }

        let token_data: serde_json::Value = response.json().await?;
        parse_token_response(&token_data)
    }
}

fn parse_token_response(token_data: &serde_json::Value) -> Result<AccessToken> {
    let access_token = token_data
        .get("access_token")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow::anyhow!("No access token in response"))?;

    // Default to 1 hour if the response leaves it out
    let expires_in = token_data
        .get("expires_in")
        .and_then(|e| e.as_u64().or_else(|| e.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(3600);

    Ok(AccessToken::new(
        access_token,
        SystemTime::now() + Duration::from_secs(expires_in),
    ))
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, request: &TokenRequest) -> Result<AccessToken> {
        let scope = request.scope_string();

        if let Some(token) = self.cached(&scope) {
            debug!("Using cached token for scope {}", scope);
            return Ok(token);
        }

        let token = self.request_token(&scope).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(scope.clone(), token.clone());
        }

        info!("Acquired token for scope {}", scope);
        Ok(token)
    }
}
