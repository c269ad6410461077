//! Bearer token acquisition
//!
//! The connection asks a [`TokenCredential`] for a token every time it submits
//! a query. How the token is obtained (and whether it is cached or retried) is
//! entirely up to the credential.

pub mod credentials;

pub use credentials::ClientSecretCredential;

use async_trait::async_trait;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Scopes a token is requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub scopes: Vec<String>,
}

impl TokenRequest {
    pub fn new(scopes: Vec<String>) -> Self {
        Self { scopes }
    }

    /// Space-separated scope list, as sent to the token endpoint
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: SystemTime,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Whether the token is still good for at least `margin`
    pub fn is_valid_for(&self, margin: Duration) -> bool {
        match self.expires_at.duration_since(SystemTime::now()) {
            Ok(remaining) => remaining > margin,
            Err(_) => false,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens for a set of scopes
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, request: &TokenRequest) -> anyhow::Result<AccessToken>;
}

/// Hands out the same token for every scope
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _request: &TokenRequest) -> anyhow::Result<AccessToken> {
        if self.token.is_empty() {
            anyhow::bail!("static token is empty");
        }
        Ok(AccessToken::new(
            self.token.clone(),
            SystemTime::now() + Duration::from_secs(3600),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let credential = StaticTokenCredential::new("abc");
        let request = TokenRequest::new(vec!["https://x.kusto.windows.net/.default".into()]);
        let token = credential.get_token(&request).await.unwrap();
        assert_eq!(token.token, "abc");
        assert!(token.is_valid_for(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_empty_static_token_fails() {
        let credential = StaticTokenCredential::new("");
        let request = TokenRequest::new(vec![]);
        assert!(credential.get_token(&request).await.is_err());
    }

    #[test]
    fn test_expired_token() {
        let token = AccessToken::new("secret-value", SystemTime::now() - Duration::from_secs(1));
        assert!(!token.is_valid_for(Duration::ZERO));
        assert!(!format!("{:?}", token).contains("secret-value"));
    }

    #[test]
    fn test_scope_string() {
        let request = TokenRequest::new(vec!["a/.default".into(), "b/.default".into()]);
        assert_eq!(request.scope_string(), "a/.default b/.default");
    }
}
