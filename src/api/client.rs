use super::connection::{Connection, ConnectionBuilder};
use super::query::{QueryOptions, QueryResponse};
use super::resilience::RetryConfig;
use super::transport::HttpTransport;
use crate::auth::TokenCredential;
use crate::error::Result;
use std::sync::Arc;

/// Kusto client bound to one cluster.
///
/// Cloning is cheap; clones share the same connection and buffer pool.
#[derive(Debug, Clone)]
pub struct KustoClient {
    connection: Arc<Connection>,
}

impl KustoClient {
    /// Connect with the default `reqwest` transport
    pub async fn new(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        Self::builder(endpoint, credential).connect().await
    }

    pub fn builder(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> KustoClientBuilder {
        KustoClientBuilder {
            inner: ConnectionBuilder::new(endpoint, credential),
        }
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Arc::new(connection),
        }
    }

    pub async fn query(
        &self,
        database: &str,
        statement: &str,
        options: Option<&QueryOptions>,
    ) -> Result<QueryResponse> {
        self.connection.query(database, statement, options).await
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

pub struct KustoClientBuilder {
    inner: ConnectionBuilder,
}

impl KustoClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.inner = self.inner.transport(transport);
        self
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.inner = self.inner.retry_config(retry);
        self
    }

    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.inner = self.inner.application(application);
        self
    }

    /// Resolve the cluster and return a ready client
    pub async fn connect(self) -> Result<KustoClient> {
        let connection = self.inner.connect().await?;
        Ok(KustoClient::from_connection(connection))
    }
}
