//! Connection to a single cluster
//!
//! Building a connection is split in two. [`ConnectionBuilder::build`] only
//! validates the endpoint and wires the pieces together; [`ConnectionConfig::connect`]
//! performs the metadata lookup and either returns a ready [`Connection`] or an
//! error, never a half-initialized one.
//!
//! A `Connection` is immutable after construction and is meant to be shared
//! (by reference or behind an `Arc`) between concurrent queries.

use super::constants::{self, headers};
use super::decode::ContentEncoding;
use super::metadata::{CloudInfo, fetch_cloud_info};
use super::pool::BufferPool;
use super::query::{QueryOptions, QueryResponse, RequestProperties};
use super::resilience::{ApiLogger, RetryConfig, RetryingTransport};
use super::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use super::url::{join_path, parse_endpoint};
use crate::auth::{TokenCredential, TokenRequest};
use crate::error::{KustoError, Result};
use log::{debug, info};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Settings that apply to every request made through a connection
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub retry: RetryConfig,
    /// Authority credentials should request tokens from, taken from the cloud metadata
    pub authority_host: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            authority_host: super::metadata::DEFAULT_LOGIN_ENDPOINT.to_string(),
        }
    }
}

pub struct ConnectionBuilder {
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
    transport: Option<Arc<dyn HttpTransport>>,
    retry: RetryConfig,
    application: String,
}

impl ConnectionBuilder {
    pub fn new(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential,
            transport: None,
            retry: RetryConfig::default(),
            application: constants::DEFAULT_APPLICATION.to_string(),
        }
    }

    /// Use a custom transport instead of the default `reqwest` one
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Default `x-ms-app` value for queries that don't set one
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    /// Validate the endpoint and assemble the configuration. No network access.
    pub fn build(self) -> Result<ConnectionConfig> {
        let endpoint = parse_endpoint(&self.endpoint)?;
        let query_url = join_path(&endpoint, constants::QUERY_PATH);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(ConnectionConfig {
            endpoint,
            query_url,
            credential: self.credential,
            transport,
            retry: self.retry,
            application: self.application,
        })
    }

    /// [`build`](Self::build) followed by [`ConnectionConfig::connect`]
    pub async fn connect(self) -> Result<Connection> {
        self.build()?.connect().await
    }
}

/// Validated connection settings, not yet resolved against the cluster
pub struct ConnectionConfig {
    endpoint: Url,
    query_url: Url,
    credential: Arc<dyn TokenCredential>,
    transport: Arc<dyn HttpTransport>,
    retry: RetryConfig,
    application: String,
}

impl ConnectionConfig {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Resolve cloud metadata and produce a ready connection
    pub async fn connect(self) -> Result<Connection> {
        info!("Connecting to {}", self.endpoint);
        let cloud_info = fetch_cloud_info(self.transport.as_ref(), &self.endpoint).await?;

        let scope = derive_scope(&cloud_info, &self.endpoint);
        let client_options = ClientOptions {
            retry: self.retry.clone(),
            authority_host: cloud_info.authority_host().to_string(),
        };
        let transport: Arc<dyn HttpTransport> =
            Arc::new(RetryingTransport::new(self.transport, self.retry));

        debug!("Connection to {} uses scope {}", self.endpoint, scope);

        Ok(Connection {
            endpoint: self.endpoint,
            query_url: self.query_url,
            scope: vec![scope],
            cloud_info,
            client_options,
            application: self.application,
            credential: self.credential,
            transport,
            buffers: BufferPool::default(),
            logger: ApiLogger::default(),
        })
    }
}

/// Token scope for the cluster; falls back to the endpoint origin when the
/// metadata names no resource.
fn derive_scope(cloud_info: &CloudInfo, endpoint: &Url) -> String {
    if cloud_info.kusto_service_resource_id.is_empty() {
        format!(
            "{}{}",
            endpoint.origin().ascii_serialization(),
            constants::DEFAULT_SCOPE_SUFFIX
        )
    } else {
        cloud_info.scope()
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    db: &'a str,
    csl: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a RequestProperties>,
}

pub struct Connection {
    endpoint: Url,
    query_url: Url,
    scope: Vec<String>,
    cloud_info: CloudInfo,
    client_options: ClientOptions,
    application: String,
    credential: Arc<dyn TokenCredential>,
    transport: Arc<dyn HttpTransport>,
    buffers: BufferPool,
    logger: ApiLogger,
}

impl Connection {
    pub fn builder(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> ConnectionBuilder {
        ConnectionBuilder::new(endpoint, credential)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    pub fn cloud_info(&self) -> &CloudInfo {
        &self.cloud_info
    }

    pub fn client_options(&self) -> &ClientOptions {
        &self.client_options
    }

    pub fn authority_host(&self) -> &str {
        &self.client_options.authority_host
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    /// Submit `statement` against `database` and return the decoded response.
    ///
    /// Non-success statuses are not errors here: the service reports query
    /// failures inside the body, which the caller decodes.
    pub async fn query(
        &self,
        database: &str,
        statement: &str,
        options: Option<&QueryOptions>,
    ) -> Result<QueryResponse> {
        let properties = options.map(|o| o.properties());
        let client_request_id = properties
            .and_then(|p| p.client_request_id.clone())
            .unwrap_or_else(|| {
                format!("{};{}", constants::CLIENT_REQUEST_ID_PREFIX, uuid::Uuid::new_v4())
            });

        let context = self
            .logger
            .start_operation("query", database, &client_request_id);

        let result = self
            .submit(database, statement, options, &client_request_id, &context)
            .await;

        self.logger
            .complete_operation(&context, result.as_ref().err().map(|e| e.to_string()).as_deref());
        result
    }

    async fn submit(
        &self,
        database: &str,
        statement: &str,
        options: Option<&QueryOptions>,
        client_request_id: &str,
        context: &super::resilience::OperationContext,
    ) -> Result<QueryResponse> {
        let token_request = TokenRequest::new(self.scope.clone());
        let token = self
            .credential
            .get_token(&token_request)
            .await
            .map_err(|source| KustoError::Authentication {
                scope: token_request.scope_string(),
                source,
            })?;

        let header_map = self.request_headers(&token.token, client_request_id, options)?;

        let csl = match options {
            Some(options) => options.statement(statement),
            None => statement.to_string(),
        };
        let body = QueryBody {
            db: database,
            csl: &csl,
            properties: options.map(|o| o.properties()).filter(|p| !p.is_empty()),
        };

        let mut buffer = self.buffers.acquire();
        serde_json::to_writer(&mut *buffer, &body).map_err(|e| {
            KustoError::encoding(format!("failed to encode query for database {}", database), Some(e.into()))
        })?;

        self.logger
            .log_request(context, "POST", self.query_url.as_str(), &header_map);

        let response = self
            .transport
            .send(HttpRequest::post(&self.query_url, &header_map, buffer.as_slice()))
            .await
            .map_err(|e| KustoError::transport(format!("query to {} failed", self.query_url), e))?;
        drop(buffer);

        self.logger
            .log_response(context, response.status, &response.headers);

        let content_encoding = ContentEncoding::from_header(
            response
                .headers
                .get(headers::CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok()),
        )?;
        let body = content_encoding.decode(response.body)?;
        debug!(
            "Query {} returned {} ({} bytes, encoding {:?})",
            client_request_id,
            response.status,
            body.len(),
            content_encoding
        );

        Ok(QueryResponse {
            status: response.status,
            headers: response.headers,
            content_encoding,
            client_request_id: client_request_id.to_string(),
            body,
        })
    }

    fn request_headers(
        &self,
        token: &str,
        client_request_id: &str,
        options: Option<&QueryOptions>,
    ) -> Result<HeaderMap> {
        let properties = options.map(|o| o.properties());
        let mut header_map = HeaderMap::new();

        insert_static(&mut header_map, headers::ACCEPT, headers::APPLICATION_JSON)?;
        insert_static(&mut header_map, headers::ACCEPT_ENCODING, headers::GZIP_DEFLATE)?;
        insert_static(&mut header_map, headers::CONTENT_TYPE, headers::APPLICATION_JSON_UTF8)?;
        insert_static(&mut header_map, headers::CONNECTION, headers::KEEP_ALIVE)?;
        insert_static(&mut header_map, headers::X_MS_VERSION, constants::API_VERSION)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            KustoError::Authentication {
                scope: self.scope.join(" "),
                source: anyhow::Error::new(e).context("token is not a valid header value"),
            }
        })?;
        authorization.set_sensitive(true);
        header_map.insert(reqwest::header::AUTHORIZATION, authorization);

        insert_identity(&mut header_map, headers::X_MS_CLIENT_REQUEST_ID, client_request_id)?;

        let application = properties
            .and_then(|p| p.application.as_deref())
            .unwrap_or(&self.application);
        insert_identity(&mut header_map, headers::X_MS_APP, application)?;

        if let Some(user) = properties.and_then(|p| p.user.as_deref()) {
            insert_identity(&mut header_map, headers::X_MS_USER, user)?;
        }

        Ok(header_map)
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| KustoError::config_with(format!("invalid header name {}", name), e))
}

fn insert_static(header_map: &mut HeaderMap, name: &str, value: &'static str) -> Result<()> {
    header_map.insert(header_name(name)?, HeaderValue::from_static(value));
    Ok(())
}

fn insert_identity(header_map: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| KustoError::validation(format!("invalid value for header {}: {:?}", name, value)))?;
    header_map.insert(header_name(name)?, header_value);
    Ok(())
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint.as_str())
            .field("query_url", &self.query_url.as_str())
            .field("scope", &self.scope)
            .field("client_options", &self.client_options)
            .finish_non_exhaustive()
    }
}
