//! HTTP transport abstraction
//!
//! The connection talks to the service through [`HttpTransport`] so the wire
//! can be swapped out in tests. [`ReqwestTransport`] is the production
//! implementation and never follows redirects: the last response, 3xx
//! included, is always handed back so credentials are never replayed against
//! another host.

use super::constants;
use crate::error::{KustoError, TransportError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;

/// A request borrowed from the caller for the duration of one send
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a Url,
    pub headers: &'a HeaderMap,
    pub body: Option<&'a [u8]>,
}

impl<'a> HttpRequest<'a> {
    pub fn get(url: &'a Url, headers: &'a HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url,
            headers,
            body: None,
        }
    }

    pub fn post(url: &'a Url, headers: &'a HeaderMap, body: &'a [u8]) -> Self {
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body),
        }
    }
}

/// Response with the body read to completion but not yet content-decoded
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest<'_>) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport with connection pooling
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, KustoError> {
        let http_client = Self::client_builder()
            .build()
            .map_err(|e| KustoError::config_with("failed to build HTTP client", e))?;

        Ok(Self { http_client })
    }

    /// Client settings shared by every transport: no redirects, no
    /// automatic decompression, pooled connections
    fn client_builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(constants::user_agent())
    }

    /// Wrap a caller-configured client. The caller is responsible for
    /// disabling redirects and automatic decompression on it.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method, request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
