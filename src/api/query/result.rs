//! Query response handling
//!
//! The service answers with a v2 frame stream. Decoding it into tables is left
//! to the caller; this type only hands back the content-decoded bytes.

use crate::api::decode::ContentEncoding;
use crate::error::{KustoError, Result};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Encoding the body arrived in, before decoding
    pub content_encoding: ContentEncoding,
    /// `x-ms-client-request-id` the query was sent with
    pub client_request_id: String,
    /// Fully decoded body
    pub body: Vec<u8>,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(|e| {
            KustoError::encoding(
                format!("query response is not valid UTF-8: {}", e),
                Some(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })
    }

    /// Body parsed as generic JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(|e| {
            KustoError::encoding(
                format!("query response is not valid JSON: {}", e),
                Some(e.into()),
            )
        })
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
