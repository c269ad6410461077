//! Structured logging with correlation tracking for Kusto API operations
//!
//! Every metadata lookup and query is logged as a small JSON record keyed by
//! its client request id so a single call can be followed through the log.

use crate::api::constants::headers;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use log::{debug, info, warn};

/// Structured logger for API operations
#[derive(Debug, Clone)]
pub struct ApiLogger {
    request_logging: bool,
}

/// Context for a single API operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Client request id, also sent as `x-ms-client-request-id` for queries
    pub correlation_id: String,
    /// Operation type (metadata, query)
    pub operation_type: String,
    /// Endpoint or database the operation targets
    pub target: String,
    pub start_time: Instant,
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for ApiLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ApiLogger {
    pub fn new(request_logging: bool) -> Self {
        Self { request_logging }
    }

    pub fn start_operation(&self, operation_type: &str, target: &str, correlation_id: &str) -> OperationContext {
        let context = OperationContext {
            correlation_id: correlation_id.to_string(),
            operation_type: operation_type.to_string(),
            target: target.to_string(),
            start_time: Instant::now(),
        };

        if self.request_logging {
            let log_data = json!({
                "event": "operation_started",
                "correlation_id": context.correlation_id,
                "operation_type": context.operation_type,
                "target": context.target,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            info!("API Operation Started: {}", log_data);
        }

        context
    }

    pub fn log_request(&self, context: &OperationContext, method: &str, url: &str, headers: &HeaderMap) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "method": method,
            "url": url,
            "headers": sanitize_headers(headers),
        });
        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &OperationContext, status: StatusCode, headers: &HeaderMap) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "status_code": status.as_u16(),
            "duration_ms": context.elapsed().as_millis(),
            "headers": sanitize_headers(headers),
        });

        if status.is_client_error() || status.is_server_error() {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    pub fn complete_operation(&self, context: &OperationContext, error: Option<&str>) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "target": context.target,
            "success": error.is_none(),
            "duration_ms": context.elapsed().as_millis(),
            "error": error,
        });

        match error {
            None => info!("API Operation Completed: {}", log_data),
            Some(_) => warn!("API Operation Failed: {}", log_data),
        }
    }
}

/// Header map as JSON with credentials redacted
pub fn sanitize_headers(header_map: &HeaderMap) -> Value {
    let mut sanitized = Map::new();
    for (name, value) in header_map {
        let shown = if name.as_str().eq_ignore_ascii_case(headers::AUTHORIZATION) {
            "[REDACTED]".to_string()
        } else {
            value.to_str().unwrap_or("[binary]").to_string()
        };
        sanitized.insert(name.to_string(), Value::String(shown));
    }
    Value::Object(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_sanitize_redacts_authorization() {
        let mut map = HeaderMap::new();
        map.insert("authorization", HeaderValue::from_static("Bearer secret-token"));
        map.insert("x-ms-app", HeaderValue::from_static("kusto-cli"));

        let sanitized = sanitize_headers(&map);
        assert_eq!(sanitized["authorization"], "[REDACTED]");
        assert_eq!(sanitized["x-ms-app"], "kusto-cli");
        assert!(!sanitized.to_string().contains("secret-token"));
    }

    #[test]
    fn test_operation_context() {
        let logger = ApiLogger::new(false);
        let context = logger.start_operation("query", "Samples", "KC.execute;abc");
        assert_eq!(context.correlation_id, "KC.execute;abc");
        assert_eq!(context.operation_type, "query");
        assert_eq!(context.target, "Samples");
        logger.complete_operation(&context, None);
        assert!(context.elapsed() >= Duration::ZERO);
    }
}
