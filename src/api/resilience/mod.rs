//! Transport hardening and request logging
//!
//! Provides the retry policy installed on every connection and the structured
//! logger used around each API call.

pub mod logging;
pub mod retry;

pub use logging::{ApiLogger, OperationContext, sanitize_headers};
pub use retry::{RetryConfig, RetryPolicy, RetryingTransport};
