//! Kusto REST API client
//!
//! [`Connection`] resolves a cluster's cloud metadata once and then submits
//! queries to it. Everything that touches the wire goes through the
//! [`HttpTransport`] seam so tests can run without a network.

pub mod client;
pub mod connection;
pub mod constants;
pub mod decode;
pub mod metadata;
pub mod pool;
pub mod query;
pub mod resilience;
pub mod transport;
pub mod url;

pub use client::{KustoClient, KustoClientBuilder};
pub use connection::{ClientOptions, Connection, ConnectionBuilder, ConnectionConfig};
pub use decode::ContentEncoding;
pub use metadata::{CloudInfo, fetch_cloud_info};
pub use query::{Definitions, ParamType, Parameters, QueryOptions, QueryResponse};
pub use resilience::{ApiLogger, RetryConfig, RetryingTransport};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
