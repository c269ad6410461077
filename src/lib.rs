pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod types;

pub use api::{Connection, ConnectionBuilder, KustoClient, QueryOptions, QueryResponse};
pub use auth::{StaticTokenCredential, TokenCredential};
pub use error::{ErrorKind, KustoError, Result};
pub use types::{Value, ValueKind};
