//! API Constants and Configuration for the Kusto REST API

/// Unauthenticated cloud metadata path
pub const METADATA_PATH: &str = "/v1/rest/auth/metadata";

/// Query submission path
pub const QUERY_PATH: &str = "/v2/rest/query";

/// Service API version sent with every query
pub const API_VERSION: &str = "2019-02-13";

/// Suffix appended to the service resource id to form the token scope
pub const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

/// Prefix of generated client request ids
pub const CLIENT_REQUEST_ID_PREFIX: &str = "KC.execute";

/// Default application name reported in `x-ms-app`
pub const DEFAULT_APPLICATION: &str = env!("CARGO_PKG_NAME");

/// User agent for the default transport
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Standard headers for Kusto requests
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const CONNECTION: &str = "Connection";
    pub const AUTHORIZATION: &str = "Authorization";

    pub const X_MS_VERSION: &str = "x-ms-version";
    pub const X_MS_CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
    pub const X_MS_APP: &str = "x-ms-app";
    pub const X_MS_USER: &str = "x-ms-user";

    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";
    pub const GZIP_DEFLATE: &str = "gzip, deflate";
    pub const KEEP_ALIVE: &str = "Keep-Alive";
}
