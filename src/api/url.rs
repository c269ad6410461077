//! Endpoint parsing and path joining

use crate::error::{KustoError, Result};
use reqwest::Url;

/// Parse a cluster endpoint, rejecting empty strings, control characters and
/// anything that is not an absolute, hierarchical URL.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(KustoError::config("endpoint cannot be empty"));
    }

    if raw.chars().any(|c| c.is_control()) {
        return Err(KustoError::config(format!(
            "failed to parse endpoint {:?}: invalid control character in URL",
            raw
        )));
    }

    let url = Url::parse(raw)
        .map_err(|e| KustoError::config_with(format!("failed to parse endpoint {:?}", raw), e))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(KustoError::config(format!(
            "failed to parse endpoint {:?}: not an absolute URL with a host",
            raw
        )));
    }

    Ok(url)
}

/// Append `path` to the base URL's path, keeping exactly one `/` between them
pub fn join_path(base: &Url, path: &str) -> Url {
    let mut joined = base.clone();
    let prefix = base.path().trim_end_matches('/');
    let suffix = path.trim_start_matches('/');
    joined.set_path(&format!("{}/{}", prefix, suffix));
    joined
}
