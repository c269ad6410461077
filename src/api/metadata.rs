//! Cloud metadata resolution
//!
//! Every cluster publishes its Azure AD configuration at an unauthenticated
//! well-known path. The connection reads it once to learn which login
//! endpoint to use and which resource the bearer token must be scoped to.

use super::constants::{DEFAULT_SCOPE_SUFFIX, METADATA_PATH};
use super::resilience::ApiLogger;
use super::transport::{HttpRequest, HttpTransport};
use super::url::join_path;
use crate::error::{KustoError, Result};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Authority used when the metadata does not name one
pub const DEFAULT_LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(rename = "AzureAD")]
    pub azure_ad: CloudInfo,
}

/// Azure AD settings published by the cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudInfo {
    #[serde(rename = "LoginEndpoint")]
    pub login_endpoint: String,
    #[serde(rename = "LoginMfaRequired")]
    pub login_mfa_required: bool,
    #[serde(rename = "KustoClientAppId")]
    pub kusto_client_app_id: String,
    #[serde(rename = "KustoClientRedirectUri")]
    pub kusto_client_redirect_uri: String,
    #[serde(rename = "KustoServiceResourceId")]
    pub kusto_service_resource_id: String,
    #[serde(rename = "FirstPartyAuthorityUrl")]
    pub first_party_authority_url: String,
}

impl CloudInfo {
    /// Parse the metadata document and return its `AzureAD` section
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let metadata: Metadata = serde_json::from_slice(body).map_err(|e| {
            KustoError::resolution_with(
                format!(
                    "failed to unmarshal cloud info: {}",
                    String::from_utf8_lossy(body)
                ),
                e,
            )
        })?;
        Ok(metadata.azure_ad)
    }

    /// Token scope for this cloud.
    ///
    /// Tenants that require MFA use the `.kustomfa.` resource; only the first
    /// `.kusto.` occurrence is rewritten, and the match is case-sensitive.
    pub fn scope(&self) -> String {
        let resource = if self.login_mfa_required {
            self.kusto_service_resource_id.replacen(".kusto.", ".kustomfa.", 1)
        } else {
            self.kusto_service_resource_id.clone()
        };
        format!("{}{}", resource, DEFAULT_SCOPE_SUFFIX)
    }

    /// Login endpoint, falling back to the public cloud authority
    pub fn authority_host(&self) -> &str {
        if self.login_endpoint.is_empty() {
            DEFAULT_LOGIN_ENDPOINT
        } else {
            &self.login_endpoint
        }
    }
}

/// Fetch `<endpoint>/v1/rest/auth/metadata` without authentication.
///
/// A 404 means the service predates the metadata endpoint and yields an empty
/// [`CloudInfo`]. Any other status of 300 or above, an empty body, or a body
/// that is not valid JSON fails the resolution.
pub async fn fetch_cloud_info(transport: &dyn HttpTransport, endpoint: &Url) -> Result<CloudInfo> {
    let url = join_path(endpoint, METADATA_PATH);
    let logger = ApiLogger::default();
    let context = logger.start_operation("metadata", url.as_str(), &uuid::Uuid::new_v4().to_string());

    let headers = HeaderMap::new();
    logger.log_request(&context, "GET", url.as_str(), &headers);

    let response = transport
        .send(HttpRequest::get(&url, &headers))
        .await
        .map_err(|e| KustoError::resolution_with(format!("failed to get metadata from {}", url), e))?;

    logger.log_response(&context, response.status, &response.headers);

    let result = interpret_response(&url, response.status, &response.body);
    logger.complete_operation(&context, result.as_ref().err().map(|e| e.to_string()).as_deref());
    result
}

fn interpret_response(url: &Url, status: StatusCode, body: &[u8]) -> Result<CloudInfo> {
    if status == StatusCode::NOT_FOUND {
        info!("No metadata endpoint at {}, using empty cloud info", url);
        return Ok(CloudInfo::default());
    }

    if status.as_u16() >= 300 {
        return Err(KustoError::resolution(format!(
            "error {} when querying endpoint {}",
            status, url
        )));
    }

    if body.is_empty() {
        return Err(KustoError::resolution(format!(
            "empty response body when querying endpoint {}",
            url
        )));
    }

    let cloud_info = CloudInfo::from_json(body)?;
    debug!(
        "Resolved cloud info: login endpoint {}, resource {}, mfa {}",
        cloud_info.login_endpoint, cloud_info.kusto_service_resource_id, cloud_info.login_mfa_required
    );
    Ok(cloud_info)
}
