//! Request properties sent alongside a query
//!
//! [`QueryOptions`] is a fluent builder over [`RequestProperties`]. Server
//! options end up in the `properties.Options` object of the request body,
//! bound parameters in `properties.Parameters`, and the identity values in
//! request headers.

use super::params::{Definitions, Parameters};
use crate::error::Result;
use crate::types::timespan;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub const RESULTS_PROGRESSIVE_ENABLED: &str = "results_progressive_enabled";
pub const NO_REQUEST_TIMEOUT: &str = "norequesttimeout";
pub const NO_TRUNCATION: &str = "notruncation";
pub const SERVER_TIMEOUT: &str = "servertimeout";
pub const DEFER_PARTIAL_QUERY_FAILURES: &str = "deferpartialqueryfailures";
pub const MAX_MEMORY_CONSUMPTION_PER_QUERY_PER_NODE: &str = "max_memory_consumption_per_query_per_node";
pub const MAX_MEMORY_CONSUMPTION_PER_ITERATOR: &str = "maxmemoryconsumptionperiterator";
pub const MAX_OUTPUT_COLUMNS: &str = "maxoutputcolumns";
pub const PUSH_SELECTION_THROUGH_AGGREGATION: &str = "push_selection_through_aggregation";
pub const QUERY_CURSOR_AFTER_DEFAULT: &str = "query_cursor_after_default";
pub const QUERY_CURSOR_BEFORE_OR_AT_DEFAULT: &str = "query_cursor_before_or_at_default";
pub const QUERY_CURSOR_CURRENT: &str = "query_cursor_current";
pub const QUERY_CURSOR_DISABLED: &str = "query_cursor_disabled";
pub const QUERY_CURSOR_SCOPED_TABLES: &str = "query_cursor_scoped_tables";
pub const QUERY_DATASCOPE: &str = "query_datascope";
pub const QUERY_DATETIMESCOPE_COLUMN: &str = "query_datetimescope_column";
pub const QUERY_DATETIMESCOPE_FROM: &str = "query_datetimescope_from";
pub const QUERY_DATETIMESCOPE_TO: &str = "query_datetimescope_to";
pub const CLIENT_MAX_REDIRECT_COUNT: &str = "client_max_redirect_count";
pub const MATERIALIZED_VIEW_SHUFFLE: &str = "materialized_view_shuffle";
pub const QUERY_BIN_AUTO_AT: &str = "query_bin_auto_at";
pub const QUERY_BIN_AUTO_SIZE: &str = "query_bin_auto_size";
pub const QUERY_DISTRIBUTION_NODES_SPAN: &str = "query_distribution_nodes_span";
pub const QUERY_FANOUT_NODES_PERCENT: &str = "query_fanout_nodes_percent";
pub const QUERY_FANOUT_THREADS_PERCENT: &str = "query_fanout_threads_percent";
pub const QUERY_FORCE_ROW_LEVEL_SECURITY: &str = "query_force_row_level_security";
pub const QUERY_LANGUAGE: &str = "query_language";
pub const QUERY_LOG_QUERY_PARAMETERS: &str = "query_log_query_parameters";
pub const QUERY_MAX_ENTITIES_IN_UNION: &str = "query_max_entities_in_union";
pub const QUERY_NOW: &str = "query_now";
pub const QUERY_PYTHON_DEBUG: &str = "query_python_debug";
pub const QUERY_RESULTS_APPLY_GETSCHEMA: &str = "query_results_apply_getschema";
pub const QUERY_RESULTS_CACHE_MAX_AGE: &str = "query_results_cache_max_age";
pub const QUERY_RESULTS_CACHE_PER_SHARD: &str = "query_results_cache_per_shard";
pub const QUERY_RESULTS_PROGRESSIVE_ROW_COUNT: &str = "query_results_progressive_row_count";
pub const QUERY_RESULTS_PROGRESSIVE_UPDATE_PERIOD: &str = "query_results_progressive_update_period";
pub const QUERY_TAKE_MAX_RECORDS: &str = "query_take_max_records";
pub const QUERY_CONSISTENCY: &str = "queryconsistency";
pub const REQUEST_APP_NAME: &str = "request_app_name";
pub const REQUEST_BLOCK_ROW_LEVEL_SECURITY: &str = "request_block_row_level_security";
pub const REQUEST_CALLOUT_DISABLED: &str = "request_callout_disabled";
pub const REQUEST_DESCRIPTION: &str = "request_description";
pub const REQUEST_EXTERNAL_TABLE_DISABLED: &str = "request_external_table_disabled";
pub const REQUEST_IMPERSONATION_DISABLED: &str = "request_impersonation_disabled";
pub const REQUEST_READONLY: &str = "request_readonly";
pub const REQUEST_REMOTE_ENTITIES_DISABLED: &str = "request_remote_entities_disabled";
pub const REQUEST_SANDBOXED_EXECUTION_DISABLED: &str = "request_sandboxed_execution_disabled";
pub const REQUEST_USER: &str = "request_user";
pub const TRUNCATION_MAX_RECORDS: &str = "truncation_max_records";
pub const TRUNCATION_MAX_SIZE: &str = "truncation_max_size";
pub const VALIDATE_PERMISSIONS: &str = "validate_permissions";

/// The `properties` object of a query request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestProperties {
    #[serde(rename = "Options", skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, JsonValue>,
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(skip)]
    pub application: Option<String>,
    #[serde(skip)]
    pub user: Option<String>,
    #[serde(skip)]
    pub client_request_id: Option<String>,
}

impl RequestProperties {
    /// Nothing that would go into the body
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.parameters.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    properties: RequestProperties,
    declaration: String,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `x-ms-client-request-id`, visible in `.show queries`
    pub fn client_request_id(mut self, id: impl Into<String>) -> Self {
        self.properties.client_request_id = Some(id.into());
        self
    }

    /// Sets `x-ms-app`
    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.properties.application = Some(name.into());
        self
    }

    /// Sets `x-ms-user`
    pub fn user(mut self, name: impl Into<String>) -> Self {
        self.properties.user = Some(name.into());
        self
    }

    /// Set any server option by name
    pub fn option(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.options.insert(name.into(), value.into());
        self
    }

    pub fn no_request_timeout(self) -> Self {
        self.option(NO_REQUEST_TIMEOUT, true)
    }

    pub fn no_truncation(self) -> Self {
        self.option(NO_TRUNCATION, true)
    }

    pub fn results_progressive_enabled(self) -> Self {
        self.option(RESULTS_PROGRESSIVE_ENABLED, true)
    }

    /// Overrides the server's default request timeout
    pub fn server_timeout(self, timeout: TimeDelta) -> Self {
        self.option(SERVER_TIMEOUT, timespan::marshal(Some(&timeout)))
    }

    /// Report partial query failures as part of the result set
    pub fn defer_partial_query_failures(self) -> Self {
        self.option(DEFER_PARTIAL_QUERY_FAILURES, true)
    }

    pub fn max_memory_consumption_per_query_per_node(self, bytes: u64) -> Self {
        self.option(MAX_MEMORY_CONSUMPTION_PER_QUERY_PER_NODE, bytes)
    }

    pub fn max_memory_consumption_per_iterator(self, bytes: u64) -> Self {
        self.option(MAX_MEMORY_CONSUMPTION_PER_ITERATOR, bytes)
    }

    pub fn max_output_columns(self, columns: u64) -> Self {
        self.option(MAX_OUTPUT_COLUMNS, columns)
    }

    pub fn query_consistency(self, consistency: impl Into<String>) -> Self {
        self.option(QUERY_CONSISTENCY, consistency.into())
    }

    /// `default`, `all` or `hotcache`
    pub fn query_datascope(self, datascope: impl Into<String>) -> Self {
        self.option(QUERY_DATASCOPE, datascope.into())
    }

    /// Value of `now()` for the query
    pub fn query_now(self, now: DateTime<Utc>) -> Self {
        self.option(QUERY_NOW, format!("datetime({})", now.to_rfc3339()))
    }

    pub fn query_results_cache_max_age(self, max_age: TimeDelta) -> Self {
        self.option(QUERY_RESULTS_CACHE_MAX_AGE, timespan::marshal(Some(&max_age)))
    }

    pub fn query_take_max_records(self, records: u64) -> Self {
        self.option(QUERY_TAKE_MAX_RECORDS, records)
    }

    pub fn query_fanout_nodes_percent(self, percent: u32) -> Self {
        self.option(QUERY_FANOUT_NODES_PERCENT, percent)
    }

    pub fn query_fanout_threads_percent(self, percent: u32) -> Self {
        self.option(QUERY_FANOUT_THREADS_PERCENT, percent)
    }

    pub fn query_force_row_level_security(self) -> Self {
        self.option(QUERY_FORCE_ROW_LEVEL_SECURITY, true)
    }

    /// Reject any query that could write
    pub fn request_readonly(self) -> Self {
        self.option(REQUEST_READONLY, true)
    }

    pub fn request_description(self, description: impl Into<String>) -> Self {
        self.option(REQUEST_DESCRIPTION, description.into())
    }

    pub fn request_app_name(self, name: impl Into<String>) -> Self {
        self.option(REQUEST_APP_NAME, name.into())
    }

    pub fn request_user(self, user: impl Into<String>) -> Self {
        self.option(REQUEST_USER, user.into())
    }

    pub fn request_block_row_level_security(self) -> Self {
        self.option(REQUEST_BLOCK_ROW_LEVEL_SECURITY, true)
    }

    pub fn request_callout_disabled(self) -> Self {
        self.option(REQUEST_CALLOUT_DISABLED, true)
    }

    pub fn request_external_table_disabled(self) -> Self {
        self.option(REQUEST_EXTERNAL_TABLE_DISABLED, true)
    }

    pub fn request_impersonation_disabled(self) -> Self {
        self.option(REQUEST_IMPERSONATION_DISABLED, true)
    }

    pub fn request_remote_entities_disabled(self) -> Self {
        self.option(REQUEST_REMOTE_ENTITIES_DISABLED, true)
    }

    pub fn request_sandboxed_execution_disabled(self) -> Self {
        self.option(REQUEST_SANDBOXED_EXECUTION_DISABLED, true)
    }

    pub fn truncation_max_records(self, records: u64) -> Self {
        self.option(TRUNCATION_MAX_RECORDS, records)
    }

    pub fn truncation_max_size(self, bytes: u64) -> Self {
        self.option(TRUNCATION_MAX_SIZE, bytes)
    }

    /// Declare query parameters and bind values to them.
    ///
    /// The declaration clause is prepended to the statement when the query is
    /// sent; the bound values go into `properties.Parameters`.
    pub fn parameters(mut self, definitions: &Definitions, values: &Parameters) -> Result<Self> {
        self.properties.parameters = values.to_literals(definitions)?;
        self.declaration = definitions.to_declaration();
        Ok(self)
    }

    pub fn properties(&self) -> &RequestProperties {
        &self.properties
    }

    /// Statement as sent to the service, with any parameter declaration in front
    pub fn statement(&self, statement: &str) -> String {
        if self.declaration.is_empty() {
            statement.to_string()
        } else {
            format!("{}\n{}", self.declaration, statement)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::params::ParamType;
    use crate::error::ErrorKind;
    use crate::types::ValueKind;
    use serde_json::json;

    #[test]
    fn test_empty_options_serialize_to_nothing() {
        let options = QueryOptions::new().client_request_id("abc").user("me");
        assert!(options.properties().is_empty());
        assert_eq!(serde_json::to_value(options.properties()).unwrap(), json!({}));
    }

    #[test]
    fn test_options_serialize() {
        let options = QueryOptions::new()
            .no_truncation()
            .server_timeout(TimeDelta::minutes(10))
            .truncation_max_records(5000)
            .option(QUERY_LANGUAGE, "kql");

        assert_eq!(
            serde_json::to_value(options.properties()).unwrap(),
            json!({
                "Options": {
                    "notruncation": true,
                    "servertimeout": "00:10:00",
                    "truncation_max_records": 5000,
                    "query_language": "kql"
                }
            })
        );
    }

    #[test]
    fn test_identity_values_are_kept_out_of_the_body() {
        let options = QueryOptions::new()
            .client_request_id("KC.execute;1")
            .application("app")
            .user("user")
            .request_readonly();

        let body = serde_json::to_value(options.properties()).unwrap();
        assert_eq!(body, json!({"Options": {"request_readonly": true}}));
        assert_eq!(options.properties().application.as_deref(), Some("app"));
        assert_eq!(options.properties().client_request_id.as_deref(), Some("KC.execute;1"));
    }

    #[test]
    fn test_parameters_prefix_statement() {
        let definitions = Definitions::new()
            .add(ParamType::new("n", ValueKind::Long).unwrap())
            .unwrap();
        let options = QueryOptions::new()
            .parameters(&definitions, &Parameters::new().with("n", 3i64))
            .unwrap();

        assert_eq!(
            options.statement("T | take n"),
            "declare query_parameters(n:long);\nT | take n"
        );
        assert_eq!(
            serde_json::to_value(options.properties()).unwrap(),
            json!({"Parameters": {"n": "long(3)"}})
        );
    }

    #[test]
    fn test_statement_without_parameters() {
        assert_eq!(QueryOptions::new().statement("T | count"), "T | count");
    }

    #[test]
    fn test_undeclared_parameter() {
        let err = QueryOptions::new()
            .parameters(&Definitions::new(), &Parameters::new().with("n", 3i64))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
