//! Mapping of domain errors onto GraphQL errors
//!
//! Every error carries `extensions.code`:
//! - `VALIDATION`: input rejected, message shown as-is
//! - `BAD_QUERY`: list arguments could not be interpreted
//! - `INTERNAL`: store failure, logged here and hidden from the client

use async_graphql::{Error, ErrorExtensions};
use crmctl_core::CrmError;

pub const CODE_VALIDATION: &str = "VALIDATION";
pub const CODE_BAD_QUERY: &str = "BAD_QUERY";
pub const CODE_INTERNAL: &str = "INTERNAL";

fn with_code(message: impl Into<String>, code: &'static str) -> Error {
    Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

/// Convert a service error into a GraphQL error
pub fn graphql_error(err: CrmError) -> Error {
    match err {
        CrmError::Validation(e) => with_code(e.to_string(), CODE_VALIDATION),
        CrmError::Query(e) => with_code(e.to_string(), CODE_BAD_QUERY),
        CrmError::Store(e) => {
            tracing::error!(error = %e, "store failure while resolving GraphQL request");
            with_code("internal error", CODE_INTERNAL)
        }
    }
}

/// Error for malformed arguments that never reach the service
pub fn bad_query(message: impl Into<String>) -> Error {
    with_code(message, CODE_BAD_QUERY)
}
