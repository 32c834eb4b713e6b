//! Domain-level error type.
//!
//! These errors are transport agnostic. A serving layer maps them to HTTP
//! responses or any other protocol-specific envelope; the domain only cares
//! about the stable code, a human-readable message, and optional structured
//! details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
///
/// The codes mirror the error taxonomy of the system: validation failures
/// surface as [`ErrorCode::InvalidRequest`], authentication failures as
/// [`ErrorCode::Unauthorized`] (never distinguishing username from
/// password), missing records as [`ErrorCode::NotFound`], and degraded
/// infrastructure as [`ErrorCode::ServiceUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with existing state.
    Conflict,
    /// A collaborator the operation depends on is unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn constructors_set_the_expected_code() {
        assert_eq!(
            Error::invalid_request("bad").code(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(Error::unauthorized("no").code(), ErrorCode::Unauthorized);
        assert_eq!(Error::not_found("gone").code(), ErrorCode::NotFound);
        assert_eq!(
            Error::service_unavailable("down").code(),
            ErrorCode::ServiceUnavailable
        );
    }

    #[rstest]
    fn details_round_trip_through_serde() {
        let error = Error::invalid_request("bad").with_details(json!({ "field": "username" }));
        let value = serde_json::to_value(&error).expect("serialisable");
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["details"]["field"], "username");

        let parsed: Error = serde_json::from_value(value).expect("deserialisable");
        assert_eq!(parsed, error);
    }

    #[rstest]
    fn display_shows_the_message() {
        assert_eq!(Error::not_found("missing user").to_string(), "missing user");
    }
}
