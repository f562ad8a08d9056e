//! Error types for the Moodle client.
//!
//! # Design
//! Vendor errors reported inside a well-formed envelope are data, not
//! `ApiError`s: they travel inside a `Failed` `ApiResponse`. Only the codes
//! listed in `client::PROMOTED_ERROR_CODES` are lifted into this enum.
//! Everything else here is a failure to complete the call at all.

use thiserror::Error;

use crate::envelope::RpcError;

/// Missing or unusable client configuration, detected before any request
/// is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("host is not set")]
    HostNotConfigured,

    #[error("token is not set")]
    TokenNotConfigured,

    #[error("host & token are not set")]
    HostAndTokenNotConfigured,

    #[error("invalid host url: {0}")]
    InvalidHost(#[from] url::ParseError),

    /// The host parsed, but not as a hierarchical URL (e.g. `localhost:8080`
    /// reads as scheme `localhost`), so endpoint paths cannot be joined to it.
    #[error("host url cannot be a base: {0}")]
    HostNotBase(String),
}

/// Errors returned by `MoodleClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A method literal outside the registry.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The transport could not complete the round-trip.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// The server answered with a non-2xx status and a body that is not a
    /// Moodle envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The body is neither a JSON array, a JSON object, nor `null`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A success envelope did not fit the declared result type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A parameter object could not be flattened into query parameters.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The server rejected a parameter (`invalidparameter`).
    #[error("invalid parameter: {}", .error.message)]
    InvalidParameter {
        response_text: String,
        requested_path: String,
        error: RpcError,
    },
}
