//! Typed responses bound to the request that produced them.
//!
//! # Design
//! `ApiResponse<T>` keeps the outcome as `Result<T, RpcError>`, so the
//! status and the error can never disagree: `status()` is derived from the
//! variant and `error()` is `Some` exactly when the status is `Failed`.
//! Result types only need `DeserializeOwned`; the failure side is the same
//! `RpcError` for every call.

use std::fmt;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::envelope::{Envelope, RpcError};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "Success"),
            Status::Failed => write!(f, "Failed"),
        }
    }
}

/// Outcome of one RPC call.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    requested_path: String,
    response_text: String,
    result: Result<T, RpcError>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Bind a parsed envelope to `T`.
    ///
    /// A success envelope that does not deserialize into `T` is an
    /// `ApiError::DeserializationError`, not a `Failed` response.
    pub fn from_envelope(
        envelope: Envelope,
        requested_path: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let result = match envelope {
            Envelope::Error(error) => Err(error),
            success => {
                let value = success.into_value().unwrap_or_default();
                Ok(serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))?)
            }
        };
        let response = Self {
            requested_path: requested_path.into(),
            response_text: response_text.into(),
            result,
        };
        debug!("response classified as {}", response.status());
        Ok(response)
    }
}

impl<T> ApiResponse<T> {
    pub fn status(&self) -> Status {
        match self.result {
            Ok(_) => Status::Success,
            Err(_) => Status::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.result.as_ref().err()
    }

    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn into_data(self) -> Option<T> {
        self.result.ok()
    }

    pub fn into_result(self) -> Result<T, RpcError> {
        self.result
    }

    /// The URL that was requested, token included.
    pub fn requested_path(&self) -> &str {
        &self.requested_path
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }
}

/// Outcome of a `login/token.php` call.
///
/// That endpoint reports failures as `{"error": ..., "errorcode": ...}`, so
/// `error().message` is read from the `error` key.
#[derive(Debug, Clone)]
pub struct AuthResponse<T> {
    requested_path: String,
    response_text: String,
    result: Result<T, RpcError>,
}

impl<T: DeserializeOwned> AuthResponse<T> {
    pub fn parse(raw: &str, requested_path: impl Into<String>) -> Result<Self, ApiError> {
        let object: Map<String, Value> =
            serde_json::from_str(raw.trim()).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let result = if object.contains_key("errorcode") || object.contains_key("error") {
            Err(RpcError::from_object(&object, "error"))
        } else {
            Ok(serde_json::from_value(Value::Object(object))
                .map_err(|e| ApiError::DeserializationError(e.to_string()))?)
        };
        Ok(Self {
            requested_path: requested_path.into(),
            response_text: raw.to_string(),
            result,
        })
    }
}

impl<T> AuthResponse<T> {
    pub fn status(&self) -> Status {
        match self.result {
            Ok(_) => Status::Success,
            Err(_) => Status::Failed,
        }
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.result.as_ref().err()
    }

    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn into_result(self) -> Result<T, RpcError> {
        self.result
    }

    pub fn requested_path(&self) -> &str {
        &self.requested_path
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::types::{AuthToken, CalendarEvents, SignupSettings, Success, UserSearch};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Account {
        id: i64,
        username: String,
    }

    fn bind<T: DeserializeOwned>(raw: &str) -> Result<ApiResponse<T>, ApiError> {
        ApiResponse::from_envelope(Envelope::parse(raw)?, "http://moodle/x", raw)
    }

    #[test]
    fn object_binds_to_declared_type() {
        let response: ApiResponse<Account> = bind(r#"{"id":1,"username":"x"}"#).unwrap();
        assert_eq!(response.status(), Status::Success);
        assert!(response.error().is_none());
        assert_eq!(
            response.data(),
            Some(&Account {
                id: 1,
                username: "x".into()
            })
        );
        assert_eq!(response.requested_path(), "http://moodle/x");
        assert_eq!(response.response_text(), r#"{"id":1,"username":"x"}"#);
    }

    #[test]
    fn records_bind_to_vec() {
        let response: ApiResponse<Vec<String>> = bind(r#"["a","b"]"#).unwrap();
        assert_eq!(response.into_data().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn error_envelope_is_failed_with_error() {
        let response: ApiResponse<Account> = bind(r#"{"errorcode":"invalidparameter","message":"bad"}"#).unwrap();
        assert_eq!(response.status(), Status::Failed);
        assert_eq!(response.status().to_string(), "Failed");
        let error = response.error().unwrap();
        assert_eq!(error.errorcode, "invalidparameter");
        assert_eq!(error.message, "bad");
        assert!(response.data().is_none());
    }

    #[test]
    fn null_binds_to_success_marker() {
        let response: ApiResponse<Success> = bind("null").unwrap();
        assert_eq!(response.status(), Status::Success);
        assert!(response.data().unwrap().warnings.is_empty());
    }

    #[test]
    fn null_binds_to_defaulted_structs() {
        let settings: ApiResponse<SignupSettings> = bind("null").unwrap();
        assert_eq!(settings.into_data(), Some(SignupSettings::default()));

        let search: ApiResponse<UserSearch> = bind(" NULL ").unwrap();
        assert!(search.into_data().unwrap().users.is_empty());

        let events: ApiResponse<CalendarEvents> = bind("null").unwrap();
        assert_eq!(events.status(), Status::Success);
        assert!(events.error().is_none());

        let raw: ApiResponse<Value> = bind("null").unwrap();
        assert_eq!(raw.into_data(), Some(Value::Object(Map::new())));
    }

    #[test]
    fn mismatched_payload_is_deserialization_error() {
        let err = bind::<Account>(r#"["a"]"#).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn auth_token_is_parsed() {
        let response: AuthResponse<AuthToken> =
            AuthResponse::parse(r#"{"token":"abc123","privatetoken":null}"#, "http://moodle/login/token.php").unwrap();
        assert_eq!(response.status(), Status::Success);
        assert_eq!(response.data().unwrap().token, "abc123");
    }

    #[test]
    fn auth_error_reads_message_from_error_key() {
        let raw = r#"{"error":"Invalid login, please try again","errorcode":"invalidlogin","stacktrace":null,"debuginfo":null}"#;
        let response: AuthResponse<AuthToken> = AuthResponse::parse(raw, "p").unwrap();
        assert_eq!(response.status(), Status::Failed);
        let error = response.error().unwrap();
        assert_eq!(error.errorcode, "invalidlogin");
        assert_eq!(error.message, "Invalid login, please try again");
        assert!(error.debuginfo.is_none());
    }

    #[test]
    fn auth_rejects_non_object() {
        let err = AuthResponse::<AuthToken>::parse("[]", "p").unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
