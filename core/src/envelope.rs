//! Classification of raw response bodies.
//!
//! # Design
//! The server has no uniform envelope: a call may answer with a JSON array,
//! a bare object, the literal `null`, or an error object. `Envelope::parse`
//! probes those shapes in a fixed order instead of assuming a schema. An
//! object is a failure exactly when it carries an `errorcode` key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// The error object the server returns in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub errorcode: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debuginfo: Option<String>,
}

impl RpcError {
    /// Read the error fields of an object known to carry `errorcode`.
    /// `message_key` differs between the RPC endpoint and `token.php`.
    pub(crate) fn from_object(object: &Map<String, Value>, message_key: &str) -> Self {
        Self {
            errorcode: text(object, "errorcode").unwrap_or_default(),
            message: text(object, message_key).unwrap_or_default(),
            exception: text(object, "exception"),
            debuginfo: text(object, "debuginfo"),
        }
    }
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A parsed response body, before it is bound to a result type.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The body was the literal `null`: a success with no payload.
    Empty,
    /// A JSON array of records.
    Records(Vec<Value>),
    /// A JSON object without an error code.
    Object(Map<String, Value>),
    /// A JSON object carrying `errorcode`.
    Error(RpcError),
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Ok(Envelope::Empty);
        }
        if let Ok(records) = serde_json::from_str::<Vec<Value>>(trimmed) {
            return Ok(Envelope::Records(records));
        }
        match serde_json::from_str::<Map<String, Value>>(trimmed) {
            Ok(object) if object.contains_key("errorcode") => {
                Ok(Envelope::Error(RpcError::from_object(&object, "message")))
            }
            Ok(object) => Ok(Envelope::Object(object)),
            Err(e) => Err(ApiError::MalformedResponse(e.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Envelope::Error(_))
    }

    /// The success payload as a single JSON value; `None` for errors.
    ///
    /// `Empty` yields an empty object, so result types whose fields all
    /// have defaults bind to it.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Envelope::Empty => Some(Value::Object(Map::new())),
            Envelope::Records(records) => Some(Value::Array(records)),
            Envelope::Object(object) => Some(Value::Object(object)),
            Envelope::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_in_any_casing_is_empty_success() {
        for raw in ["null", "NULL", "Null", " null\n"] {
            let envelope = Envelope::parse(raw).unwrap();
            assert_eq!(envelope, Envelope::Empty, "{raw:?}");
            assert!(envelope.is_success());
        }
    }

    #[test]
    fn array_is_records() {
        let envelope = Envelope::parse(r#"["a","b"]"#).unwrap();
        match envelope {
            Envelope::Records(records) => assert_eq!(records.len(), 2),
            other => panic!("expected records, got {other:?}"),
        }
    }

    #[test]
    fn object_without_errorcode_is_success() {
        let envelope = Envelope::parse(r#"{"id":1,"username":"x"}"#).unwrap();
        assert!(envelope.is_success());
        assert!(matches!(envelope, Envelope::Object(ref o) if o["username"] == "x"));
    }

    #[test]
    fn object_with_errorcode_is_failure() {
        let raw = r#"{"exception":"invalid_parameter_exception","errorcode":"invalidparameter","message":"bad","debuginfo":"userid"}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(
            envelope,
            Envelope::Error(RpcError {
                errorcode: "invalidparameter".into(),
                message: "bad".into(),
                exception: Some("invalid_parameter_exception".into()),
                debuginfo: Some("userid".into()),
            })
        );
        assert!(envelope.into_value().is_none());
    }

    #[test]
    fn error_without_message_keeps_code() {
        let envelope = Envelope::parse(r#"{"errorcode":"nopermissions"}"#).unwrap();
        assert!(matches!(envelope, Envelope::Error(ref e) if e.errorcode == "nopermissions" && e.message.is_empty()));
    }

    #[test]
    fn garbage_is_malformed() {
        for raw in ["", "<html>oops</html>", "42", r#""text""#, "{broken"] {
            let err = Envelope::parse(raw).unwrap_err();
            assert!(matches!(err, ApiError::MalformedResponse(_)), "{raw:?}");
        }
    }

    #[test]
    fn empty_becomes_empty_object() {
        assert_eq!(Envelope::Empty.into_value(), Some(Value::Object(Map::new())));
    }
}
