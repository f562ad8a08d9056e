//! Flattened query parameters in Moodle's bracketed-index encoding.
//!
//! # Design
//! `QueryParams` is an ordered list of `(key, value)` pairs. Keys are unique:
//! pushing an existing key replaces its value in place, so a call can never
//! send the same field twice. Optional values are `Option`s and contribute
//! nothing when `None`; there are no in-band "unset" sentinels.
//!
//! `wstoken`, `wsfunction` and `moodlewsrestformat` belong to the call
//! itself; parameter sets carrying any of them are rejected rather than
//! allowed to override the method or the token.
//!
//! Nothing here percent-encodes. `to_query_string` is the raw form used for
//! diagnostics and tests; the client encodes every pair when it builds the
//! request URL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::method::Format;

/// Keys written by the client for every RPC call.
pub const RESERVED_KEYS: [&str; 3] = ["wstoken", "wsfunction", "moodlewsrestformat"];

/// A scalar that can be written as a query value.
pub trait QueryValue {
    fn to_query_value(&self) -> String;
}

impl QueryValue for str {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }
}

// Moodle's PARAM_BOOL only accepts 0/1.
impl QueryValue for bool {
    fn to_query_value(&self) -> String {
        let digit = if *self { "1" } else { "0" };
        digit.to_string()
    }
}

macro_rules! numeric_query_value {
    ($($t:ty),*) => {
        $(impl QueryValue for $t {
            fn to_query_value(&self) -> String {
                self.to_string()
            }
        })*
    };
}

numeric_query_value!(i32, i64, u32, u64, usize);

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_value(&self) -> String {
        (**self).to_query_value()
    }
}

/// Seconds since the Unix epoch, normalized to UTC.
pub fn unix_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> i64 {
    instant.timestamp()
}

/// Ordered, key-unique query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
    // key -> position in `pairs`
    index: HashMap<String, usize>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an earlier value for the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl QueryValue) -> &mut Self {
        let key = key.into();
        let value = value.to_query_value();
        match self.index.get(&key) {
            Some(&pos) => self.pairs[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.pairs.len());
                self.pairs.push((key, value));
            }
        }
        self
    }

    pub fn push_opt<V: QueryValue>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn push_instant<Tz: TimeZone>(&mut self, key: impl Into<String>, instant: &DateTime<Tz>) -> &mut Self {
        self.push(key, unix_timestamp(instant))
    }

    pub fn push_duration(&mut self, key: impl Into<String>, duration: Duration) -> &mut Self {
        self.push(key, duration.as_secs())
    }

    /// Write `name[i]=value` for every element.
    pub fn push_list<V: QueryValue>(&mut self, name: &str, values: &[V]) -> &mut Self {
        for (i, value) in values.iter().enumerate() {
            self.push(format!("{name}[{i}]"), value);
        }
        self
    }

    /// Open the record `name[index]` for writing its fields.
    pub fn record(&mut self, name: &str, index: usize) -> Record<'_> {
        Record {
            prefix: format!("{name}[{index}]"),
            params: self,
        }
    }

    /// Write every element of `records` under `name[i]`, all fields of one
    /// element sharing the same index.
    pub fn push_records<R: ToRecord>(&mut self, name: &str, records: &[R]) -> &mut Self {
        for (i, item) in records.iter().enumerate() {
            item.write_fields(&mut self.record(name, i));
        }
        self
    }

    /// Flatten any serializable parameter object.
    ///
    /// Object fields become `parent[field]`, array elements `parent[i]`,
    /// booleans `1`/`0`; `null` contributes nothing. The top level must be
    /// an object (or `null`, which yields no parameters) and must not use
    /// any of `RESERVED_KEYS`.
    pub fn from_serialize<P: Serialize + ?Sized>(params: &P) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut out = QueryParams::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    out.flatten(key, value);
                }
            }
            other => {
                return Err(ApiError::SerializationError(format!(
                    "parameters must serialize to an object, got {other}"
                )))
            }
        }
        out.check_reserved()?;
        Ok(out)
    }

    /// Fail if any key would collide with the fixed RPC parameters.
    pub fn check_reserved(&self) -> Result<(), ApiError> {
        match RESERVED_KEYS.iter().find(|key| self.contains_key(key)) {
            Some(key) => Err(ApiError::SerializationError(format!("`{key}` is reserved for the call itself"))),
            None => Ok(()),
        }
    }

    fn flatten(&mut self, key: String, value: Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.push(key, b);
            }
            Value::Number(n) => {
                self.push(key, n.to_string());
            }
            Value::String(s) => {
                self.push(key, s);
            }
            Value::Array(items) => {
                for (i, item) in items.into_iter().enumerate() {
                    self.flatten(format!("{key}[{i}]"), item);
                }
            }
            Value::Object(map) => {
                for (field, item) in map {
                    self.flatten(format!("{key}[{field}]"), item);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.pairs[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `k1=v1&k2=v2...` without percent-encoding.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Writer for the fields of one indexed record, e.g. `users[0][...]`.
pub struct Record<'a> {
    params: &'a mut QueryParams,
    prefix: String,
}

impl Record<'_> {
    pub fn field(&mut self, name: &str, value: impl QueryValue) -> &mut Self {
        let key = format!("{}[{name}]", self.prefix);
        self.params.push(key, value);
        self
    }

    pub fn opt_field<V: QueryValue>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.field(name, value);
        }
        self
    }

    pub fn instant_field<Tz: TimeZone>(&mut self, name: &str, instant: Option<&DateTime<Tz>>) -> &mut Self {
        if let Some(instant) = instant {
            self.field(name, unix_timestamp(instant));
        }
        self
    }

    pub fn duration_field(&mut self, name: &str, duration: Option<Duration>) -> &mut Self {
        if let Some(duration) = duration {
            self.field(name, duration.as_secs());
        }
        self
    }

    /// Open the nested record `prefix[name][index]`.
    pub fn nested(&mut self, name: &str, index: usize) -> Record<'_> {
        Record {
            prefix: format!("{}[{name}][{index}]", self.prefix),
            params: &mut *self.params,
        }
    }
}

/// A request input that occupies one indexed record.
pub trait ToRecord {
    fn write_fields(&self, record: &mut Record<'_>);
}

/// Build the query string for one RPC call: `wstoken`, `wsfunction` and
/// `moodlewsrestformat` first, then `params` in insertion order.
///
/// Fails with `ApiError::SerializationError` if `params` uses a reserved key.
pub fn encode(token: &str, format: Format, method: &str, params: &QueryParams) -> Result<String, ApiError> {
    Ok(rpc_params(token, format, method, params)?.to_query_string())
}

pub(crate) fn rpc_params(
    token: &str,
    format: Format,
    method: &str,
    params: &QueryParams,
) -> Result<QueryParams, ApiError> {
    params.check_reserved()?;
    let mut all = QueryParams::new();
    all.push("wstoken", token)
        .push("wsfunction", method)
        .push("moodlewsrestformat", format.as_str());
    for (key, value) in params.iter() {
        all.push(key, value);
    }
    Ok(all)
}
