//! Client core for Moodle's REST web services.
//!
//! # Overview
//! Turns typed method calls into Moodle's bracketed query encoding, sends
//! them as GET requests to `webservice/rest/server.php`, and classifies the
//! loosely-shaped JSON answers into typed results or structured errors.
//!
//! # Design
//! - `Method` is the closed registry of wire literals; `Format` selects
//!   `moodlewsrestformat`.
//! - `QueryParams` builds ordered, key-unique parameters; optional values are
//!   `Option`s rather than sentinels.
//! - `Envelope::parse` probes `null`, array, then object, and recognises the
//!   vendor error object by its `errorcode` key.
//! - `ApiResponse<T>` binds an envelope to a result type and keeps the
//!   request URL and raw body next to it.
//! - `MoodleClient` builds requests, hands them to a `Transport` and parses
//!   the answers. Configuration is passed in at construction; nothing is
//!   global.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod method;
pub mod query;
pub mod requests;
pub mod response;
pub mod types;

pub use client::MoodleClient;
pub use config::MoodleConfig;
pub use envelope::{Envelope, RpcError};
pub use error::{ApiError, ConfigError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use method::{Format, Method};
pub use query::{encode, QueryParams};
pub use response::{ApiResponse, AuthResponse, Status};
