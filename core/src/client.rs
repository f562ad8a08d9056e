//! Request builder, response parser and the generic invoker.
//!
//! # Design
//! `MoodleClient` holds its configuration and a `Transport`, and nothing
//! else: no per-call state lives on the client, so one instance can serve
//! concurrent calls from several threads. As with a plain build/parse
//! client, each round-trip is split into `build_*` (produces an
//! `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); `execute`
//! glues the two together around a single `Transport::get`.
//!
//! Every RPC, typed or not, goes through `execute`. That is where the
//! configuration is checked, and where the error codes listed in
//! `PROMOTED_ERROR_CODES` are turned into `ApiError`s.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::MoodleConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::method::{Format, Method};
use crate::query::{rpc_params, QueryParams};
use crate::response::{ApiResponse, AuthResponse};
use crate::types::AuthToken;

pub const RPC_PATH: &str = "webservice/rest/server.php";
pub const TOKEN_PATH: &str = "login/token.php";

/// Vendor error codes raised as `ApiError` instead of being returned as a
/// `Failed` response.
pub const PROMOTED_ERROR_CODES: &[&str] = &["invalidparameter"];

/// Client for a Moodle site's REST web services.
#[derive(Debug, Clone)]
pub struct MoodleClient<T = UreqTransport> {
    config: MoodleConfig,
    transport: T,
}

impl MoodleClient {
    pub fn new(config: MoodleConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> MoodleClient<T> {
    pub fn with_transport(config: MoodleConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &MoodleConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the GET request for `method` with `params`.
    ///
    /// Fails with a configuration error before anything else if the host or
    /// the token is missing.
    pub fn build_call(&self, method: &str, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let (host, token) = self.config.require_rpc()?;
        let all = rpc_params(token.revealed(), Format::Json, method, params)?;
        let mut url = host.join(RPC_PATH).map_err(ConfigError::InvalidHost)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in all.iter() {
                pairs.append_pair(key, value);
            }
        }
        Ok(HttpRequest { url: url.into() })
    }

    /// Build the `login/token.php` request. Only the host is required.
    pub fn build_token_request(&self, username: &str, password: &str, service: &str) -> Result<HttpRequest, ApiError> {
        let host = self.config.require_host()?;
        let mut url = host.join(TOKEN_PATH).map_err(ConfigError::InvalidHost)?;
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("password", password)
            .append_pair("service", service);
        Ok(HttpRequest { url: url.into() })
    }

    /// Classify the response to `request` and bind it to `R`.
    pub fn parse_call<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<ApiResponse<R>, ApiError> {
        let envelope = match Envelope::parse(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => return Err(check_status(response).err().unwrap_or(err)),
        };
        ApiResponse::from_envelope(envelope, request.url.as_str(), response.body)
    }

    pub fn parse_token(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<AuthResponse<AuthToken>, ApiError> {
        match AuthResponse::parse(&response.body, request.url.as_str()) {
            Ok(parsed) => Ok(parsed),
            Err(err) => Err(check_status(response).err().unwrap_or(err)),
        }
    }

    /// Exchange a username and password for a web-service token.
    ///
    /// `service` is the external service shortname, e.g. `moodle_mobile_app`.
    pub fn get_token(&self, username: &str, password: &str, service: &str) -> Result<AuthResponse<AuthToken>, ApiError> {
        let request = self.build_token_request(username, password, service)?;
        debug!("requesting token for service {service}");
        let response = self.transport.get(&request)?;
        self.parse_token(&request, response)
    }

    /// Call a registered method with prepared parameters.
    pub fn call<R: DeserializeOwned>(&self, method: Method, params: &QueryParams) -> Result<ApiResponse<R>, ApiError> {
        self.execute(method.as_str(), params)
    }

    /// Call any method literal with a serializable parameter object.
    ///
    /// `params` is flattened into bracketed keys (see
    /// `QueryParams::from_serialize`); pass `&()` for a call without
    /// parameters.
    pub fn invoke<R, P>(&self, method: &str, params: &P) -> Result<ApiResponse<R>, ApiError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let params = QueryParams::from_serialize(params)?;
        self.execute(method, &params)
    }

    pub(crate) fn execute<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse<R>, ApiError> {
        let request = self.build_call(method, params)?;
        debug!("calling {method} with {} parameters", params.len());
        let response = self.transport.get(&request)?;
        let parsed = self.parse_call(&request, response)?;
        promote(method, parsed)
    }
}

fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body,
    })
}

fn promote<R>(method: &str, response: ApiResponse<R>) -> Result<ApiResponse<R>, ApiError> {
    let Some(error) = response.error() else {
        return Ok(response);
    };
    if !PROMOTED_ERROR_CODES.contains(&error.errorcode.as_str()) {
        return Ok(response);
    }
    warn!("{method} rejected: {} ({})", error.message, error.errorcode);
    Err(ApiError::InvalidParameter {
        response_text: response.response_text().to_string(),
        requested_path: response.requested_path().to_string(),
        error: error.clone(),
    })
}
