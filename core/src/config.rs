//! Client configuration: the site URL and the web-service token.
//!
//! # Design
//! Configuration is a plain value handed to `MoodleClient::new`; nothing is
//! global. Both fields are optional because the token flow only needs a host.
//! The checks run per call, before any request is built.

use std::env;
use std::fmt::{Debug, Formatter};

use url::Url;

use crate::error::ConfigError;

pub const HOST_ENV: &str = "MOODLE_HOST";
pub const TOKEN_ENV: &str = "MOODLE_TOKEN";

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "xxx")
    }
}

impl Secret {
    pub fn revealed(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MoodleConfig {
    host: Option<Url>,
    token: Option<Secret>,
}

impl MoodleConfig {
    /// Configure the site root, e.g. `https://moodle.example.edu/`.
    /// An empty string leaves the host unset.
    pub fn new(host: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: parse_host(host)?,
            token: None,
        })
    }

    /// Read `MOODLE_HOST` and `MOODLE_TOKEN`. Missing variables leave the
    /// corresponding field unset; only an unparsable host is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_default();
        let mut config = Self::new(&host)?;
        if let Some(token) = lookup(TOKEN_ENV) {
            config = config.with_token(token);
        }
        Ok(config)
    }

    /// An empty token leaves the token unset.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then(|| Secret(token)),
            ..self
        }
    }

    pub fn host(&self) -> Option<&Url> {
        self.host.as_ref()
    }

    pub fn token(&self) -> Option<&Secret> {
        self.token.as_ref()
    }

    pub(crate) fn require_host(&self) -> Result<&Url, ConfigError> {
        self.host.as_ref().ok_or(ConfigError::HostNotConfigured)
    }

    pub(crate) fn require_rpc(&self) -> Result<(&Url, &Secret), ConfigError> {
        match (&self.host, &self.token) {
            (Some(host), Some(token)) => Ok((host, token)),
            (None, None) => Err(ConfigError::HostAndTokenNotConfigured),
            (None, Some(_)) => Err(ConfigError::HostNotConfigured),
            (Some(_), None) => Err(ConfigError::TokenNotConfigured),
        }
    }
}

fn parse_host(host: &str) -> Result<Option<Url>, ConfigError> {
    let host = host.trim();
    if host.is_empty() {
        return Ok(None);
    }
    let mut url = Url::parse(host)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::HostNotBase(host.to_string()));
    }
    // `Url::join` replaces the last path segment unless the base ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(Some(url))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn host_gets_trailing_slash() {
        let config = MoodleConfig::new("https://lms.example.edu/moodle").unwrap();
        assert_eq!(config.host().unwrap().as_str(), "https://lms.example.edu/moodle/");
        let joined = config.host().unwrap().join("login/token.php").unwrap();
        assert_eq!(joined.as_str(), "https://lms.example.edu/moodle/login/token.php");
    }

    #[test]
    fn empty_values_are_unset() {
        let config = MoodleConfig::new("").unwrap().with_token("");
        assert!(config.host().is_none());
        assert!(config.token().is_none());
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = MoodleConfig::new("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost(_)));
    }

    #[test]
    fn host_must_be_hierarchical() {
        for host in ["localhost:8080", "mailto:admin@example.edu", "data:text/plain,x"] {
            let err = MoodleConfig::new(host).unwrap_err();
            assert!(matches!(err, ConfigError::HostNotBase(ref h) if h == host), "{host}");
        }
        assert!(MoodleConfig::new("http://localhost:8080").is_ok());
    }

    #[test]
    fn lookup_reads_host_and_token() {
        let vars = HashMap::from([(HOST_ENV, "https://lms.example.edu"), (TOKEN_ENV, "abc")]);
        let config = MoodleConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.host().unwrap().as_str(), "https://lms.example.edu/");
        assert_eq!(config.token().unwrap().revealed(), "abc");
    }

    #[test]
    fn lookup_leaves_missing_variables_unset() {
        let config = MoodleConfig::from_lookup(|_| None).unwrap();
        assert!(config.host().is_none());
        assert!(config.token().is_none());

        let bad = MoodleConfig::from_lookup(|name| (name == HOST_ENV).then(|| "not a url".to_string()));
        assert!(matches!(bad, Err(ConfigError::InvalidHost(_))));
    }

    #[test]
    fn from_env_reads_process_environment() {
        let host = format!("http://from-env-{}.test", std::process::id());
        env::set_var(HOST_ENV, &host);
        env::remove_var(TOKEN_ENV);
        let config = MoodleConfig::from_env().unwrap();
        env::remove_var(HOST_ENV);
        assert_eq!(config.host().unwrap().as_str(), format!("{host}/"));
        assert!(config.token().is_none());
    }

    #[test]
    fn rpc_requirements_name_what_is_missing() {
        let neither = MoodleConfig::default();
        assert!(matches!(neither.require_rpc(), Err(ConfigError::HostAndTokenNotConfigured)));

        let host_only = MoodleConfig::new("http://localhost").unwrap();
        assert!(matches!(host_only.require_rpc(), Err(ConfigError::TokenNotConfigured)));
        assert!(host_only.require_host().is_ok());

        let token_only = MoodleConfig::default().with_token("t");
        assert!(matches!(token_only.require_rpc(), Err(ConfigError::HostNotConfigured)));
        assert!(matches!(token_only.require_host(), Err(ConfigError::HostNotConfigured)));

        let both = MoodleConfig::new("http://localhost").unwrap().with_token("t");
        let (host, token) = both.require_rpc().unwrap();
        assert_eq!(host.as_str(), "http://localhost/");
        assert_eq!(token.revealed(), "t");
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let config = MoodleConfig::default().with_token("supersecret");
        assert!(!format!("{config:?}").contains("supersecret"));
    }
}
