// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; a missing or malformed mandatory value is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SURVEY_ENCRYPTION_KEY` | 64 hex chars, AES-256-GCM key for survey envelopes | Required |
//! | `SURVEY_ADMIN_TOKEN` | Bearer token for `GET /api/surveys` (16+ chars) | Required |
//! | `DATA_DIR` | Directory holding the database, mirror, and user files | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use crate::auth::AdminToken;
use crate::crypto::{EnvelopeKey, KeyError};
use crate::storage::paths::DEFAULT_DATA_ROOT;

/// Environment variable name for the envelope encryption key (hex).
pub const ENCRYPTION_KEY_ENV: &str = "SURVEY_ENCRYPTION_KEY";

/// Environment variable name for the admin bearer token.
pub const ADMIN_TOKEN_ENV: &str = "SURVEY_ADMIN_TOKEN";

/// Environment variable name for the storage-location override.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("SURVEY_ENCRYPTION_KEY is invalid: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("SURVEY_ADMIN_TOKEN must be at least 16 characters")]
    WeakAdminToken,

    #[error("PORT is not a valid port: {0}")]
    InvalidPort(String),

    #[error("LOG_FORMAT must be 'json' or 'pretty', got '{0}'")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Fully validated startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub encryption_key: EnvelopeKey,
    pub admin_token: AdminToken,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let encryption_key = encryption_key(&get)?;

        let admin_token = get(ADMIN_TOKEN_ENV)
            .ok_or(ConfigError::Missing(ADMIN_TOKEN_ENV))
            .and_then(|token| AdminToken::new(&token).ok_or(ConfigError::WeakAdminToken))?;

        let data_dir = data_dir(&get);

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.trim().to_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other)),
        };

        Ok(Self {
            encryption_key,
            admin_token,
            data_dir,
            host,
            port,
            log_format,
        })
    }
}

/// Settings for the offline `survey-view` tool: just the key and the data
/// directory. No admin token is needed to read the file directly.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub encryption_key: EnvelopeKey,
    pub data_dir: PathBuf,
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Ok(Self {
            encryption_key: encryption_key(&get)?,
            data_dir: data_dir(&get),
        })
    }
}

fn encryption_key(get: &impl Fn(&str) -> Option<String>) -> Result<EnvelopeKey, ConfigError> {
    let hex = get(ENCRYPTION_KEY_ENV).ok_or(ConfigError::Missing(ENCRYPTION_KEY_ENV))?;
    Ok(EnvelopeKey::from_hex(&hex)?)
}

fn data_dir(get: &impl Fn(&str) -> Option<String>) -> PathBuf {
    get(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENCRYPTION_KEY_ENV, KEY_HEX),
            (ADMIN_TOKEN_ENV, "an-admin-token-of-length"),
        ]
    }

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = load(&required()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn missing_key_is_fatal() {
        let err = load(&[(ADMIN_TOKEN_ENV, "an-admin-token-of-length")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENCRYPTION_KEY_ENV)));

        let err = load(&[(ENCRYPTION_KEY_ENV, "  "), (ADMIN_TOKEN_ENV, "an-admin-token-of-length")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENCRYPTION_KEY_ENV)));
    }

    #[test]
    fn malformed_key_is_fatal() {
        let err = load(&[
            (ENCRYPTION_KEY_ENV, "not-hex"),
            (ADMIN_TOKEN_ENV, "an-admin-token-of-length"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(KeyError::InvalidHex)));

        let err = load(&[
            (ENCRYPTION_KEY_ENV, "abcd"),
            (ADMIN_TOKEN_ENV, "an-admin-token-of-length"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(KeyError::InvalidLength { .. })));
    }

    #[test]
    fn admin_token_is_required_and_must_be_long_enough() {
        let err = load(&[(ENCRYPTION_KEY_ENV, KEY_HEX)]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ADMIN_TOKEN_ENV)));

        let err = load(&[(ENCRYPTION_KEY_ENV, KEY_HEX), (ADMIN_TOKEN_ENV, "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::WeakAdminToken));
    }

    #[test]
    fn overrides_are_applied() {
        let mut vars = required();
        vars.extend([
            (DATA_DIR_ENV, "/var/lib/survey"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "8081"),
            (LOG_FORMAT_ENV, "JSON"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/survey"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_port_and_log_format_are_rejected() {
        let mut vars = required();
        vars.push((PORT_ENV, "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidPort(_))));

        let mut vars = required();
        vars.push((LOG_FORMAT_ENV, "xml"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidLogFormat(_))));
    }

    #[test]
    fn viewer_needs_only_the_key() {
        let map: HashMap<String, String> = [(ENCRYPTION_KEY_ENV, KEY_HEX), (DATA_DIR_ENV, "/srv/survey")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = ViewerConfig::from_lookup(|name| map.get(name).cloned()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/survey"));

        let err = ViewerConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENCRYPTION_KEY_ENV)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&required()).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains(KEY_HEX));
        assert!(!printed.contains("an-admin-token-of-length"));
    }
}
