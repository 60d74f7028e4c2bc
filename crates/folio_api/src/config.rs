//! Environment-driven server configuration.
//!
//! # Invariants
//! - Every setting except the token secret has a default.
//! - Invalid values surface as `ConfigError`; loading never panics.

use std::{
    env,
    fmt::{self, Debug, Display, Formatter},
    path::PathBuf,
    str::FromStr,
};

use axum::http::HeaderValue;
use folio_core::{default_log_level, DEFAULT_BCRYPT_COST, MAX_TOKEN_TTL_DAYS};
use log::{info, warn};
use thiserror::Error;

pub const DEFAULT_PORT: &str = "5001";
pub const DEFAULT_DB_PATH: &str = "folio.sqlite3";
pub const DEFAULT_TOKEN_TTL_DAYS: &str = "7";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: &str = "10485760";

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;
/// 1 GiB.
pub const MAX_UPLOAD_BYTES_LIMIT: usize = 1024 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub cors_origin: HeaderValue,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("FOLIO_JWT_SECRET")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("FOLIO_JWT_SECRET"))?;

        let bcrypt_cost: u32 = try_load(
            &lookup,
            "FOLIO_BCRYPT_COST",
            &DEFAULT_BCRYPT_COST.to_string(),
        )?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "FOLIO_BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: format!("must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"),
            });
        }

        let token_ttl_days: i64 = try_load(&lookup, "FOLIO_TOKEN_TTL_DAYS", DEFAULT_TOKEN_TTL_DAYS)?;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            return Err(ConfigError::Invalid {
                key: "FOLIO_TOKEN_TTL_DAYS",
                value: token_ttl_days.to_string(),
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_DAYS}"),
            });
        }

        let max_upload_bytes: usize =
            try_load(&lookup, "FOLIO_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if !(1..=MAX_UPLOAD_BYTES_LIMIT).contains(&max_upload_bytes) {
            return Err(ConfigError::Invalid {
                key: "FOLIO_MAX_UPLOAD_BYTES",
                value: max_upload_bytes.to_string(),
                reason: format!("must be between 1 and {MAX_UPLOAD_BYTES_LIMIT}"),
            });
        }

        // Credentialed CORS cannot use the wildcard origin.
        let origin: String = try_load(&lookup, "FOLIO_CORS_ORIGIN", DEFAULT_CORS_ORIGIN)?;
        if origin.trim() == "*" {
            return Err(ConfigError::Invalid {
                key: "FOLIO_CORS_ORIGIN",
                value: origin,
                reason: "must name a single origin; `*` cannot be combined with credentials"
                    .to_string(),
            });
        }
        let origin = origin.trim().to_string();
        let cors_origin =
            HeaderValue::from_str(&origin).map_err(|err| ConfigError::Invalid {
                key: "FOLIO_CORS_ORIGIN",
                value: origin.clone(),
                reason: err.to_string(),
            })?;

        let log_dir = lookup("FOLIO_LOG_DIR")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            port: try_load(&lookup, "FOLIO_PORT", DEFAULT_PORT)?,
            db_path: try_load(&lookup, "FOLIO_DB_PATH", DEFAULT_DB_PATH)?,
            jwt_secret,
            token_ttl_days,
            bcrypt_cost,
            cors_origin,
            upload_dir: try_load(&lookup, "FOLIO_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)?,
            max_upload_bytes,
            log_level: try_load(&lookup, "FOLIO_LOG_LEVEL", default_log_level())?,
            log_dir,
        })
    }

    /// Logs the effective settings, secrets excluded.
    pub fn log_summary(&self) {
        info!(
            "event=config_loaded module=config status=ok port={} db_path={} upload_dir={} max_upload_bytes={} token_ttl_days={} bcrypt_cost={}",
            self.port,
            self.db_path.display(),
            self.upload_dir.display(),
            self.max_upload_bytes,
            self.token_ttl_days,
            self.bcrypt_cost
        );
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_origin", &self.cors_origin)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|err: T::Err| {
        warn!("Invalid {key} value: {err}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }
    })
}
