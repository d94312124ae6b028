//! Environment configuration
//!
//! Every command reads the same set of variables once at startup. A `.env`
//! file in the working directory is honoured when present.

use crate::logging::parse_level;
use crate::{Error, Result};
use std::fmt;
use tracing::level_filters::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "LOGLEVEL";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const ENV_CONTAINER_NAME: &str = "AZBLOB_CONTAINER_NAME";
pub const ENV_BLOB_NAME: &str = "AZBLOB_BLOB_NAME";

#[derive(Clone)]
pub struct Config {
    pub log_level: LevelFilter,

    // Consumed by the credential chain straight from the environment; kept
    // here so the required variables are listed in one place.
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    pub account_name: String,
    pub container_name: String,
    pub blob_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv(dotenvy::dotenv())?;

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let log_level = match optional(ENV_LOG_LEVEL) {
            Some(raw) => parse_level(&raw)?,
            None => LevelFilter::INFO,
        };

        Ok(Self {
            log_level,
            tenant_id: optional(ENV_TENANT_ID),
            client_id: optional(ENV_CLIENT_ID),
            client_secret: optional(ENV_CLIENT_SECRET),
            account_name: required(ENV_ACCOUNT_NAME)?,
            container_name: required(ENV_CONTAINER_NAME)?,
            blob_name: required(ENV_BLOB_NAME)?,
        })
    }
}

/// A missing `.env` file is fine; an unreadable or malformed one is not.
fn load_dotenv<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_level", &self.log_level)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("account_name", &self.account_name)
            .field("container_name", &self.container_name)
            .field("blob_name", &self.blob_name)
            .finish()
    }
}
