//! Environment configuration.

use std::time::Duration;

use thiserror::Error;

use crate::barcode::OpenFoodFactsClient;
use crate::remote::RestRemoteStore;

pub const DEFAULT_BARCODE_API: &str = "https://world.openfoodfacts.org/api/v0";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Settings that need no store credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub barcode_api: String,
    pub http_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let barcode_api = var(&lookup, "PANTRY_BARCODE_API").unwrap_or_else(|| {
            tracing::info!("PANTRY_BARCODE_API not set; using {DEFAULT_BARCODE_API}");
            DEFAULT_BARCODE_API.to_string()
        });

        let timeout_secs = match var(&lookup, "PANTRY_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "PANTRY_HTTP_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => {
                tracing::info!(
                    "PANTRY_HTTP_TIMEOUT_SECS not set; using {DEFAULT_HTTP_TIMEOUT_SECS}s"
                );
                DEFAULT_HTTP_TIMEOUT_SECS
            }
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "PANTRY_HTTP_TIMEOUT_SECS",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            barcode_api,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }

    pub fn barcode_client(&self) -> Result<OpenFoodFactsClient, ConfigError> {
        Ok(OpenFoodFactsClient::new(self.http_client()?, &self.barcode_api))
    }
}

/// Everything an inventory session needs, store credentials included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryConfig {
    pub store_url: String,
    pub store_key: String,
    pub client: ClientConfig,
}

impl PantryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_url =
            var(&lookup, "PANTRY_STORE_URL").ok_or(ConfigError::Missing("PANTRY_STORE_URL"))?;
        let store_key =
            var(&lookup, "PANTRY_STORE_KEY").ok_or(ConfigError::Missing("PANTRY_STORE_KEY"))?;

        Ok(Self {
            store_url,
            store_key,
            client: ClientConfig::from_lookup(&lookup)?,
        })
    }

    /// A store acting as the user who owns `access_token`.
    pub fn rest_store(&self, access_token: &str) -> Result<RestRemoteStore, ConfigError> {
        Ok(RestRemoteStore::new(
            self.client.http_client()?,
            &self.store_url,
            &self.store_key,
            access_token,
        ))
    }
}

fn var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
