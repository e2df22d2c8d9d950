//! Process-wide API configuration.
//!
//! # Responsibility
//! - Validate and hold the endpoints, region, and auth material for the
//!   managed GraphQL API.
//! - Install the configuration exactly once per process.
//!
//! # Invariants
//! - Installing the same configuration again is idempotent.
//! - Installing a different configuration is rejected; nothing re-reads the
//!   environment after install.
//! - The realtime endpoint is derived from the API endpoint when not given.

use crate::remote::{RemoteError, RemoteResult};
use std::sync::OnceLock;

const ENDPOINT_VAR: &str = "DARKLIST_API_ENDPOINT";
const REALTIME_ENDPOINT_VAR: &str = "DARKLIST_REALTIME_ENDPOINT";
const REGION_VAR: &str = "DARKLIST_API_REGION";
const API_KEY_VAR: &str = "DARKLIST_API_KEY";

static API_CONFIG: OnceLock<ApiConfig> = OnceLock::new();

/// Authentication mode for the managed API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuth {
    /// Static key sent as the `x-api-key` header on every request and in the
    /// WebSocket connection params.
    ApiKey(String),
}

/// Validated endpoints and auth material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// HTTP endpoint receiving query/mutation POSTs.
    pub endpoint: String,
    /// WebSocket endpoint serving the creation feed.
    pub realtime_endpoint: String,
    /// Hosting region label, diagnostic only.
    pub region: String,
    pub auth: ApiAuth,
}

impl ApiConfig {
    /// Validates raw configuration values.
    ///
    /// `realtime_endpoint` may be omitted; it is then derived from `endpoint`
    /// by swapping the scheme to WebSocket and the API host segment to its
    /// realtime counterpart.
    pub fn new(
        endpoint: impl Into<String>,
        realtime_endpoint: Option<String>,
        region: impl Into<String>,
        api_key: impl Into<String>,
    ) -> RemoteResult<Self> {
        let endpoint = endpoint.into().trim().to_string();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(RemoteError::Config("endpoint must be an http(s) URL"));
        }
        let region = region.into().trim().to_string();
        if region.is_empty() {
            return Err(RemoteError::Config("region must not be empty"));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RemoteError::Config("api key must not be empty"));
        }
        let realtime_endpoint = match realtime_endpoint {
            Some(raw) => {
                let trimmed = raw.trim().to_string();
                if !(trimmed.starts_with("wss://") || trimmed.starts_with("ws://")) {
                    return Err(RemoteError::Config("realtime endpoint must be a ws(s) URL"));
                }
                trimmed
            }
            None => default_realtime_endpoint(&endpoint),
        };
        Ok(Self {
            endpoint,
            realtime_endpoint,
            region,
            auth: ApiAuth::ApiKey(api_key),
        })
    }

    /// Reads configuration from `DARKLIST_API_ENDPOINT`,
    /// `DARKLIST_REALTIME_ENDPOINT` (optional), `DARKLIST_API_REGION`, and
    /// `DARKLIST_API_KEY`. Blank values count as unset.
    pub fn from_env() -> RemoteResult<Self> {
        let endpoint =
            env_value(ENDPOINT_VAR).ok_or(RemoteError::Config("DARKLIST_API_ENDPOINT is not set"))?;
        let region =
            env_value(REGION_VAR).ok_or(RemoteError::Config("DARKLIST_API_REGION is not set"))?;
        let api_key =
            env_value(API_KEY_VAR).ok_or(RemoteError::Config("DARKLIST_API_KEY is not set"))?;
        Self::new(endpoint, env_value(REALTIME_ENDPOINT_VAR), region, api_key)
    }

    pub fn api_key(&self) -> &str {
        match &self.auth {
            ApiAuth::ApiKey(key) => key,
        }
    }
}

/// Derives the WebSocket endpoint from the HTTP endpoint.
///
/// Managed GraphQL hosts publish the realtime service on a sibling host; the
/// conventional mapping swaps `http(s)` for `ws(s)` and the `appsync-api`
/// host segment for `appsync-realtime-api`.
fn default_realtime_endpoint(endpoint: &str) -> String {
    let swapped = if let Some(rest) = endpoint.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        endpoint.to_string()
    };
    swapped.replacen("appsync-api", "appsync-realtime-api", 1)
}

fn env_value(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Installs the process-wide configuration.
///
/// Idempotent for an equal configuration; a different configuration is
/// rejected so remote calls never observe a config change mid-process.
pub fn install(config: ApiConfig) -> RemoteResult<()> {
    let active = API_CONFIG.get_or_init(|| config.clone());
    if active == &config {
        Ok(())
    } else {
        Err(RemoteError::Config(
            "remote api already configured differently; refusing to switch",
        ))
    }
}

/// Active configuration, if one was installed.
pub fn installed() -> Option<&'static ApiConfig> {
    API_CONFIG.get()
}
