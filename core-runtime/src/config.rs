//! # Core Configuration Module
//!
//! Provides configuration management for the Campus Mobile Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the bridges and settings the session core needs. It
//! enforces fail-fast validation so a misconfigured host finds out at startup,
//! not on the first login attempt.
//!
//! ## Required Settings
//!
//! - `api_base_url` - Backend address every request path is joined onto
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - Network transport (desktop default: reqwest)
//! - `SecureStore` - Credential persistence (desktop default: owner-only file store)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://campus.example.edu")
//!     .http_client(Arc::new(MyHttpClient))
//!     .secure_store(Arc::new(MySecureStore))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, SecureStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Environment variable read by [`CoreConfigBuilder::from_env`]
pub const API_BASE_URL_ENV: &str = "CAMPUS_API_BASE_URL";

/// Content type sent with every request
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Core configuration for the Campus Mobile Core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend base address, without trailing slash
    pub api_base_url: String,

    /// Network transport
    pub http_client: Arc<dyn HttpClient>,

    /// Durable credential storage
    pub secure_store: Arc<dyn SecureStore>,

    /// Headers attached to every outbound request before interceptors run
    pub default_headers: BTreeMap<String, String>,

    /// Capacity of the core event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("default_headers", &self.default_headers)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL parses and uses `http` or `https`
    /// - The base URL carries no query or fragment
    /// - The event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.api_base_url)?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(
            "API base URL must not contain a query string or fragment".to_string(),
        ));
    }

    Ok(())
}

/// Inserts a header, replacing any existing entry whose name differs only in
/// case.
pub fn merge_header(headers: &mut BTreeMap<String, String>, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
        ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
    ])
}

#[cfg(not(feature = "desktop-shims"))]
fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for credential persistence. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default FileSecureStore. \
                 Mobile: inject platform-native secure storage (Keychain/Keystore)."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: ensure the 'desktop-shims' feature is enabled. \
                 Mobile: inject platform-native adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::FileSecureStore;

    let store = FileSecureStore::new().map_err(|e| Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: format!("Default FileSecureStore unavailable: {}", e),
    })?;
    let store: Arc<dyn SecureStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: format!("Default ReqwestHttpClient unavailable: {}", e),
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    extra_headers: BTreeMap<String, String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Starts a builder with the base URL taken from `CAMPUS_API_BASE_URL`.
    ///
    /// A missing variable is not an error here; `build()` reports it.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            builder.api_base_url = Some(url);
        }
        builder
    }

    /// Sets the backend base address (e.g. `https://campus.example.edu`).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the network transport.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the durable credential storage.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Adds or overrides a default header.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        merge_header(&mut self.extra_headers, name.into(), value.into());
        self
    }

    /// Sets the event bus capacity.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when the base URL is missing or invalid
    /// - `Error::CapabilityMissing` when a bridge is missing and no platform
    ///   default is available
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self.api_base_url.ok_or_else(|| {
            Error::Config(format!(
                "API base URL is required. Use .api_base_url() or set {}.",
                API_BASE_URL_ENV
            ))
        })?;
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let mut headers = default_headers();
        for (name, value) in self.extra_headers {
            merge_header(&mut headers, name, value);
        }

        let config = CoreConfig {
            api_base_url,
            http_client,
            secure_store,
            default_headers: headers,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
