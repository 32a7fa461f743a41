//! OS keychain backend for [`SecureStore`].
//!
//! macOS Keychain, Windows Credential Manager or the Secret Service on Linux,
//! through the `keyring` crate. Every key becomes one keychain entry under a
//! shared service name. Values are base64-encoded since keychains only hold
//! strings.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, warn};

/// Service name entries are filed under unless overridden
pub const DEFAULT_SERVICE_NAME: &str = "campus-mobile-core";

#[derive(Debug, Clone)]
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE_NAME)
    }

    /// Separate service name, e.g. one per backend environment.
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        if key.is_empty() {
            return Err(BridgeError::OperationFailed(
                "secure store key must not be empty".to_string(),
            ));
        }
        Entry::new(&self.service_name, key).map_err(keyring_error)
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn keyring_error(e: keyring::Error) -> BridgeError {
    BridgeError::OperationFailed(format!("Keyring error: {}", e))
}

impl SecureStore for KeyringSecureStore {
    fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entry(key)?
            .set_password(&STANDARD.encode(value))
            .map_err(keyring_error)?;
        debug!(key, "Secret written to keychain");
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let encoded = match self.entry(key)?.get_password() {
            Ok(encoded) => encoded,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(keyring_error(e)),
        };

        STANDARD.decode(encoded).map(Some).map_err(|e| {
            warn!(key, error = %e, "Keychain entry is not valid base64");
            BridgeError::OperationFailed(format!("Corrupt keychain entry: {}", e))
        })
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}
