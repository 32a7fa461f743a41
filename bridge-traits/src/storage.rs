//! Secure Storage Abstraction
//!
//! Durable slot-based storage for secrets such as session credentials.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{BridgeError, Result};

/// Secure credential storage trait
///
/// Abstracts secure storage mechanisms:
/// - macOS/iOS: Keychain
/// - Android: Keystore
/// - Windows: Credential Manager
/// - Linux: Secret Service / libsecret
/// - Fallback: a permission-restricted file in the app data directory
///
/// Operations are synchronous: platform keychains expose blocking APIs and
/// callers (request interceptors) need the value inline, without awaiting.
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Persist values across process restarts (except explicit in-memory stores)
/// - Never log or expose secret values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// fn store_token(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("session_credential", token.as_bytes())
/// }
/// ```
pub trait SecureStore: Send + Sync {
    /// Store a secret value, replacing any previous value under `key`
    fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret
    ///
    /// Deleting a missing key succeeds.
    fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without returning it
    fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key)?.is_some())
    }
}

/// Process-local secure store
///
/// Values live only as long as the process. Suitable for tests and for hosts
/// that deliberately keep sessions ephemeral.
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.secrets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecureStore for MemorySecureStore {
    fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(BridgeError::OperationFailed(
                "Secret key must not be empty".to_string(),
            ));
        }
        self.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().get(key).cloned())
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.lock().contains_key(key))
    }
}
