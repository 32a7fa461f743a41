//! Session Credential Storage
//!
//! Holds the single session credential in a platform secure store
//! (Keychain, Keystore, file store, ...).
//!
//! ## Guarantees
//!
//! - At most one credential exists at any time
//! - Calls are synchronous so interceptors can use them inline
//! - Nothing here ever fails: backend errors are logged and downgraded
//!   (`get` reports absent, `set`/`clear` become no-ops)
//! - The credential value is never logged
//!
//! ## Example
//!
//! ```
//! use bridge_traits::MemorySecureStore;
//! use core_auth::{Credential, TokenStore};
//! use std::sync::Arc;
//!
//! let store = TokenStore::new(Arc::new(MemorySecureStore::new()));
//! assert!(store.get().is_none());
//!
//! store.set(Credential::new("T1").unwrap());
//! assert_eq!(store.get().unwrap().as_str(), "T1");
//!
//! store.clear();
//! store.clear();
//! assert!(!store.has_credential());
//! ```

use crate::types::Credential;
use bridge_traits::storage::SecureStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Secure-store slot holding the credential
pub const CREDENTIAL_KEY: &str = "session_credential";

/// Durable holder of the session credential.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("key", &CREDENTIAL_KEY)
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing TokenStore");
        Self { secure_store }
    }

    /// Current credential, if any.
    ///
    /// A stored value that is not valid UTF-8 or is blank is erased and
    /// reported as absent.
    pub fn get(&self) -> Option<Credential> {
        let data = match self.secure_store.get_secret(CREDENTIAL_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read credential from secure storage");
                return None;
            }
        };

        let credential = String::from_utf8(data).ok().and_then(Credential::new);
        if credential.is_none() {
            warn!("Stored credential is unusable, erasing it");
            self.clear();
        }
        credential
    }

    /// Replace the stored credential. Last write wins.
    pub fn set(&self, credential: Credential) {
        match self
            .secure_store
            .set_secret(CREDENTIAL_KEY, credential.as_str().as_bytes())
        {
            Ok(()) => info!("Credential stored"),
            Err(e) => warn!(error = %e, "Failed to store credential in secure storage"),
        }
    }

    /// Erase the credential. Idempotent.
    pub fn clear(&self) {
        match self.secure_store.delete_secret(CREDENTIAL_KEY) {
            Ok(()) => info!("Credential cleared"),
            Err(e) => warn!(error = %e, "Failed to clear credential from secure storage"),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.get().is_some()
    }
}
