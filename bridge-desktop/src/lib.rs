//! # Desktop Bridges
//!
//! Bridge implementations for macOS, Windows and Linux hosts:
//!
//! - [`ReqwestHttpClient`]: network transport over `reqwest` with rustls and
//!   its own connect and request timeouts
//! - [`FileSecureStore`]: owner-only files in the platform data directory,
//!   the default credential store
//! - [`KeyringSecureStore`]: OS keychain, behind the `secure-store` feature
//!   (on by default)
//!
//! ```ignore
//! use bridge_desktop::{FileSecureStore, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let secure_store = FileSecureStore::new()?;
//! ```

mod file_store;
mod http;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use file_store::FileSecureStore;
pub use http::ReqwestHttpClient;

#[cfg(feature = "secure-store")]
pub use secure_store::{KeyringSecureStore, DEFAULT_SERVICE_NAME};
