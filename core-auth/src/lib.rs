//! # Authentication Module
//!
//! The authenticated session subsystem of the Campus Mobile Core.
//!
//! ## Overview
//!
//! - [`TokenStore`] keeps the single session credential in a platform
//!   secure store and never fails
//! - [`BearerTokenInterceptor`] and [`UnauthorizedInterceptor`] plug the
//!   credential into the shared [`ApiClient`](core_api::ApiClient)
//! - [`SessionCoordinator`] evicts the credential when the backend rejects it
//! - [`AuthService`] performs login, registration, profile lookup and logout
//! - [`AuthGate`] decides whether the protected area may render
//!
//! ## Wiring
//!
//! ```ignore
//! let store = TokenStore::new(secure_store);
//! let client = ApiClient::builder(transport, base_url)
//!     .request_interceptor(Arc::new(BearerTokenInterceptor::new(store.clone())))
//!     .response_interceptor(Arc::new(UnauthorizedInterceptor))
//!     .observer(Arc::new(SessionCoordinator::new(store.clone(), bus.clone())))
//!     .build();
//! let auth = AuthService::new(client, store, bus.clone());
//! let mut gate = AuthGate::mount(auth.clone(), bus);
//! ```

pub mod coordinator;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod interceptors;
pub mod service;
pub mod token_store;
pub mod types;

pub use coordinator::SessionCoordinator;
pub use error::{
    AuthError, Result, LOGIN_FALLBACK_MESSAGE, LOGIN_VALIDATION_MESSAGE, PROFILE_FALLBACK_MESSAGE,
    REGISTER_FALLBACK_MESSAGE, REGISTER_VALIDATION_MESSAGE,
};
pub use gate::{AuthGate, GateEvent, GateRoute, GateState};
pub use interceptors::{BearerTokenInterceptor, UnauthorizedInterceptor};
pub use service::AuthService;
pub use token_store::TokenStore;
pub use types::{Credential, Profile, Role};
