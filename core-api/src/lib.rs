//! # Core API
//!
//! The HTTP facility every backend call goes through.
//!
//! [`ApiClient`] wraps a platform [`HttpClient`](bridge_traits::HttpClient),
//! joins request paths onto the configured base address, attaches default
//! headers and runs the interceptor pipeline described in [`interceptor`].
//! It carries no session policy of its own; credential handling is plugged in
//! by `core-auth`.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod interceptor;

pub use client::{ApiClient, ApiClientBuilder, ApiResponse};
pub use error::{ApiError, Result};
pub use interceptor::{
    PipelineObserver, PipelineSignal, RequestContext, RequestInterceptor, ResponseInterceptor,
    ResponseOutcome,
};
