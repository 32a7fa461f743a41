//! Campus Mobile Core umbrella crate.
//!
//! Re-exports the [`core_service`] façade so hosts depend on a single crate.
//! Features:
//!
//! - `desktop-shims` (default): reqwest transport and file-backed secure
//!   store are used when the host supplies no bridges
//! - `assistant`: also exposes the assistant crate as [`assistant`] for
//!   hosts that use its answer types directly

#[cfg(any(feature = "desktop-shims", feature = "assistant"))]
pub use core_service::*;

#[cfg(feature = "assistant")]
pub use core_assistant as assistant;
