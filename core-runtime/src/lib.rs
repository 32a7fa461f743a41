//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the Campus Mobile Core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the session, API and
//! assistant crates depend on. It establishes the logging conventions,
//! redaction rules and event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{AssistantEvent, AssistantKind, AuthEvent, CoreEvent, EventBus, EventStream};
