//! # Assistant Services
//!
//! Question answering over course documents ([`RagService`]) and the
//! student's timetable ([`TimetableService`]).
//!
//! Both services are thin callers of the shared
//! [`ApiClient`](core_api::ApiClient). They rely on the pipeline installed by
//! `core-auth` for the bearer header and for evicting a rejected credential.

pub mod error;
pub mod rag;
pub mod timetable;
pub mod types;

pub use error::{AssistantError, Result, ASSISTANT_FALLBACK_MESSAGE, QUESTION_VALIDATION_MESSAGE};
pub use rag::RagService;
pub use timetable::TimetableService;
pub use types::{RagAnswer, Schedule, TimetableAnswer};
