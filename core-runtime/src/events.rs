//! # Event Bus System
//!
//! Provides an event-driven architecture for the Campus Mobile Core using `tokio::sync::broadcast`.
//! Session changes (sign-in, eviction, gate resolution) and assistant calls are
//! published here so the host UI can react without polling.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for each domain
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ AuthService      ├──────────>│           │
//! └──────────────────┘           │           │   subscribe   ┌────────────┐
//! ┌──────────────────┐   emit    │ EventBus  ├──────────────>│ Host UI    │
//! │ SessionCoordinator├─────────>│ (broadcast│               └────────────┘
//! └──────────────────┘           │  channel) │
//! ┌──────────────────┐   emit    │           │   subscribe   ┌────────────┐
//! │ Assistant        ├──────────>│           ├──────────────>│ Telemetry  │
//! └──────────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::SignedOut))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "User signed out");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - `emit` returns an error only when nobody is subscribed; publishers in
//!   this workspace ignore it with `.ok()`
//! - Slow subscribers receive `RecvError::Lagged(n)` and continue from the
//!   oldest retained event

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session and credential events
    Auth(AuthEvent),
    /// Question-answering and timetable calls
    Assistant(AssistantEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Assistant(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthFailed { .. }) => EventSeverity::Error,
            CoreEvent::Assistant(AssistantEvent::RequestFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::CredentialEvicted { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn) | CoreEvent::Auth(AuthEvent::Registered) => {
                EventSeverity::Info
            }
            CoreEvent::Auth(AuthEvent::SignedOut) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events related to the session credential and the auth gate.
///
/// Payloads never carry the credential or the user's email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A login or registration request is in flight.
    SigningIn,
    /// Login succeeded and a credential was stored.
    SignedIn,
    /// Registration succeeded and a credential was stored.
    Registered,
    /// The user logged out; the credential was cleared.
    SignedOut,
    /// The backend rejected the credential and it was erased.
    CredentialEvicted {
        /// HTTP status that triggered the eviction.
        status: u16,
        /// Request path that was rejected.
        path: String,
    },
    /// Login or registration failed.
    AuthFailed {
        /// Display message shown to the user.
        message: String,
    },
    /// An auth gate finished its check.
    GateResolved {
        /// Whether the protected area may render.
        authenticated: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn => "Authentication in progress",
            AuthEvent::SignedIn => "User signed in successfully",
            AuthEvent::Registered => "User registered successfully",
            AuthEvent::SignedOut => "User signed out",
            AuthEvent::CredentialEvicted { .. } => "Session credential evicted",
            AuthEvent::AuthFailed { .. } => "Authentication error",
            AuthEvent::GateResolved { .. } => "Auth gate resolved",
        }
    }
}

// ============================================================================
// Assistant Events
// ============================================================================

/// Backend feature an assistant event refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssistantKind {
    /// Retrieval-augmented question answering
    Rag,
    /// Timetable questions and schedule listing
    Timetable,
}

/// Events related to assistant requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AssistantEvent {
    /// A request was sent.
    RequestStarted {
        /// Which backend feature was called.
        kind: AssistantKind,
    },
    /// A response was received and decoded.
    ResponseReceived {
        /// Which backend feature answered.
        kind: AssistantKind,
    },
    /// The request failed.
    RequestFailed {
        /// Which backend feature was called.
        kind: AssistantKind,
        /// Display message shown to the user.
        message: String,
    },
}

impl AssistantEvent {
    fn description(&self) -> &str {
        match self {
            AssistantEvent::RequestStarted { .. } => "Assistant request started",
            AssistantEvent::ResponseReceived { .. } => "Assistant response received",
            AssistantEvent::RequestFailed { .. } => "Assistant request failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel shared by every publisher in the core.
///
/// Clones share one channel. Each subscriber buffers up to `capacity` events
/// and sees `RecvError::Lagged` once it falls further behind.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of subscribers reached, or the event back when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let auth_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Auth(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` after falling `n` events behind,
    /// `RecvError::Closed` once every bus handle is dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// matching is buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        use broadcast::error::TryRecvError;

        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            };
            if self.accepts(&event) {
                return Some(Ok(event));
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);

        assert!(bus.emit(CoreEvent::Auth(AuthEvent::SignedOut)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Auth(AuthEvent::CredentialEvicted {
            status: 401,
            path: "/api/v1/auth/me".to_string(),
        });

        assert_eq!(bus.emit(event.clone()).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Auth(_)));

        bus.emit(CoreEvent::Assistant(AssistantEvent::RequestStarted {
            kind: AssistantKind::Rag,
        }))
        .ok();
        let auth_event = CoreEvent::Auth(AuthEvent::GateResolved {
            authenticated: true,
        });
        bus.emit(auth_event.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), auth_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(CoreEvent::Auth(AuthEvent::SigningIn)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Auth(AuthEvent::AuthFailed {
            message: "Invalid email or password".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let evicted = CoreEvent::Auth(AuthEvent::CredentialEvicted {
            status: 401,
            path: "/x".to_string(),
        });
        assert_eq!(evicted.severity(), EventSeverity::Warning);

        assert_eq!(
            CoreEvent::Auth(AuthEvent::SignedIn).severity(),
            EventSeverity::Info
        );
        assert_eq!(
            CoreEvent::Assistant(AssistantEvent::ResponseReceived {
                kind: AssistantKind::Timetable
            })
            .severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_description() {
        assert_eq!(
            CoreEvent::Auth(AuthEvent::SignedIn).description(),
            "User signed in successfully"
        );
        assert_eq!(
            CoreEvent::Assistant(AssistantEvent::RequestFailed {
                kind: AssistantKind::Rag,
                message: "x".to_string()
            })
            .description(),
            "Assistant request failed"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Auth(AuthEvent::GateResolved {
            authenticated: false,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Auth");
        assert_eq!(json["payload"]["event"], "GateResolved");
        assert_eq!(json["payload"]["authenticated"], false);

        let deserialized: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        bus.emit(CoreEvent::Auth(AuthEvent::Registered)).ok();

        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received, CoreEvent::Auth(AuthEvent::Registered));
    }
}
