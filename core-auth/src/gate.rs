//! # Auth Gate
//!
//! Decides whether the protected area of the app may render.
//!
//! ## State Machine
//!
//! ```text
//!               CredentialMissing
//!            ┌──────────────────────> Unauthenticated ──> route: Login
//!            │   ProfileRejected
//! Checking ──┤
//!            │   ProfileVerified
//!            └──────────────────────> Authenticated   ──> route: Protected
//! ```
//!
//! `Checking` renders only a neutral loading indicator. Both other states are
//! terminal for the lifetime of a mounted gate; mount a new gate to check
//! again.

use crate::service::AuthService;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateState {
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// No credential is stored
    CredentialMissing,
    /// The backend accepted the stored credential
    ProfileVerified,
    /// The profile check failed for any reason
    ProfileRejected,
}

/// Where the UI should go once the gate has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRoute {
    Protected,
    Login,
}

impl GateState {
    /// Pure transition function. Terminal states ignore every event.
    pub fn transition(self, event: GateEvent) -> GateState {
        match (self, event) {
            (GateState::Checking, GateEvent::ProfileVerified) => GateState::Authenticated,
            (GateState::Checking, GateEvent::CredentialMissing)
            | (GateState::Checking, GateEvent::ProfileRejected) => GateState::Unauthenticated,
            (terminal, _) => terminal,
        }
    }

    /// Navigation effect for this state; `None` while still checking.
    pub fn route(self) -> Option<GateRoute> {
        match self {
            GateState::Checking => None,
            GateState::Authenticated => Some(GateRoute::Protected),
            GateState::Unauthenticated => Some(GateRoute::Login),
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GateState::Checking
    }
}

/// One mounted instance of the gate.
///
/// `resolve` performs the check at most once; later calls return the cached
/// terminal state without touching the network.
#[derive(Debug)]
pub struct AuthGate {
    auth: AuthService,
    event_bus: EventBus,
    state: watch::Sender<GateState>,
}

impl AuthGate {
    pub fn mount(auth: AuthService, event_bus: EventBus) -> Self {
        let (state, _) = watch::channel(GateState::Checking);
        debug!("Auth gate mounted");
        Self {
            auth,
            event_bus,
            state,
        }
    }

    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    pub fn route(&self) -> Option<GateRoute> {
        self.state().route()
    }

    /// Observe the gate from the UI (initially `Checking`).
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Run the check and return the terminal state.
    ///
    /// Failures are silent: any profile error clears the credential and
    /// routes to login without a user-facing message.
    #[instrument(skip(self))]
    pub async fn resolve(&mut self) -> GateState {
        let current = self.state();
        if current.is_terminal() {
            return current;
        }

        let event = if !self.auth.is_signed_in() {
            debug!("No stored credential");
            GateEvent::CredentialMissing
        } else {
            match self.auth.fetch_profile().await {
                Ok(profile) => {
                    debug!(role = %profile.role, "Stored credential accepted");
                    GateEvent::ProfileVerified
                }
                Err(e) => {
                    debug!(error = %e, "Profile check failed");
                    // 401s were already evicted by the pipeline
                    self.auth.token_store().clear();
                    GateEvent::ProfileRejected
                }
            }
        };

        let next = current.transition(event);
        self.state.send_replace(next);

        let authenticated = next == GateState::Authenticated;
        info!(authenticated, "Auth gate resolved");
        self.event_bus
            .emit(CoreEvent::Auth(AuthEvent::GateResolved { authenticated }))
            .ok();

        next
    }
}
