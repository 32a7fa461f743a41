//! Session-side reaction to pipeline signals.

use crate::token_store::TokenStore;
use core_api::{PipelineObserver, PipelineSignal};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tracing::info;

/// Evicts the credential when the backend rejects it.
///
/// Registered as a [`PipelineObserver`] on the shared client. This is the
/// only place the store is mutated in response to a network outcome.
#[derive(Debug, Clone)]
pub struct SessionCoordinator {
    token_store: TokenStore,
    event_bus: EventBus,
}

impl SessionCoordinator {
    pub fn new(token_store: TokenStore, event_bus: EventBus) -> Self {
        Self {
            token_store,
            event_bus,
        }
    }
}

impl PipelineObserver for SessionCoordinator {
    fn on_signal(&self, signal: &PipelineSignal) {
        match signal {
            PipelineSignal::Unauthorized { status, path } => {
                self.token_store.clear();
                info!(status, path = %path, "Session credential evicted");

                self.event_bus
                    .emit(CoreEvent::Auth(AuthEvent::CredentialEvicted {
                        status: *status,
                        path: path.clone(),
                    }))
                    .ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credential;
    use bridge_traits::MemorySecureStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unauthorized_signal_clears_store_and_emits_event() {
        let store = TokenStore::new(Arc::new(MemorySecureStore::new()));
        store.set(Credential::new("T1").unwrap());
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();

        let coordinator = SessionCoordinator::new(store.clone(), bus);
        coordinator.on_signal(&PipelineSignal::Unauthorized {
            status: 401,
            path: "/api/v1/rag/query".to_string(),
        });

        assert!(!store.has_credential());
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::CredentialEvicted {
                status: 401,
                path: "/api/v1/rag/query".to_string()
            })
        );
    }

    #[test]
    fn test_eviction_without_credential_or_subscribers() {
        let store = TokenStore::new(Arc::new(MemorySecureStore::new()));
        let coordinator = SessionCoordinator::new(store.clone(), EventBus::new(8));

        coordinator.on_signal(&PipelineSignal::Unauthorized {
            status: 401,
            path: "/x".to_string(),
        });

        assert!(!store.has_credential());
    }
}
