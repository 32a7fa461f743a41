//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP transport and
//! secure storage) into the session core. Desktop apps typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`]; other hosts build a [`CoreConfig`] with their own
//! bridges and call [`CoreService::new`].
//!
//! Every service handed out shares one [`ApiClient`], one [`TokenStore`] and
//! one [`EventBus`], so a credential stored by a login is the one the next
//! assistant call sends, and a 401 on any call evicts it for all of them.

pub mod error;

pub use error::{CoreError, Result};

pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::events::{CoreEvent, EventBus, EventStream};

use std::sync::Arc;

use bridge_traits::{HttpClient, SecureStore};
use core_api::ApiClient;
use core_assistant::{RagService, TimetableService};
use core_auth::{
    AuthGate, AuthService, BearerTokenInterceptor, SessionCoordinator, TokenStore,
    UnauthorizedInterceptor,
};
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
}

impl CoreDependencies {
    pub fn new(http_client: Arc<dyn HttpClient>, secure_store: Arc<dyn SecureStore>) -> Self {
        Self {
            http_client,
            secure_store,
        }
    }
}

impl From<&CoreConfig> for CoreDependencies {
    fn from(config: &CoreConfig) -> Self {
        Self::new(config.http_client.clone(), config.secure_store.clone())
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    event_bus: EventBus,
    token_store: TokenStore,
    client: ApiClient,
    auth: AuthService,
    rag: RagService,
    timetable: TimetableService,
}

impl CoreService {
    /// Assemble the session core from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let deps = Arc::new(CoreDependencies::from(&config));
        let event_bus = EventBus::new(config.event_buffer_size);
        let token_store = TokenStore::new(deps.secure_store.clone());

        let client = ApiClient::from_config(&config)
            .request_interceptor(Arc::new(BearerTokenInterceptor::new(token_store.clone())))
            .response_interceptor(Arc::new(UnauthorizedInterceptor))
            .observer(Arc::new(SessionCoordinator::new(
                token_store.clone(),
                event_bus.clone(),
            )))
            .build();

        let auth = AuthService::new(client.clone(), token_store.clone(), event_bus.clone());
        let rag = RagService::new(client.clone(), event_bus.clone());
        let timetable = TimetableService::new(client.clone(), event_bus.clone());

        info!(base_url = %config.api_base_url, "Core service ready");

        Ok(Self {
            deps,
            event_bus,
            token_store,
            client,
            auth,
            rag,
            timetable,
        })
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn rag(&self) -> &RagService {
        &self.rag
    }

    pub fn timetable(&self) -> &TimetableService {
        &self.timetable
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// The shared client, for backend calls the core has no service for.
    pub fn api_client(&self) -> &ApiClient {
        &self.client
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Mount a fresh auth gate, e.g. each time the protected area is entered.
    pub fn mount_gate(&self) -> AuthGate {
        AuthGate::mount(self.auth.clone(), self.event_bus.clone())
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("base_url", &self.client.base_url())
            .field("signed_in", &self.auth.is_signed_in())
            .finish_non_exhaustive()
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Uses the reqwest transport and the file-backed secure store unless the
/// builder already carries bridges.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, CoreConfig};
///
/// let core = bootstrap_desktop(CoreConfig::builder().api_base_url("https://campus.example.edu"))?;
/// let mut gate = core.mount_gate();
/// let state = gate.resolve().await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(builder: CoreConfigBuilder) -> Result<CoreService> {
    let config = builder.build()?;
    CoreService::new(config)
}
