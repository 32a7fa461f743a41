//! Login, registration, profile lookup and logout.
//!
//! Every network call goes through the shared [`ApiClient`], so the bearer
//! credential is attached and 401 responses evict it before any of these
//! methods return.

use crate::envelope::{decode_data, extract_error_message, TokenPayload};
use crate::error::{
    AuthError, Result, LOGIN_FALLBACK_MESSAGE, LOGIN_VALIDATION_MESSAGE, PROFILE_FALLBACK_MESSAGE,
    REGISTER_FALLBACK_MESSAGE, REGISTER_VALIDATION_MESSAGE,
};
use crate::token_store::TokenStore;
use crate::types::{Credential, Profile, Role};
use core_api::{endpoints, ApiClient, ApiResponse};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

/// Session operations exposed to the UI.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    token_store: TokenStore,
    event_bus: EventBus,
}

impl AuthService {
    pub fn new(client: ApiClient, token_store: TokenStore, event_bus: EventBus) -> Self {
        Self {
            client,
            token_store,
            event_bus,
        }
    }

    /// Exchange email and password for a credential and store it.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank email or empty password (no request is sent)
    /// - `NetworkFailure`, `Unauthorized`, `Rejected` with a display message
    ///   taken from the response, or [`LOGIN_FALLBACK_MESSAGE`]
    /// - `MalformedResponse` when the success body has no `data.access_token`
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential> {
        let email = validated_email(email, password, LOGIN_VALIDATION_MESSAGE)?;

        self.emit(AuthEvent::SigningIn);
        let result = self
            .client
            .post(endpoints::AUTH_LOGIN, &LoginRequest { email, password })
            .await;

        let credential = self.accept_credential(result, LOGIN_FALLBACK_MESSAGE)?;
        info!("Login succeeded");
        self.emit(AuthEvent::SignedIn);
        Ok(credential)
    }

    /// Create an account and store the credential it returns.
    ///
    /// The mobile client registers with [`Role::Student`]; the role is still
    /// supplied by the caller.
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email), role = %role))]
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<Credential> {
        let email = validated_email(email, password, REGISTER_VALIDATION_MESSAGE)?;

        self.emit(AuthEvent::SigningIn);
        let result = self
            .client
            .post(
                endpoints::AUTH_REGISTER,
                &RegisterRequest {
                    email,
                    password,
                    role,
                },
            )
            .await;

        let credential = self.accept_credential(result, REGISTER_FALLBACK_MESSAGE)?;
        info!("Registration succeeded");
        self.emit(AuthEvent::Registered);
        Ok(credential)
    }

    /// Fetch the signed-in user's profile.
    ///
    /// Does not touch the store on success. On a 401 the credential has
    /// already been evicted by the time this returns.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<Profile> {
        let response = self.client.get(endpoints::AUTH_ME).await.map_err(|e| {
            let message = extract_error_message(e.body(), PROFILE_FALLBACK_MESSAGE);
            debug!(error = %e, "Profile request failed");
            AuthError::from_api(&e, message)
        })?;

        decode_data::<Profile>(&response.body).map_err(|reason| {
            warn!(reason = %reason, "Profile response is malformed");
            AuthError::MalformedResponse(PROFILE_FALLBACK_MESSAGE.to_string())
        })
    }

    /// Forget the credential. No network call; safe to repeat.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.token_store.clear();
        info!("Logged out");
        self.emit(AuthEvent::SignedOut);
    }

    /// Whether a credential is currently stored. No network call.
    pub fn is_signed_in(&self) -> bool {
        self.token_store.has_credential()
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Turn a login/register outcome into a stored credential.
    fn accept_credential(
        &self,
        result: core_api::Result<ApiResponse>,
        fallback: &str,
    ) -> Result<Credential> {
        let outcome = match result {
            Ok(response) => extract_credential(&response).map_err(|reason| {
                warn!(reason = %reason, "Credential missing from response");
                AuthError::MalformedResponse(fallback.to_string())
            }),
            Err(e) => {
                let message = extract_error_message(e.body(), fallback);
                warn!(error = %e, "Authentication request failed");
                Err(AuthError::from_api(&e, message))
            }
        };

        match outcome {
            Ok(credential) => {
                self.token_store.set(credential.clone());
                Ok(credential)
            }
            Err(error) => {
                self.emit(AuthEvent::AuthFailed {
                    message: error.user_message().to_string(),
                });
                Err(error)
            }
        }
    }

    fn emit(&self, event: AuthEvent) {
        self.event_bus.emit(CoreEvent::Auth(event)).ok();
    }
}

fn validated_email<'a>(email: &'a str, password: &str, message: &str) -> Result<&'a str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(message.to_string()));
    }
    Ok(email)
}

fn extract_credential(response: &ApiResponse) -> std::result::Result<Credential, String> {
    let payload: TokenPayload = decode_data(&response.body)?;
    payload
        .access_token
        .and_then(Credential::new)
        .ok_or_else(|| "data.access_token is missing or empty".to_string())
}
