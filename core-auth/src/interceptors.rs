//! Pipeline stages that tie the HTTP client to the session credential.

use crate::token_store::TokenStore;
use core_api::{PipelineSignal, RequestContext, RequestInterceptor, ResponseInterceptor, ResponseOutcome};
use tracing::{debug, warn};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Attaches `Authorization: Bearer <credential>` when a credential exists.
///
/// Without a credential the request goes out untouched.
#[derive(Debug, Clone)]
pub struct BearerTokenInterceptor {
    token_store: TokenStore,
}

impl BearerTokenInterceptor {
    pub fn new(token_store: TokenStore) -> Self {
        Self { token_store }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn intercept(&self, request: &mut RequestContext) {
        if let Some(credential) = self.token_store.get() {
            request.set_header(AUTHORIZATION_HEADER, credential.authorization_header());
        } else {
            debug!(path = request.path(), "No credential, sending anonymously");
        }
    }
}

/// Raises [`PipelineSignal::Unauthorized`] for 401 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnauthorizedInterceptor;

impl ResponseInterceptor for UnauthorizedInterceptor {
    fn inspect(&self, outcome: &ResponseOutcome<'_>) -> Option<PipelineSignal> {
        if !matches!(outcome.result, Err(error) if error.is_unauthorized()) {
            return None;
        }

        warn!(method = %outcome.method, path = outcome.path, "Credential rejected by backend");
        Some(PipelineSignal::Unauthorized {
            status: 401,
            path: outcome.path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credential;
    use bridge_traits::{HttpMethod, MemorySecureStore};
    use core_api::{ApiError, ApiResponse};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn outcome_for(result: &Result<ApiResponse, ApiError>) -> ResponseOutcome<'_> {
        ResponseOutcome {
            method: HttpMethod::Get,
            path: "/api/v1/auth/me",
            result,
        }
    }

    fn status(status: u16) -> Result<ApiResponse, ApiError> {
        Err(ApiError::Status { status, body: None })
    }

    #[test]
    fn test_unauthorized_interceptor_flags_only_401() {
        let interceptor = UnauthorizedInterceptor;

        assert_eq!(
            interceptor.inspect(&outcome_for(&status(401))),
            Some(PipelineSignal::Unauthorized {
                status: 401,
                path: "/api/v1/auth/me".to_string()
            })
        );

        for code in [400, 403, 404, 422, 500] {
            assert_eq!(interceptor.inspect(&outcome_for(&status(code))), None);
        }

        let ok = Ok(ApiResponse {
            status: 200,
            body: serde_json::Value::Null,
        });
        assert_eq!(interceptor.inspect(&outcome_for(&ok)), None);

        let network = Err(ApiError::Network {
            message: "offline".to_string(),
        });
        assert_eq!(interceptor.inspect(&outcome_for(&network)), None);
    }

    fn request() -> RequestContext {
        let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        RequestContext::new(HttpMethod::Get, "/api/v1/auth/me", None, headers)
    }

    #[test]
    fn test_bearer_interceptor_attaches_credential() {
        let store = TokenStore::new(Arc::new(MemorySecureStore::new()));
        store.set(Credential::new("T1").unwrap());
        let interceptor = BearerTokenInterceptor::new(store);

        let mut ctx = request();
        interceptor.intercept(&mut ctx);

        assert_eq!(ctx.header("authorization"), Some("Bearer T1"));
        assert_eq!(ctx.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_bearer_interceptor_leaves_headers_alone_without_credential() {
        let interceptor =
            BearerTokenInterceptor::new(TokenStore::new(Arc::new(MemorySecureStore::new())));

        let mut ctx = request();
        ctx.set_header("Authorization", "Basic host-supplied");
        interceptor.intercept(&mut ctx);

        assert_eq!(ctx.header("Authorization"), Some("Basic host-supplied"));
        assert_eq!(ctx.headers().len(), 2);
    }

    #[test]
    fn test_bearer_interceptor_reads_store_on_every_call() {
        let store = TokenStore::new(Arc::new(MemorySecureStore::new()));
        let interceptor = BearerTokenInterceptor::new(store.clone());

        store.set(Credential::new("T1").unwrap());
        let mut first = request();
        interceptor.intercept(&mut first);

        store.set(Credential::new("T2").unwrap());
        let mut second = request();
        interceptor.intercept(&mut second);

        assert_eq!(first.header("Authorization"), Some("Bearer T1"));
        assert_eq!(second.header("Authorization"), Some("Bearer T2"));
    }
}
