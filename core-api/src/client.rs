//! Pipeline-aware HTTP client bound to the backend base address.

use crate::error::{ApiError, Result};
use crate::interceptor::{
    PipelineObserver, PipelineSignal, RequestContext, RequestInterceptor, ResponseInterceptor,
    ResponseOutcome,
};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_runtime::config::{merge_header, CoreConfig};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Decoded 2xx response.
///
/// An empty body decodes to `Value::Null`; a body that is not JSON is kept
/// as `Value::String`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

struct Pipeline {
    transport: Arc<dyn HttpClient>,
    base_url: String,
    default_headers: BTreeMap<String, String>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    observers: Vec<Arc<dyn PipelineObserver>>,
}

/// Shared HTTP facility for every backend call.
///
/// Cloning is cheap; clones share the same transport and stages.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Pipeline>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("request_interceptors", &self.inner.request_interceptors.len())
            .field("response_interceptors", &self.inner.response_interceptors.len())
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}

impl ApiClient {
    pub fn builder(transport: Arc<dyn HttpClient>, base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            transport,
            base_url: base_url.into(),
            default_headers: BTreeMap::new(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Builder seeded with the configured transport, base URL and default headers.
    pub fn from_config(config: &CoreConfig) -> ApiClientBuilder {
        let mut builder = Self::builder(Arc::clone(&config.http_client), config.api_base_url.clone());
        builder.default_headers = config.default_headers.clone();
        builder
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send::<()>(HttpMethod::Get, path, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.send(HttpMethod::Post, path, Some(body)).await
    }

    /// Runs one request through every stage.
    ///
    /// The outcome returned is exactly what inbound interceptors observed.
    /// No retries are attempted.
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn send<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(|b| serde_json::to_vec(b).map(Bytes::from))
            .transpose()
            .map_err(|e| ApiError::Encode(e.to_string()))?;

        let mut context =
            RequestContext::new(method, path, body, self.inner.default_headers.clone());
        for interceptor in &self.inner.request_interceptors {
            interceptor.intercept(&mut context);
        }

        let request = self.build_request(context);
        debug!(url = %request.url, "Sending request");

        let result = match self.inner.transport.execute(request).await {
            Ok(response) => decode_response(response),
            Err(e) => {
                warn!(error = %e, "Request did not complete");
                Err(ApiError::Network {
                    message: e.to_string(),
                })
            }
        };

        match &result {
            Ok(response) => debug!(status = response.status, "Request succeeded"),
            Err(ApiError::Status { status, .. }) => debug!(status, "Request rejected"),
            Err(_) => {}
        }

        let outcome = ResponseOutcome {
            method,
            path,
            result: &result,
        };
        for interceptor in &self.inner.response_interceptors {
            if let Some(signal) = interceptor.inspect(&outcome) {
                self.dispatch(&signal);
            }
        }

        result
    }

    fn build_request(&self, context: RequestContext) -> HttpRequest {
        let (method, path, body, headers) = context.into_parts();

        let mut request = HttpRequest::new(method, join_url(&self.inner.base_url, &path));
        request.headers.extend(headers);
        request.body = body;
        request
    }

    fn dispatch(&self, signal: &PipelineSignal) {
        debug!(?signal, observers = self.inner.observers.len(), "Pipeline signal raised");
        for observer in &self.inner.observers {
            observer.on_signal(signal);
        }
    }
}

/// Builder for [`ApiClient`]. Stages run in the order they are added.
pub struct ApiClientBuilder {
    transport: Arc<dyn HttpClient>,
    base_url: String,
    default_headers: BTreeMap<String, String>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl ApiClientBuilder {
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        merge_header(&mut self.default_headers, name.into(), value.into());
        self
    }

    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            inner: Arc::new(Pipeline {
                transport: self.transport,
                base_url: self.base_url,
                default_headers: self.default_headers,
                request_interceptors: self.request_interceptors,
                response_interceptors: self.response_interceptors,
                observers: self.observers,
            }),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

fn decode_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn decode_response(response: HttpResponse) -> Result<ApiResponse> {
    let body = decode_body(&response.body);

    if response.is_success() {
        Ok(ApiResponse {
            status: response.status,
            body,
        })
    } else {
        Err(ApiError::Status {
            status: response.status,
            body: (!body.is_null()).then_some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use mockall::predicate::*;
    use serde_json::json;
    use std::sync::Mutex;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    struct StaticHeader;

    impl RequestInterceptor for StaticHeader {
        fn intercept(&self, request: &mut RequestContext) {
            request.set_header("X-Trace", format!("{} {}", request.method(), request.path()));
        }
    }

    struct FlagStatus(u16);

    impl ResponseInterceptor for FlagStatus {
        fn inspect(&self, outcome: &ResponseOutcome<'_>) -> Option<PipelineSignal> {
            (outcome.status() == Some(self.0)).then(|| PipelineSignal::Unauthorized {
                status: self.0,
                path: outcome.path.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        signals: Mutex<Vec<PipelineSignal>>,
    }

    impl PipelineObserver for Recorder {
        fn on_signal(&self, signal: &PipelineSignal) {
            self.signals.lock().unwrap().push(signal.clone());
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:8000", "/api/v1/x"), "http://h:8000/api/v1/x");
        assert_eq!(join_url("http://h:8000/", "/api/v1/x"), "http://h:8000/api/v1/x");
        assert_eq!(join_url("http://h:8000/", "api/v1/x"), "http://h:8000/api/v1/x");
        assert_eq!(join_url("http://h:8000/base", "x"), "http://h:8000/base/x");
        assert_eq!(join_url("http://h:8000", ""), "http://h:8000");
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(
            decode_body(b"Internal Server Error"),
            Value::String("Internal Server Error".to_string())
        );
    }

    #[tokio::test]
    async fn test_post_sends_json_with_default_headers() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "http://localhost:8000/api/v1/auth/login"
                    && req.header_value("content-type") == Some("application/json")
                    && req.body.as_deref() == Some(br#"{"email":"a@b.c"}"#.as_slice())
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"data":{"access_token":"T1"}}"#)));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000/")
            .default_header("Content-Type", "application/json")
            .build();

        let response = client
            .post("/api/v1/auth/login", &json!({"email": "a@b.c"}))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["access_token"], "T1");
    }

    #[tokio::test]
    async fn test_default_header_override_sends_single_content_type() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.headers.len() == 1
                    && req.header_value("Content-Type") == Some("application/json; charset=utf-8")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(204, "")));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000")
            .default_header("Content-Type", "application/json")
            .default_header("content-type", "application/json; charset=utf-8")
            .build();

        client.get("/api/v1/auth/me").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_sends_no_body() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Get && req.body.is_none())
            .times(1)
            .returning(|_| Ok(HttpResponse::new(204, "")));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        let response = client.get("/api/v1/auth/me").await.unwrap();

        assert_eq!(response.status, 204);
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn test_request_interceptors_run_in_order() {
        struct Overwrite;
        impl RequestInterceptor for Overwrite {
            fn intercept(&self, request: &mut RequestContext) {
                request.set_header("x-trace", "second");
            }
        }

        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .withf(|req| req.header_value("X-Trace") == Some("second") && req.headers.len() == 1)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "{}")));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000")
            .request_interceptor(Arc::new(StaticHeader))
            .request_interceptor(Arc::new(Overwrite))
            .build();

        client.get("/x").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_error_with_body() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(400, r#"{"detail":"Email already registered"}"#)));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        let err = client.post("/api/v1/auth/register", &json!({})).await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some(&json!({"detail": "Email already registered"})));
    }

    #[tokio::test]
    async fn test_status_error_with_empty_body() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(503, "")));

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        let err = client.get("/x").await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                status: 503,
                body: None
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_network() {
        let mut transport = MockHttpClient::new();
        transport.expect_execute().times(1).returning(|_| {
            Err(BridgeError::OperationFailed("Connection failed".to_string()))
        });

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        let err = client.get("/x").await.unwrap_err();

        assert!(matches!(err, ApiError::Network { ref message } if message.contains("Connection failed")));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_signal_reaches_observers_and_outcome_is_unchanged() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(401, r#"{"detail":"Not authenticated"}"#)));

        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000")
            .response_interceptor(Arc::new(FlagStatus(401)))
            .observer(recorder.clone())
            .build();

        let err = client.get("/api/v1/auth/me").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some(&json!({"detail": "Not authenticated"})));
        assert_eq!(
            *recorder.signals.lock().unwrap(),
            vec![PipelineSignal::Unauthorized {
                status: 401,
                path: "/api/v1/auth/me".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_no_signal_on_success() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "{}")));

        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000")
            .response_interceptor(Arc::new(FlagStatus(401)))
            .observer(recorder.clone())
            .build();

        client.get("/x").await.unwrap();
        assert!(recorder.signals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_encode_failure_never_reaches_transport() {
        struct Unserializable;
        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("nope"))
            }
        }

        let mut transport = MockHttpClient::new();
        transport.expect_execute().never();

        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        let err = client.post("/x", &Unserializable).await.unwrap_err();

        assert!(matches!(err, ApiError::Encode(_)));
    }

    #[tokio::test]
    async fn test_predicate_on_url() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .with(function(|req: &HttpRequest| req.url.ends_with("/api/v1/timetable/me")))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "[]")));

        let client = ApiClient::builder(Arc::new(transport), "https://campus.example.edu").build();
        let response = client.get("api/v1/timetable/me").await.unwrap();

        assert_eq!(response.body, json!([]));
    }
}
