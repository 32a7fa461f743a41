//! # Pipeline Stages
//!
//! Contracts for the stages every [`ApiClient`](crate::ApiClient) call runs
//! through:
//!
//! 1. [`RequestInterceptor`]s see a mutable [`RequestContext`] before the
//!    request is sent. Only headers can be changed.
//! 2. [`ResponseInterceptor`]s see the finished [`ResponseOutcome`] and may
//!    raise a [`PipelineSignal`]. They cannot alter the outcome.
//! 3. Raised signals are delivered to every [`PipelineObserver`].
//!
//! All stages are synchronous so that they complete before the caller's
//! `.await` returns.

use crate::error::ApiError;
use crate::ApiResponse;
use bridge_traits::HttpMethod;
use std::collections::BTreeMap;

/// Per-call request draft handed to outbound interceptors.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: HttpMethod,
    path: String,
    body: Option<bytes::Bytes>,
    headers: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        body: Option<bytes::Bytes>,
        headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            headers,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path relative to the base URL, as passed by the caller
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing value regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove_header(&name);
        self.headers.insert(name, value.into());
    }

    /// Removes a header regardless of case. Returns the removed value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let existing = self
            .headers
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()?;
        self.headers.remove(&existing)
    }

    pub(crate) fn into_parts(self) -> (HttpMethod, String, Option<bytes::Bytes>, BTreeMap<String, String>) {
        (self.method, self.path, self.body, self.headers)
    }
}

/// Completed exchange as seen by inbound interceptors.
#[derive(Debug, Clone, Copy)]
pub struct ResponseOutcome<'a> {
    pub method: HttpMethod,
    pub path: &'a str,
    pub result: &'a Result<ApiResponse, ApiError>,
}

impl ResponseOutcome<'_> {
    /// HTTP status of the response, `None` when the request never got one
    pub fn status(&self) -> Option<u16> {
        match self.result {
            Ok(response) => Some(response.status),
            Err(err) => err.status(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Notification raised by an inbound interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSignal {
    /// The backend refused the request's credential.
    Unauthorized { status: u16, path: String },
}

/// Outbound stage. May only adjust headers.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: &mut RequestContext);
}

/// Inbound stage. Observes the outcome and optionally raises a signal.
pub trait ResponseInterceptor: Send + Sync {
    fn inspect(&self, outcome: &ResponseOutcome<'_>) -> Option<PipelineSignal>;
}

/// Receives signals raised by inbound interceptors.
pub trait PipelineObserver: Send + Sync {
    fn on_signal(&self, signal: &PipelineSignal);
}
