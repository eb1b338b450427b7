pub mod http;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alert_core::error::AppError;
use serde_json::Value;
use thiserror::Error;

/// Failures surfaced by the transport layer.
///
/// `NotFound` is the only variant the query adapter ever absorbs; everything else propagates so
/// callers can tell an outage apart from an empty result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("resource not found: {path}")]
    NotFound { path: String },

    #[error("request not authorized (status {status})")]
    Unauthorized { status: u16 },

    #[error("server error (status {status})")]
    Server { status: u16 },

    #[error("network failure: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::NotFound { .. } => "API_NOT_FOUND",
            TransportError::Unauthorized { .. } => "API_UNAUTHORIZED",
            TransportError::Server { .. } => "API_SERVER_ERROR",
            TransportError::Network(_) => "API_NETWORK_ERROR",
            TransportError::Decode(_) => "API_DECODE_FAILED",
            TransportError::Cancelled => "API_CANCELLED",
            TransportError::InvalidRequest(_) => "API_INVALID_REQUEST",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Network(_) | TransportError::Server { .. })
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        let message = match &err {
            TransportError::NotFound { .. } => "Requested alert data was not found",
            TransportError::Unauthorized { .. } => "Not authorized to read alert data",
            TransportError::Server { .. } => "Alert service returned an error",
            TransportError::Network(_) => "Failed to reach alert service",
            TransportError::Decode(_) => "Alert service returned an unexpected payload",
            TransportError::Cancelled => "Request was cancelled",
            TransportError::InvalidRequest(_) => "Invalid alert request",
        };
        AppError::new(err.code(), message)
            .with_details(err.to_string())
            .with_retryable(err.is_retryable())
    }
}

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn ensure_active(&self) -> Result<(), TransportError> {
        if self.is_cancelled() {
            Err(TransportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A logical GET against the alert service: path segments plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// `/`-joined path, unencoded. For logging and matching only.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Supplies parsed JSON for a request, or a typed failure.
pub trait AlertTransport: Send + Sync {
    fn get_json(&self, request: &ApiRequest, cancel: &CancelToken) -> Result<Value, TransportError>;
}

impl<T: AlertTransport + ?Sized> AlertTransport for Arc<T> {
    fn get_json(
        &self,
        request: &ApiRequest,
        cancel: &CancelToken,
    ) -> Result<Value, TransportError> {
        (**self).get_json(request, cancel)
    }
}

impl<T: AlertTransport + ?Sized> AlertTransport for &T {
    fn get_json(
        &self,
        request: &ApiRequest,
        cancel: &CancelToken,
    ) -> Result<Value, TransportError> {
        (**self).get_json(request, cancel)
    }
}
