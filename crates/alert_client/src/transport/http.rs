use std::time::Duration;

use alert_core::error::AppError;
use serde_json::Value;
use url::Url;

use super::{AlertTransport, ApiRequest, CancelToken, TransportError};

pub const ENV_BASE_URL: &str = "ALERT_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ALERT_API_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; absent keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            cfg.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            cfg.timeout_ms = raw.trim().parse().map_err(|e| {
                AppError::config(format!("{ENV_TIMEOUT_MS} must be an integer"))
                    .with_details(format!("value={raw}; err={e}"))
            })?;
        }
        Ok(cfg)
    }
}

/// Blocking HTTP transport for the alert service.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| {
            AppError::config("Alert API base URL is not a valid URL")
                .with_details(format!("base_url={trimmed}; err={e}"))
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::config("Alert API base URL must use http or https")
                .with_details(format!("base_url={trimmed}")));
        }
        if base_url.host_str().map_or(true, str::is_empty) || base_url.cannot_be_a_base() {
            return Err(AppError::config("Alert API base URL must include a host")
                .with_details(format!("base_url={trimmed}")));
        }
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(AppError::config("Alert API base URL must not carry a query or fragment")
                .with_details(format!("base_url={trimmed}")));
        }
        if config.timeout_ms == 0 {
            return Err(AppError::config("Alert API timeout must be greater than zero"));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL for a request. Segments are percent-encoded.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidRequest("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(request.segments.iter());
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

impl AlertTransport for HttpTransport {
    fn get_json(
        &self,
        request: &ApiRequest,
        cancel: &CancelToken,
    ) -> Result<Value, TransportError> {
        cancel.ensure_active()?;
        let url = self.url_for(request)?;
        tracing::debug!(path = %request.path(), %url, "requesting alert service");

        match ureq::get(url.as_str()).timeout(self.timeout).call() {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|e| TransportError::Decode(e.to_string()))?;
                if body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
            }
            Err(ureq::Error::Status(404, _)) => Err(TransportError::NotFound {
                path: request.path(),
            }),
            Err(ureq::Error::Status(status @ (401 | 403), _)) => {
                Err(TransportError::Unauthorized { status })
            }
            Err(ureq::Error::Status(status, _)) => Err(TransportError::Server { status }),
            Err(ureq::Error::Transport(t)) => Err(TransportError::Network(t.to_string())),
        }
    }
}
