//! Query façade over the alert service.
//!
//! Each call fetches through an [`AlertTransport`], checks cancellation, then hands the raw payload
//! to the pure reshaping code in `alert_core`. Nothing is cached between calls.

use alert_core::analytics::{
    reshape_noisy_devices, reshape_severity_distribution, reshape_summary, AlertSummary,
    NoisyDevice, SeverityCount,
};
use alert_core::domain::CanonicalAlert;
use alert_core::normalize::timestamps::{canonicalize_rfc3339_utc, Clock, SystemClock};
use alert_core::normalize::RecordNormalizer;
use alert_core::series::{flatten_ai_impact, reshape_single_series, SeriesPoint, ALERTS_SERIES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Duration;

use crate::transport::{AlertTransport, ApiRequest, CancelToken, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "30d")]
    Last30d,
    #[serde(rename = "90d")]
    Last90d,
}

impl TimeRange {
    /// Unrecognized tokens yield `None`, which means "no time filtering".
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "24h" => Some(TimeRange::Last24h),
            "7d" => Some(TimeRange::Last7d),
            "30d" => Some(TimeRange::Last30d),
            "90d" => Some(TimeRange::Last90d),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "24h",
            TimeRange::Last7d => "7d",
            TimeRange::Last30d => "30d",
            TimeRange::Last90d => "90d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Last24h => Duration::hours(24),
            TimeRange::Last7d => Duration::days(7),
            TimeRange::Last30d => Duration::days(30),
            TimeRange::Last90d => Duration::days(90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateKind {
    Summary,
    OverTime { period: Option<String> },
    SeverityDistribution,
    NoisyDevices { limit: Option<usize> },
    AiImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Aggregate {
    Summary(AlertSummary),
    OverTime(Vec<SeriesPoint>),
    SeverityDistribution(Vec<SeverityCount>),
    NoisyDevices(Vec<NoisyDevice>),
    AiImpact(Vec<SeriesPoint>),
}

pub struct AlertQueryAdapter<T, C = SystemClock> {
    transport: T,
    normalizer: RecordNormalizer<C>,
}

impl<T: AlertTransport> AlertQueryAdapter<T, SystemClock> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            normalizer: RecordNormalizer::new(),
        }
    }
}

impl<T: AlertTransport, C: Clock> AlertQueryAdapter<T, C> {
    pub fn with_clock(transport: T, clock: C) -> Self {
        Self {
            transport,
            normalizer: RecordNormalizer::with_clock(clock),
        }
    }

    pub fn normalizer(&self) -> &RecordNormalizer<C> {
        &self.normalizer
    }

    /// Fetch and re-check cancellation so a cancelled call never reaches normalization.
    fn fetch(&self, request: &ApiRequest, cancel: &CancelToken) -> Result<Value, TransportError> {
        cancel.ensure_active()?;
        let body = self.transport.get_json(request, cancel)?;
        cancel.ensure_active()?;
        Ok(body)
    }

    /// `Ok(None)` only for a not-found response; every other failure is returned as-is.
    pub fn get_alert(
        &self,
        id: &str,
        cancel: &CancelToken,
    ) -> Result<Option<CanonicalAlert>, TransportError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(TransportError::InvalidRequest(
                "alert id must not be empty".to_string(),
            ));
        }

        match self.fetch(&ApiRequest::new(["alerts", id]), cancel) {
            Ok(Value::Null) => Ok(None),
            Ok(body) => Ok(Some(self.normalizer.normalize_value(body))),
            Err(TransportError::NotFound { path }) => {
                tracing::debug!(%path, "alert not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// List alerts, optionally bounded to a relative window (`24h`, `7d`, `30d`, `90d`).
    ///
    /// Any other token, or none, lists without a time filter. Output order matches the payload and
    /// every raw record yields exactly one alert.
    pub fn list_alerts(
        &self,
        range_token: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<CanonicalAlert>, TransportError> {
        let mut request = ApiRequest::new(["alerts"]);
        if let Some(range) = range_token.and_then(TimeRange::parse) {
            let to = self.normalizer.clock().now();
            let from = to - range.duration();
            request = request
                .with_query("from", format_bound(from)?)
                .with_query("to", format_bound(to)?);
        }

        let body = self.fetch(&request, cancel)?;
        let items = alert_items(body)?;
        Ok(self.normalizer.normalize_all(items))
    }

    pub fn alert_summary(&self, cancel: &CancelToken) -> Result<AlertSummary, TransportError> {
        let body = self.fetch(&ApiRequest::new(["alerts", "summary"]), cancel)?;
        Ok(reshape_summary(&body))
    }

    pub fn alerts_over_time(
        &self,
        period: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<SeriesPoint>, TransportError> {
        let mut request = ApiRequest::new(["alerts", "over-time"]);
        if let Some(range) = period.and_then(TimeRange::parse) {
            request = request.with_query("period", range.as_token());
        }
        let body = self.fetch(&request, cancel)?;
        Ok(reshape_single_series(&body, ALERTS_SERIES))
    }

    pub fn severity_distribution(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<SeverityCount>, TransportError> {
        let body = self.fetch(&ApiRequest::new(["alerts", "severity-distribution"]), cancel)?;
        Ok(reshape_severity_distribution(&body))
    }

    pub fn noisy_devices(
        &self,
        limit: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<Vec<NoisyDevice>, TransportError> {
        let mut request = ApiRequest::new(["devices", "noisy"]);
        if let Some(limit) = limit {
            request = request.with_query("limit", limit.to_string());
        }
        let body = self.fetch(&request, cancel)?;
        Ok(reshape_noisy_devices(&body))
    }

    pub fn ai_impact_over_time(
        &self,
        cancel: &CancelToken,
    ) -> Result<Vec<SeriesPoint>, TransportError> {
        let body = self.fetch(&ApiRequest::new(["ai", "impact-over-time"]), cancel)?;
        Ok(flatten_ai_impact(&body))
    }

    pub fn aggregate(
        &self,
        kind: &AggregateKind,
        cancel: &CancelToken,
    ) -> Result<Aggregate, TransportError> {
        Ok(match kind {
            AggregateKind::Summary => Aggregate::Summary(self.alert_summary(cancel)?),
            AggregateKind::OverTime { period } => {
                Aggregate::OverTime(self.alerts_over_time(period.as_deref(), cancel)?)
            }
            AggregateKind::SeverityDistribution => {
                Aggregate::SeverityDistribution(self.severity_distribution(cancel)?)
            }
            AggregateKind::NoisyDevices { limit } => {
                Aggregate::NoisyDevices(self.noisy_devices(*limit, cancel)?)
            }
            AggregateKind::AiImpact => Aggregate::AiImpact(self.ai_impact_over_time(cancel)?),
        })
    }
}

fn format_bound(dt: time::OffsetDateTime) -> Result<String, TransportError> {
    canonicalize_rfc3339_utc(dt)
        .ok_or_else(|| TransportError::InvalidRequest(format!("cannot format time bound {dt}")))
}

/// Accepts a bare array, `{alerts: [...]}`, `{data: [...]}` or `null`.
fn alert_items(body: Value) -> Result<Vec<Value>, TransportError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["alerts", "data"] {
                match map.remove(key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Null) => return Ok(Vec::new()),
                    _ => {}
                }
            }
            let keys = map.keys().cloned().collect::<Vec<_>>().join(",");
            tracing::warn!(%keys, "unrecognized alert list envelope");
            Err(TransportError::Decode(format!(
                "unrecognized alert list envelope; keys={keys}"
            )))
        }
        other => Err(TransportError::Decode(format!(
            "expected alert list, got {other}"
        ))),
    }
}
