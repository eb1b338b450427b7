pub mod confidence;
pub mod timestamps;

use serde_json::Value;

use crate::analysis::{derive_business_impact, extract_recommended_actions, extract_root_causes};
use crate::domain::{
    AlertAnalysis, AlertStatus, CanonicalAlert, DeviceInfo, HistoryEntry, Severity,
};
use crate::raw::{AlertPayload, DeviceField, DevicePayload, RawAlert, TextOrList};

use confidence::normalize_confidence;
use timestamps::{timestamp_info, Clock, SystemClock};

pub const UNKNOWN_ID: &str = "unknown";
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";
pub const UNKNOWN_IP: &str = "0.0.0.0";
pub const DEFAULT_DEVICE_ICON: &str = "server";
pub const UNKNOWN_MODEL: &str = "Unknown Model";
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
pub const UNKNOWN_SOURCE: &str = "Unknown";
pub const NO_SUMMARY: &str = "No summary available";
pub const HISTORY_NO_SUMMARY: &str = "Event recorded";

/// Converts raw backend alerts into [`CanonicalAlert`]s.
///
/// Holds only the clock used for relative labels; every call recomputes from its input.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer<C = SystemClock> {
    clock: C,
}

impl RecordNormalizer<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> RecordNormalizer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Never fails: missing or mistyped fields resolve to documented defaults.
    pub fn normalize(&self, raw: &RawAlert) -> CanonicalAlert {
        match raw {
            RawAlert::Recognized(payload) => self.normalize_payload(payload),
            RawAlert::Unrecognized(value) => {
                tracing::warn!(
                    kind = json_kind(value),
                    "alert payload is not an object; normalizing with defaults"
                );
                self.normalize_payload(&AlertPayload::default())
            }
        }
    }

    pub fn normalize_value(&self, value: Value) -> CanonicalAlert {
        self.normalize(&RawAlert::from_value(value))
    }

    /// One output record per input value, in input order.
    pub fn normalize_all<I>(&self, values: I) -> Vec<CanonicalAlert>
    where
        I: IntoIterator<Item = Value>,
    {
        values
            .into_iter()
            .map(|v| self.normalize_value(v))
            .collect()
    }

    fn normalize_payload(&self, p: &AlertPayload) -> CanonicalAlert {
        let now = self.clock.now();

        let severity = p
            .severity
            .as_deref()
            .and_then(Severity::parse)
            .unwrap_or(Severity::Info);
        let status = p
            .status
            .as_deref()
            .and_then(AlertStatus::parse)
            .unwrap_or(AlertStatus::Open);
        let device = resolve_device(p);

        let title = p
            .title
            .clone()
            .unwrap_or_else(|| format!("{} alert on {}", severity.label(), device.name));

        let structured = p.analysis.as_ref();
        let structured_summary = structured.and_then(|a| a.summary.as_deref());
        let analysis_text = structured_summary.or(p.summary.as_deref());

        let summary = p
            .summary
            .as_deref()
            .or(structured_summary)
            .unwrap_or(title.as_str())
            .to_string();

        let root_causes = structured
            .and_then(|a| a.root_causes.as_ref())
            .or(p.legacy_root_cause.as_ref())
            .map(verbatim_list)
            .unwrap_or_else(|| extract_root_causes(analysis_text.unwrap_or_default()));

        let business_impact = structured
            .and_then(|a| a.business_impact.clone())
            .or_else(|| p.legacy_business_impact.clone())
            .unwrap_or_else(|| derive_business_impact(severity, analysis_text));

        let recommended_actions = match (
            structured.and_then(|a| a.recommended_actions.as_ref()),
            p.legacy_recommended_action.as_ref(),
        ) {
            (Some(actions), _) => verbatim_list(actions),
            (None, Some(TextOrList::List(list))) => list.clone(),
            (None, Some(TextOrList::Text(text))) => extract_recommended_actions(text),
            (None, None) => extract_recommended_actions(analysis_text.unwrap_or_default()),
        };

        let history = p
            .history
            .iter()
            .map(|h| HistoryEntry {
                timestamp: timestamp_info(h.timestamp.as_ref(), now),
                summary: h
                    .summary
                    .clone()
                    .unwrap_or_else(|| HISTORY_NO_SUMMARY.to_string()),
                status: h
                    .status
                    .as_deref()
                    .and_then(AlertStatus::parse)
                    .unwrap_or(AlertStatus::Open),
            })
            .collect();

        CanonicalAlert {
            id: p.id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            severity,
            status,
            title,
            summary,
            source: p
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            confidence: normalize_confidence(p.ai_confidence.or(p.confidence).unwrap_or(0.0)),
            timestamp: timestamp_info(p.timestamp.as_ref(), now),
            device,
            analysis: AlertAnalysis {
                summary: analysis_text.unwrap_or(NO_SUMMARY).to_string(),
                root_causes,
                business_impact,
                recommended_actions,
            },
            similar_event_count: p.similar_events.unwrap_or(0),
            history,
        }
    }
}

fn verbatim_list(value: &TextOrList) -> Vec<String> {
    match value {
        TextOrList::Text(text) => vec![text.clone()],
        TextOrList::List(list) => list.clone(),
    }
}

fn resolve_device(p: &AlertPayload) -> DeviceInfo {
    let empty = DevicePayload::default();
    let (structured, bare_name) = match &p.device {
        Some(DeviceField::Structured(d)) => (d, None),
        Some(DeviceField::Name(name)) => (&empty, Some(name)),
        None => (&empty, None),
    };

    let name = structured
        .name
        .as_ref()
        .or(p.device_name.as_ref())
        .or(bare_name)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());
    let ip = structured
        .ip
        .as_ref()
        .or(p.source_ip.as_ref())
        .or(p.device_ip.as_ref())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_IP.to_string());
    let icon = structured
        .icon
        .clone()
        .or_else(|| {
            structured
                .device_type
                .as_deref()
                .or(p.device_type.as_deref())
                .and_then(icon_for_device_type)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_DEVICE_ICON.to_string());

    DeviceInfo {
        id: structured
            .id
            .as_ref()
            .or(p.device_id.as_ref())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ID.to_string()),
        name,
        ip,
        icon,
        model: structured
            .model
            .clone()
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
        vendor: structured
            .vendor
            .clone()
            .unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
    }
}

pub fn icon_for_device_type(device_type: &str) -> Option<&'static str> {
    let t = device_type.to_ascii_lowercase();
    if t.contains("router") {
        Some("router")
    } else if t.contains("switch") {
        Some("switch")
    } else if t.contains("firewall") {
        Some("firewall")
    } else if t.contains("wireless") || t.contains("access point") || t.contains("wifi") {
        Some("wifi")
    } else if t.contains("storage") {
        Some("storage")
    } else if t.contains("server") {
        Some("server")
    } else {
        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
