//! Validated view over producer-controlled alert payloads.
//!
//! Backends disagree on casing, optionality and value types. Everything is resolved here into a
//! closed set of shapes so the normalizer can be a total function over them:
//! - a JSON object becomes [`RawAlert::Recognized`]; keys holding a value of an unexpected type are
//!   treated as absent rather than failing the record,
//! - any other JSON value becomes [`RawAlert::Unrecognized`] and normalizes to defaults.
//!
//! Key lists are priority-ordered: the first key holding a non-empty value wins.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum RawAlert {
    Recognized(AlertPayload),
    Unrecognized(Value),
}

impl RawAlert {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawAlert::Recognized(AlertPayload::from_object(&map)),
            other => RawAlert::Unrecognized(other),
        }
    }
}

impl From<Value> for RawAlert {
    fn from(value: Value) -> Self {
        RawAlert::from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimestampValue {
    Text(String),
    /// Unix epoch; seconds, or milliseconds for large magnitudes.
    Epoch(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceField {
    Structured(DevicePayload),
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub icon: Option<String>,
    pub device_type: Option<String>,
    pub model: Option<String>,
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPayload {
    pub summary: Option<String>,
    pub root_causes: Option<TextOrList>,
    pub business_impact: Option<String>,
    pub recommended_actions: Option<TextOrList>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPayload {
    pub timestamp: Option<TimestampValue>,
    pub summary: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertPayload {
    pub id: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub ai_confidence: Option<f64>,
    pub confidence: Option<f64>,
    pub timestamp: Option<TimestampValue>,
    pub source: Option<String>,
    pub device: Option<DeviceField>,
    pub device_name: Option<String>,
    pub device_id: Option<String>,
    pub source_ip: Option<String>,
    pub device_ip: Option<String>,
    pub device_type: Option<String>,
    pub analysis: Option<AnalysisPayload>,
    pub legacy_root_cause: Option<TextOrList>,
    pub legacy_business_impact: Option<String>,
    pub legacy_recommended_action: Option<TextOrList>,
    pub similar_events: Option<u64>,
    pub history: Vec<HistoryPayload>,
}

impl AlertPayload {
    pub fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            id: ident(map, &["id"]),
            severity: text(map, &["severity"]),
            status: text(map, &["status"]),
            title: text(map, &["title", "name"]),
            summary: text(map, &["summary", "description", "message"]),
            ai_confidence: number(map, &["ai_confidence", "aiConfidence"]),
            confidence: number(map, &["confidence"]),
            timestamp: timestamp(map, &["timestamp", "created_at", "createdAt"]),
            source: text(map, &["source", "source_type", "sourceType"]),
            device: device(map),
            device_name: text(map, &["device_name", "deviceName"]),
            device_id: ident(map, &["device_id", "deviceId"]),
            source_ip: text(map, &["source_ip", "sourceIp"]),
            device_ip: text(map, &["device_ip", "deviceIp"]),
            device_type: text(map, &["device_type", "deviceType"]),
            analysis: object(map, &["ai_analysis", "aiAnalysis", "analysis"]).map(|a| {
                AnalysisPayload {
                    summary: text(a, &["summary"]),
                    root_causes: text_or_list(a, &["root_causes", "rootCauses"]),
                    business_impact: text(a, &["business_impact", "businessImpact"]),
                    recommended_actions: text_or_list(
                        a,
                        &["recommended_actions", "recommendedActions"],
                    ),
                }
            }),
            legacy_root_cause: text_or_list(
                map,
                &["root_cause", "rootCause", "root_causes", "rootCauses"],
            ),
            legacy_business_impact: text(map, &["business_impact", "businessImpact"]),
            legacy_recommended_action: text_or_list(
                map,
                &[
                    "recommended_action",
                    "recommendedAction",
                    "recommended_actions",
                    "recommendedActions",
                ],
            ),
            similar_events: count(
                map,
                &[
                    "similar_events",
                    "similarEvents",
                    "similar_event_count",
                    "similarEventCount",
                ],
            ),
            history: history(map),
        }
    }
}

fn device(map: &Map<String, Value>) -> Option<DeviceField> {
    match map.get("device")? {
        Value::Object(d) => Some(DeviceField::Structured(DevicePayload {
            id: ident(d, &["id"]),
            name: text(d, &["name", "hostname"]),
            ip: text(d, &["ip", "ip_address", "ipAddress"]),
            icon: text(d, &["icon"]),
            device_type: text(d, &["type", "device_type", "deviceType"]),
            model: text(d, &["model"]),
            vendor: text(d, &["vendor", "manufacturer"]),
        })),
        Value::String(s) if !s.trim().is_empty() => Some(DeviceField::Name(s.trim().to_string())),
        _ => None,
    }
}

fn history(map: &Map<String, Value>) -> Vec<HistoryPayload> {
    let Some(items) = ["history", "event_history", "eventHistory"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_array))
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(h) => Some(HistoryPayload {
                timestamp: timestamp(h, &["timestamp", "time", "date"]),
                summary: text(h, &["summary", "description", "event", "title"]),
                status: text(h, &["status"]),
            }),
            Value::String(s) if !s.trim().is_empty() => Some(HistoryPayload {
                summary: Some(s.trim().to_string()),
                ..HistoryPayload::default()
            }),
            _ => None,
        })
        .collect()
}

/// Elements of a bare array, or of the first array found under `wrapper_keys` of an object.
///
/// `null` and unknown envelopes yield no elements.
pub fn array_items<'a>(payload: &'a Value, wrapper_keys: &[&str]) -> &'a [Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => wrapper_keys
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

pub(crate) fn object<'a>(
    map: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_object))
}

/// First non-blank string value among `keys`, trimmed.
pub(crate) fn text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Like [`text`], but also accepts integer identifiers.
pub(crate) fn ident(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| map.get(*k).and_then(numeric))
}

/// Numbers, or numeric strings with an optional trailing `%`.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s).trim_end();
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Non-negative count, rounded to the nearest integer.
pub(crate) fn as_count(value: f64) -> u64 {
    if value <= 0.0 {
        0
    } else {
        value.round() as u64
    }
}

fn count(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::Array(items)) => Some(items.len() as u64),
        Some(v) => numeric(v).map(as_count),
        None => None,
    })
}

fn text_or_list(map: &Map<String, Value>, keys: &[&str]) -> Option<TextOrList> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            Some(TextOrList::Text(s.trim().to_string()))
        }
        Some(Value::Array(items)) => {
            let list = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            if list.is_empty() {
                None
            } else {
                Some(TextOrList::List(list))
            }
        }
        _ => None,
    })
}

pub(crate) fn timestamp(map: &Map<String, Value>, keys: &[&str]) -> Option<TimestampValue> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            Some(TimestampValue::Text(s.trim().to_string()))
        }
        Some(Value::Number(n)) => n.as_f64().map(TimestampValue::Epoch),
        _ => None,
    })
}
