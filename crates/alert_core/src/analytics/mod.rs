use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Severity;
use crate::normalize::{UNKNOWN_DEVICE_NAME, UNKNOWN_IP};
use crate::raw::{array_items, as_count, number, numeric, object, text};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub info: u64,
    pub open: u64,
}

impl AlertSummary {
    pub fn count_for(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    fn slot(&mut self, severity: Severity) -> &mut u64 {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::Info => &mut self.info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoisyDevice {
    pub name: String,
    pub ip: String,
    pub alert_count: u64,
}

fn count_of(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    number(map, keys).map(as_count)
}

/// Severity counts from either a `by_severity` map or flat `<severity>_count` fields.
///
/// `total` falls back to the sum of severity counts when the backend omits it.
pub fn reshape_summary(payload: &Value) -> AlertSummary {
    let Some(map) = payload.as_object() else {
        if !payload.is_null() {
            tracing::warn!("alert summary payload is not an object; reporting zero counts");
        }
        return AlertSummary::default();
    };

    let mut summary = AlertSummary::default();
    if let Some(by_severity) = object(map, &["by_severity", "bySeverity"]) {
        // Keys may be cased or aliased differently per producer; fold them onto one bucket.
        for (key, value) in by_severity {
            if let (Some(severity), Some(n)) = (Severity::parse(key), numeric(value)) {
                *summary.slot(severity) += as_count(n);
            }
        }
    } else {
        for severity in Severity::ALL {
            let snake = format!("{}_count", severity.as_str());
            let camel = format!("{}Count", severity.as_str());
            *summary.slot(severity) =
                count_of(map, &[snake.as_str(), camel.as_str(), severity.as_str()]).unwrap_or(0);
        }
    }

    let severity_sum: u64 = Severity::ALL.iter().map(|s| summary.count_for(*s)).sum();
    summary.total =
        count_of(map, &["total", "total_alerts", "totalAlerts"]).unwrap_or(severity_sum);
    summary.open = count_of(map, &["open", "open_alerts", "openAlerts"]).unwrap_or(0);
    summary
}

/// One entry per backend row, input order preserved. Unknown labels count as `info`.
pub fn reshape_severity_distribution(payload: &Value) -> Vec<SeverityCount> {
    array_items(payload, &["data", "distribution"])
        .iter()
        .filter_map(Value::as_object)
        .map(|row| SeverityCount {
            severity: text(row, &["severity", "group", "label", "name"])
                .as_deref()
                .and_then(Severity::parse)
                .unwrap_or(Severity::Info),
            count: count_of(row, &["count", "value"]).unwrap_or(0),
        })
        .collect()
}

/// Accepts nested `{device: {...}, alert_count}` rows and flat `{device_name, device_ip, count}`
/// rows.
pub fn reshape_noisy_devices(payload: &Value) -> Vec<NoisyDevice> {
    array_items(payload, &["devices", "data"])
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            let nested = object(row, &["device"]);
            let bare = text(row, &["device"]);
            let name = nested
                .and_then(|d| text(d, &["name", "hostname"]))
                .or_else(|| text(row, &["device_name", "deviceName", "name"]))
                .or(bare)
                .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());
            let ip = nested
                .and_then(|d| text(d, &["ip", "ip_address", "ipAddress"]))
                .or_else(|| text(row, &["device_ip", "deviceIp", "source_ip", "ip"]))
                .unwrap_or_else(|| UNKNOWN_IP.to_string());
            NoisyDevice {
                name,
                ip,
                alert_count: count_of(row, &["alert_count", "alertCount", "count", "alerts"])
                    .unwrap_or(0),
            }
        })
        .collect()
}
