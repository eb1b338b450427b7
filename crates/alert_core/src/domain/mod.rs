use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Case-insensitive parse of producer severity labels. Unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "moderate" | "warning" | "warn" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "info" | "informational" | "notice" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Investigating,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "new" => Some(AlertStatus::Open),
            "acknowledged" | "ack" => Some(AlertStatus::Acknowledged),
            "investigating" | "in_progress" | "in-progress" => Some(AlertStatus::Investigating),
            "resolved" | "closed" => Some(AlertStatus::Resolved),
            "dismissed" | "ignored" | "suppressed" => Some(AlertStatus::Dismissed),
            _ => None,
        }
    }
}

/// Absolute RFC3339 UTC instant paired with the coarse label shown next to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimestampInfo {
    pub absolute: String,
    pub relative: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub icon: String,
    pub model: String,
    pub vendor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertAnalysis {
    pub summary: String,
    /// Never empty.
    pub root_causes: Vec<String>,
    pub business_impact: String,
    /// Never empty.
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: TimestampInfo,
    pub summary: String,
    pub status: AlertStatus,
}

/// Fully populated alert record consumed by every rendering collaborator.
///
/// Every field has a documented derivation rule, so consumers never null-check. Values are
/// rebuilt on every normalization call and are not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAlert {
    pub id: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub confidence: i64,
    pub timestamp: TimestampInfo,
    pub device: DeviceInfo,
    pub analysis: AlertAnalysis,
    pub similar_event_count: u64,
    pub history: Vec<HistoryEntry>,
}
