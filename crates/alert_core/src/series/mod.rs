//! Chart-ready series reshaping.
//!
//! Output contract is [`SeriesPoint`]: one point per (date, series) pair, dates as canonical
//! RFC3339 UTC. Points whose date cannot be parsed are dropped, never defaulted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::timestamps::{canonicalize_rfc3339_utc, resolve_timestamp};
use crate::raw::{array_items, number, timestamp};

pub const ALERTS_SERIES: &str = "Alerts";

const SERIES_WRAPPERS: [&str; 3] = ["data", "points", "series"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
    pub series_name: String,
}

/// Maps a numeric field of a backend point onto a named series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricField {
    pub field: &'static str,
    pub series_name: &'static str,
}

pub const AI_IMPACT_METRICS: [MetricField; 3] = [
    MetricField {
        field: "alerts_processed",
        series_name: "Alerts Processed",
    },
    MetricField {
        field: "patterns_detected",
        series_name: "Patterns Detected",
    },
    MetricField {
        field: "mttr_improvement_pct",
        series_name: "MTTR Improvement %",
    },
];

fn point_date(point: &Map<String, Value>) -> Option<String> {
    timestamp(point, &["timestamp", "date", "time"])
        .as_ref()
        .and_then(resolve_timestamp)
        .and_then(canonicalize_rfc3339_utc)
}

fn dated_points(payload: &Value) -> impl Iterator<Item = (String, &Map<String, Value>)> {
    array_items(payload, &SERIES_WRAPPERS)
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let Some(point) = item.as_object() else {
                tracing::debug!(idx, "dropping non-object series point");
                return None;
            };
            match point_date(point) {
                Some(date) => Some((date, point)),
                None => {
                    tracing::debug!(idx, "dropping series point with unparseable date");
                    None
                }
            }
        })
}

/// Reshape into a single series: every point carries `series_name`, whatever per-point
/// `group`/`label` the backend sent.
pub fn reshape_single_series(payload: &Value, series_name: &str) -> Vec<SeriesPoint> {
    dated_points(payload)
        .map(|(date, point)| SeriesPoint {
            date,
            value: number(point, &["value", "count"]).unwrap_or(0.0),
            series_name: series_name.to_string(),
        })
        .collect()
}

/// Expand each point carrying several metrics into one output point per metric.
///
/// A metric absent from a point is skipped for that point.
pub fn flatten_metrics(payload: &Value, metrics: &[MetricField]) -> Vec<SeriesPoint> {
    dated_points(payload)
        .flat_map(|(date, point)| {
            metrics.iter().filter_map(move |m| {
                number(point, &[m.field]).map(|value| SeriesPoint {
                    date: date.clone(),
                    value,
                    series_name: m.series_name.to_string(),
                })
            })
        })
        .collect()
}

pub fn flatten_ai_impact(payload: &Value) -> Vec<SeriesPoint> {
    flatten_metrics(payload, &AI_IMPACT_METRICS)
}
