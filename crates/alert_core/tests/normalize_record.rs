use alert_core::analysis::{IMPACT_FALLBACK, ROOT_CAUSE_FALLBACK};
use alert_core::domain::{AlertStatus, Severity};
use alert_core::normalize::timestamps::{parse_timestamp, FixedClock};
use alert_core::normalize::{RecordNormalizer, UNKNOWN_DEVICE_NAME, UNKNOWN_IP};
use pretty_assertions::assert_eq;
use serde_json::json;

fn normalizer() -> RecordNormalizer<FixedClock> {
    RecordNormalizer::with_clock(FixedClock(
        parse_timestamp("2026-03-10T12:00:00Z").expect("fixture clock"),
    ))
}

#[test]
fn missing_device_gets_defaults() {
    for raw in [
        json!({}),
        json!({"id": "a-1", "severity": "high"}),
        json!({"id": "a-2", "device": null}),
    ] {
        let alert = normalizer().normalize_value(raw);
        assert_eq!(alert.device.name, UNKNOWN_DEVICE_NAME);
        assert_eq!(alert.device.ip, UNKNOWN_IP);
        assert_eq!(alert.device.icon, "server");
        assert_eq!(alert.device.model, "Unknown Model");
        assert_eq!(alert.device.vendor, "Unknown Vendor");
    }
}

#[test]
fn empty_record_is_fully_populated() {
    let alert = normalizer().normalize_value(json!({}));
    assert_eq!(alert.id, "unknown");
    assert_eq!(alert.severity, Severity::Info);
    assert_eq!(alert.status, AlertStatus::Open);
    assert_eq!(alert.title, "Info alert on Unknown Device");
    assert_eq!(alert.summary, alert.title);
    assert_eq!(alert.confidence, 0);
    assert_eq!(alert.timestamp.absolute, "1970-01-01T00:00:00Z");
    assert_eq!(alert.timestamp.relative, "Unknown");
    assert_eq!(alert.analysis.summary, "No summary available");
    assert_eq!(alert.analysis.root_causes, vec![ROOT_CAUSE_FALLBACK]);
    assert_eq!(alert.analysis.business_impact, IMPACT_FALLBACK);
    assert_eq!(alert.analysis.recommended_actions.len(), 1);
    assert_eq!(alert.similar_event_count, 0);
    assert!(alert.history.is_empty());
}

#[test]
fn device_name_priority() {
    let n = normalizer();
    let structured = n.normalize_value(json!({
        "device": {"name": "core-sw-01", "ip": "10.0.0.2"},
        "device_name": "ignored",
        "source_ip": "10.9.9.9",
    }));
    assert_eq!(structured.device.name, "core-sw-01");
    assert_eq!(structured.device.ip, "10.0.0.2");

    let flat = n.normalize_value(json!({
        "device": "bare-name",
        "device_name": "edge-rtr-02",
        "device_ip": "10.0.0.9",
        "source_ip": "10.0.0.3",
    }));
    assert_eq!(flat.device.name, "edge-rtr-02");
    assert_eq!(flat.device.ip, "10.0.0.3");

    let bare = n.normalize_value(json!({"device": "fw-dmz", "deviceIp": "192.168.1.1"}));
    assert_eq!(bare.device.name, "fw-dmz");
    assert_eq!(bare.device.ip, "192.168.1.1");
}

#[test]
fn device_icon_follows_type() {
    let alert = normalizer().normalize_value(json!({
        "device": {"name": "edge", "type": "Core Router", "vendor": "Cisco", "model": "ASR 1001"}
    }));
    assert_eq!(alert.device.icon, "router");
    assert_eq!(alert.device.vendor, "Cisco");
    assert_eq!(alert.device.model, "ASR 1001");

    let explicit = normalizer().normalize_value(json!({
        "device": {"icon": "database", "type": "router"}
    }));
    assert_eq!(explicit.device.icon, "database");
}

#[test]
fn confidence_prefers_ai_confidence_and_rescales() {
    let n = normalizer();
    assert_eq!(
        n.normalize_value(json!({"ai_confidence": 0.94, "confidence": 12})).confidence,
        94
    );
    assert_eq!(n.normalize_value(json!({"confidence": 94})).confidence, 94);
    assert_eq!(n.normalize_value(json!({"aiConfidence": "0.5"})).confidence, 50);
    assert_eq!(n.normalize_value(json!({"confidence": 150})).confidence, 150);
}

#[test]
fn structured_analysis_wins_over_legacy_and_heuristics() {
    let alert = normalizer().normalize_value(json!({
        "severity": "critical",
        "summary": "Interface flapped. CPU spiked to 95 percent causing packet loss.",
        "aiAnalysis": {
            "summary": "RAG-backed summary of the outage.",
            "rootCauses": ["Faulty optic on Gi0/1"],
            "businessImpact": "Checkout unavailable in EU",
            "recommendedActions": ["Replace optic", "Enable dampening"]
        },
        "root_cause": "legacy cause",
        "business_impact": "legacy impact",
        "recommended_action": "legacy action that is long enough."
    }));
    assert_eq!(alert.summary, "Interface flapped. CPU spiked to 95 percent causing packet loss.");
    assert_eq!(alert.analysis.summary, "RAG-backed summary of the outage.");
    assert_eq!(alert.analysis.root_causes, vec!["Faulty optic on Gi0/1"]);
    assert_eq!(alert.analysis.business_impact, "Checkout unavailable in EU");
    assert_eq!(
        alert.analysis.recommended_actions,
        vec!["Replace optic", "Enable dampening"]
    );
}

#[test]
fn legacy_fields_win_over_heuristics() {
    let alert = normalizer().normalize_value(json!({
        "summary": "Interface flapped. CPU spiked to 95 percent causing packet loss.",
        "root_cause": "Duplex mismatch on uplink",
        "business_impact": "Branch office offline",
        "recommended_actions": ["Hard-set duplex"]
    }));
    assert_eq!(alert.analysis.root_causes, vec!["Duplex mismatch on uplink"]);
    assert_eq!(alert.analysis.business_impact, "Branch office offline");
    assert_eq!(alert.analysis.recommended_actions, vec!["Hard-set duplex"]);
}

#[test]
fn heuristics_apply_to_summary_without_structured_fields() {
    let alert = normalizer().normalize_value(json!({
        "severity": "HIGH",
        "summary": "Interface flapped. CPU spiked to 95 percent causing packet loss."
    }));
    assert_eq!(
        alert.analysis.root_causes,
        vec![
            "Interface flapped",
            "CPU spiked to 95 percent causing packet loss"
        ]
    );
    assert_eq!(
        alert.analysis.business_impact,
        "High impact — CPU spiked to 95 percent causing packet loss"
    );
    assert_eq!(
        alert.analysis.recommended_actions,
        vec![
            "Interface flapped",
            "CPU spiked to 95 percent causing packet loss"
        ]
    );
}

#[test]
fn timestamps_and_history_use_the_injected_clock() {
    let alert = normalizer().normalize_value(json!({
        "timestamp": "2026-03-10T11:15:00Z",
        "history": [
            {
                "timestamp": "2026-03-08T12:00:00Z",
                "description": "Same link flapped",
                "status": "resolved"
            },
            "Operator note",
            42
        ]
    }));
    assert_eq!(alert.timestamp.absolute, "2026-03-10T11:15:00Z");
    assert_eq!(alert.timestamp.relative, "45 min ago");
    assert_eq!(alert.history.len(), 2);
    assert_eq!(alert.history[0].timestamp.relative, "2 days ago");
    assert_eq!(alert.history[0].summary, "Same link flapped");
    assert_eq!(alert.history[0].status, AlertStatus::Resolved);
    assert_eq!(alert.history[1].summary, "Operator note");
    assert_eq!(alert.history[1].timestamp.absolute, "1970-01-01T00:00:00Z");
    assert_eq!(alert.history[1].status, AlertStatus::Open);
}

#[test]
fn history_entries_serialize_without_nulls() {
    let alert = normalizer().normalize_value(json!({
        "history": ["Operator note", {"status": "bogus"}, {}]
    }));
    let v = serde_json::to_value(&alert).expect("serialize");
    let history = v["history"].as_array().expect("history array");
    assert_eq!(history.len(), 3);
    for entry in history {
        let fields = entry.as_object().expect("entry object");
        assert!(fields.values().all(|f| !f.is_null()), "null field in {entry}");
        assert_eq!(entry["status"], "open");
    }
}

#[test]
fn severity_and_status_aliases() {
    let n = normalizer();
    let a = n.normalize_value(json!({"severity": "Warning", "status": "ack"}));
    assert_eq!(a.severity, Severity::Medium);
    assert_eq!(a.status, AlertStatus::Acknowledged);
    let b = n.normalize_value(json!({"severity": "sev0", "status": "???"}));
    assert_eq!(b.severity, Severity::Info);
    assert_eq!(b.status, AlertStatus::Open);
}

#[test]
fn normalization_is_idempotent() {
    let raw = json!({
        "id": 7,
        "severity": "low",
        "summary": "Fan speed degraded on chassis two. Temperature still within range.",
        "device": {"name": "dc1-srv-14"},
        "timestamp": "2026-03-09T12:00:00Z",
        "similar_events": 3
    });
    let n = normalizer();
    let first = n.normalize_value(raw.clone());
    let second = n.normalize_value(raw);
    assert_eq!(first, second);
    assert_eq!(first.id, "7");
    assert_eq!(first.similar_event_count, 3);
}

#[test]
fn similar_event_count_rounds_like_aggregates() {
    let n = normalizer();
    assert_eq!(n.normalize_value(json!({"similar_events": 2.6})).similar_event_count, 3);
    assert_eq!(n.normalize_value(json!({"similar_events": "4"})).similar_event_count, 4);
    assert_eq!(n.normalize_value(json!({"similar_events": -2})).similar_event_count, 0);
}

#[test]
fn serializes_with_camel_case_contract() {
    let alert = normalizer().normalize_value(json!({"id": "x"}));
    let v = serde_json::to_value(&alert).expect("serialize");
    assert!(v.get("similarEventCount").is_some());
    assert!(v["analysis"].get("rootCauses").is_some());
    assert!(v["analysis"].get("recommendedActions").is_some());
    assert_eq!(v["severity"], "info");
    assert_eq!(v["status"], "open");
}
