//! Deterministic text heuristics used when a record has no structured analysis.
//!
//! Sentence-boundary splitting plus length filtering plus static fallbacks. Thresholds and fallback
//! strings are part of the output contract.

use crate::domain::Severity;

pub const ROOT_CAUSE_MIN_CHARS: usize = 15;
pub const ROOT_CAUSE_LIMIT: usize = 3;
pub const ACTION_MIN_CHARS: usize = 15;
pub const ACTION_LIMIT: usize = 5;
pub const IMPACT_MIN_CHARS: usize = 10;

pub const ROOT_CAUSE_FALLBACK: &str = "Analysis pending - awaiting AI processing";
pub const ACTION_FALLBACK: &str = "Review the alert details and investigate the affected device";
pub const IMPACT_FALLBACK: &str = "Business impact assessment pending";

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']')
}

fn push_fragment(out: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}

/// Split on runs of `.`, `!` or `?` that are followed by whitespace or end of text.
///
/// Closing quotes and brackets directly after the run belong to the boundary. Punctuation inside
/// tokens (`95.5`, `10.0.0.1`) does not end a sentence. Returned fragments are trimmed and exclude
/// the terminating punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminal(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        while let Some(&(j, next)) = chars.peek() {
            if !is_closer(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            push_fragment(&mut out, &text[start..i]);
            start = end;
        }
    }
    push_fragment(&mut out, &text[start..]);
    out
}

fn sentences_at_least(text: &str, min_chars: usize) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| s.chars().count() >= min_chars)
        .collect()
}

/// Up to three summary sentences of at least 15 characters, in original order.
pub fn extract_root_causes(summary: &str) -> Vec<String> {
    let causes = sentences_at_least(summary, ROOT_CAUSE_MIN_CHARS)
        .into_iter()
        .take(ROOT_CAUSE_LIMIT)
        .collect::<Vec<_>>();
    if causes.is_empty() {
        vec![ROOT_CAUSE_FALLBACK.to_string()]
    } else {
        causes
    }
}

/// Up to five sentences of at least 15 characters.
///
/// When only one sentence qualifies the whole trimmed text is returned as the single action.
pub fn extract_recommended_actions(text: &str) -> Vec<String> {
    let actions = sentences_at_least(text, ACTION_MIN_CHARS);
    match actions.len() {
        0 => vec![ACTION_FALLBACK.to_string()],
        1 => vec![text.trim().to_string()],
        _ => actions.into_iter().take(ACTION_LIMIT).collect(),
    }
}

pub fn impact_prefix(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical impact — ",
        Severity::High => "High impact — ",
        Severity::Medium => "Moderate impact — ",
        Severity::Low => "Low impact — ",
        Severity::Info => "Informational — ",
    }
}

/// Severity-keyed phrase followed by the last summary sentence of at least 10 characters.
///
/// A summary with no qualifying sentence is used whole; a missing summary yields the static
/// fallback.
pub fn derive_business_impact(severity: Severity, summary: Option<&str>) -> String {
    let Some(summary) = summary.map(str::trim).filter(|s| !s.is_empty()) else {
        return IMPACT_FALLBACK.to_string();
    };
    let tail = sentences_at_least(summary, IMPACT_MIN_CHARS)
        .pop()
        .unwrap_or_else(|| summary.to_string());
    format!("{}{tail}", impact_prefix(severity))
}
