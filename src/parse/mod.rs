// Tolerant parsing of LLM responses
//
// Models are instructed to emit JSON but are not guaranteed to emit only
// JSON: preambles ("Here are your statements:"), epilogues, and malformed
// output are all expected. Nothing in this module returns an error past its
// boundary; callers always get a well-typed (possibly empty) result.

use serde::Deserialize;
use serde_json::Value;

use crate::config::constants::MIN_CANDIDATE_LINE_LEN;

/// Locate the first top-level bracketed or braced JSON span in raw text.
///
/// Greedy scan: from the first `[` or `{` to the last closer of the same
/// kind. This is the one place "find the embedded JSON" logic lives; every
/// response-parsing call site goes through it.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let array_start = raw.find('[');
    let object_start = raw.find('{');

    let (start, closer) = match (array_start, object_start) {
        (Some(a), Some(o)) if a < o => (a, ']'),
        (Some(_), Some(o)) => (o, '}'),
        (Some(a), None) => (a, ']'),
        (None, Some(o)) => (o, '}'),
        (None, None) => return None,
    };

    let end = raw.rfind(closer)?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Extract candidate statement groups from raw LLM output.
///
/// Primary: parse the embedded JSON span. Accepts both "array of arrays"
/// (multiple statement groups, each with multiple phrasing versions) and
/// "flat array" (one version per statement), normalizing to the former.
/// Secondary: when JSON yields nothing, treat each sufficiently long line
/// of the raw text as a one-version candidate.
pub fn parse_statement_array(raw: &str, expected_groups: usize) -> Vec<Vec<String>> {
    let mut groups = extract_json_span(raw)
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .map(normalize_groups)
        .unwrap_or_default();

    if groups.is_empty() {
        groups = line_fallback(raw);
        if !groups.is_empty() {
            tracing::debug!(
                candidates = groups.len(),
                "JSON parse yielded nothing, used line fallback"
            );
        }
    }

    if !groups.is_empty() && groups.len() != expected_groups {
        tracing::debug!(
            expected = expected_groups,
            got = groups.len(),
            "model returned unexpected statement group count"
        );
    }

    groups
}

/// Normalize a parsed JSON value into statement groups.
fn normalize_groups(value: Value) -> Vec<Vec<String>> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut flat: Vec<String> = Vec::new();

    for item in items {
        match item {
            // Array-of-arrays shape: one group with several versions.
            Value::Array(versions) => {
                let strings: Vec<String> = versions
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) if !s.trim().is_empty() => Some(s),
                        _ => None,
                    })
                    .collect();
                if !strings.is_empty() {
                    groups.push(strings);
                }
            }
            // Flat shape: each string becomes its own single-version group.
            Value::String(s) if !s.trim().is_empty() => flat.push(s),
            _ => {}
        }
    }

    if groups.is_empty() {
        flat.into_iter().map(|s| vec![s]).collect()
    } else {
        groups
    }
}

/// Fallback when no JSON could be parsed: keep lines long enough to be
/// plausible statements, discarding short label/filler lines.
fn line_fallback(raw: &str) -> Vec<Vec<String>> {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.len() >= MIN_CANDIDATE_LINE_LEN)
        .map(|line| vec![line.to_string()])
        .collect()
}

/// Parsed result of an LLM surgical-edit response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditParse {
    Success { new_text: String },
    Aborted { reason: String },
}

#[derive(Debug, Deserialize)]
struct EditWire {
    #[serde(default)]
    success: bool,
    #[serde(rename = "newText")]
    new_text: Option<String>,
    #[serde(default)]
    aborted: bool,
    reason: Option<String>,
}

/// Parse the strict JSON contract of the surgical-edit LLM tier.
///
/// Any deviation from the contract (no JSON, wrong shape, success without
/// text) becomes an aborted result with a readable reason; the parse never
/// fails upward.
pub fn parse_edit_result(raw: &str) -> EditParse {
    let wire = extract_json_span(raw)
        .and_then(|span| serde_json::from_str::<EditWire>(span).ok());

    match wire {
        Some(EditWire {
            success: true,
            new_text: Some(text),
            ..
        }) => EditParse::Success { new_text: text },
        Some(EditWire { reason, aborted, .. }) => EditParse::Aborted {
            reason: reason.unwrap_or_else(|| {
                if aborted {
                    "The model could not locate the target text.".to_string()
                } else {
                    "The model reported success but returned no edited text.".to_string()
                }
            }),
        },
        None => EditParse::Aborted {
            reason: "The model response contained no parseable edit result.".to_string(),
        },
    }
}
