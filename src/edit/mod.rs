// Surgical edit engine
//
// Applies one targeted change (delete or replace one span) to an existing
// statement through a three-tier escalation: exact string surgery first,
// then fuzzy partial matching, and only as a last resort an LLM call whose
// proposed edit is validated against expected-change heuristics.

use crate::config::constants::{
    EDIT_TEMPERATURE, PARTIAL_MATCH_MIN_CHARS, PARTIAL_MATCH_MIN_COVERAGE,
};
use crate::errors::ProviderError;
use crate::parse::{parse_edit_result, EditParse};
use crate::pipeline::dispatch;
use crate::prompt::{build_edit_system_prompt, build_edit_user_prompt};
use crate::providers::{CompletionRequest, LlmProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Delete,
    Replace,
}

/// One edit attempt. Pure value type, no identity.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub current_text: String,
    pub highlighted_text: String,
    pub kind: EditKind,
    /// Required for `Replace`, ignored for `Delete`.
    pub replacement_text: Option<String>,
}

/// Result of an edit attempt. Exactly one variant holds per attempt:
/// a clean success, a mechanical success that needs human review, or an
/// abort with an actionable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { new_text: String },
    NeedsReview { new_text: String, reason: String },
    Aborted { reason: String },
}

/// Tunable change-validation thresholds.
///
/// The defaults are inherited heuristics with no empirical derivation;
/// they are fields rather than inline literals so they can be recalibrated.
#[derive(Debug, Clone, Copy)]
pub struct ValidationThresholds {
    /// Base character allowance on the length-delta check.
    pub length_tolerance_base: f64,
    /// Additional allowance per character of highlighted text.
    pub length_tolerance_ratio: f64,
    /// Minimum fraction of non-highlighted words that must survive.
    pub word_preservation_floor: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            length_tolerance_base: 5.0,
            length_tolerance_ratio: 0.3,
            word_preservation_floor: 0.9,
        }
    }
}

/// Per-tier result of the deterministic exact-match stage.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExactMatch {
    Applied(String),
    /// The highlighted text occurs more than once; do not guess.
    Ambiguous,
    NotFound,
}

/// The edit engine. Stateless apart from its thresholds.
#[derive(Debug, Clone, Default)]
pub struct EditEngine {
    thresholds: ValidationThresholds,
}

impl EditEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ValidationThresholds) -> Self {
        Self { thresholds }
    }

    /// Apply one edit, escalating through the tiers as needed.
    ///
    /// Only the LLM tier can fail with a `ProviderError`; the deterministic
    /// tiers always produce an outcome.
    pub async fn apply(
        &self,
        request: &EditRequest,
        provider: &dyn LlmProvider,
        model: &str,
    ) -> Result<EditOutcome, ProviderError> {
        if let Some(outcome) = self.apply_deterministic(request) {
            return Ok(outcome);
        }
        self.llm_delegate(request, provider, model).await
    }

    /// Run only the deterministic tiers. `None` means the edit needs the
    /// LLM tier (and therefore a resolved vendor client); callers can use
    /// this to skip credential resolution for edits that never dial out.
    pub fn apply_deterministic(&self, request: &EditRequest) -> Option<EditOutcome> {
        match try_exact(request) {
            ExactMatch::Applied(new_text) => {
                tracing::debug!("edit resolved at exact-match tier");
                Some(EditOutcome::Applied { new_text })
            }
            ExactMatch::Ambiguous => {
                tracing::debug!("highlighted text is ambiguous, escalating to LLM tier");
                None
            }
            ExactMatch::NotFound => {
                // Fuzzy matching only makes sense for deletes; a replace
                // with no matched anchor has nothing to splice around.
                if request.kind == EditKind::Delete {
                    if let Some((new_text, matched)) = try_partial(request) {
                        tracing::debug!(matched = %matched, "edit resolved at partial-match tier");
                        return Some(EditOutcome::NeedsReview {
                            new_text,
                            reason: format!(
                                "The exact highlighted text was not found. Removed the \
                                 closest match \"{matched}\" instead, please verify the result."
                            ),
                        });
                    }
                }
                tracing::debug!("no deterministic match, escalating to LLM tier");
                None
            }
        }
    }

    /// Last-resort tier: ask the model to perform the edit, then validate
    /// its proposed change.
    async fn llm_delegate(
        &self,
        request: &EditRequest,
        provider: &dyn LlmProvider,
        model: &str,
    ) -> Result<EditOutcome, ProviderError> {
        let completion = CompletionRequest::new(
            model,
            Some(build_edit_system_prompt()),
            build_edit_user_prompt(
                &request.current_text,
                &request.highlighted_text,
                match request.kind {
                    EditKind::Replace => request.replacement_text.as_deref(),
                    EditKind::Delete => None,
                },
            ),
        )
        .with_temperature(EDIT_TEMPERATURE);

        let raw = dispatch(provider, &completion).await?;

        let new_text = match parse_edit_result(&raw) {
            EditParse::Aborted { reason } => {
                return Ok(EditOutcome::Aborted {
                    reason: format!(
                        "Could not locate \"{}\": {reason} The text may have \
                         already been edited.",
                        request.highlighted_text
                    ),
                });
            }
            EditParse::Success { new_text } => new_text,
        };

        // A "successful" edit that changed nothing is a failure to find
        // the target, whatever the model claims.
        if collapse_whitespace(&new_text) == collapse_whitespace(&request.current_text) {
            return Ok(EditOutcome::Aborted {
                reason: format!(
                    "The model could not apply the change to \"{}\"; the text \
                     may have already been edited.",
                    request.highlighted_text
                ),
            });
        }

        // Validation failure downgrades to needs-review rather than
        // discarding the model's work: a plausible-but-unverified edit is
        // more useful to the user than nothing.
        match validate_change(request, &new_text, &self.thresholds) {
            Some(reason) => Ok(EditOutcome::NeedsReview { new_text, reason }),
            None => Ok(EditOutcome::Applied { new_text }),
        }
    }
}

/// Tier 1: literal search-and-splice, safe only for a unique occurrence.
fn try_exact(request: &EditRequest) -> ExactMatch {
    let current = &request.current_text;
    let target = &request.highlighted_text;

    if target.is_empty() {
        return ExactMatch::NotFound;
    }

    match count_occurrences(current, target) {
        0 => ExactMatch::NotFound,
        1 => {
            let idx = current.find(target.as_str()).unwrap_or(0);
            ExactMatch::Applied(splice(current, idx, target.len(), request))
        }
        _ => ExactMatch::Ambiguous,
    }
}

/// Tier 2 (delete only): the user may have already edited part of the
/// highlighted span. Find the longest contiguous word window of the
/// highlighted text that still appears verbatim, trying windows from both
/// ends. Front-trimmed windows (the user deleted the start of the phrase)
/// are tried first, but only as a tie-break among equal-length windows.
///
/// Returns the spliced text and the matched document substring.
fn try_partial(request: &EditRequest) -> Option<(String, String)> {
    let current = &request.current_text;
    let highlighted = &request.highlighted_text;
    let words: Vec<&str> = highlighted.split_whitespace().collect();
    let n = words.len();
    if n == 0 {
        return None;
    }

    let current_lower = current.to_ascii_lowercase();
    let min_len = PARTIAL_MATCH_MIN_CHARS
        .max((highlighted.len() as f64 * PARTIAL_MATCH_MIN_COVERAGE).ceil() as usize);

    for window_len in (1..=n).rev() {
        let last_start = n - window_len;
        // Candidate order per window length: front-trimmed window first,
        // then back-trimmed, then interior windows.
        let mut starts: Vec<usize> = Vec::with_capacity(last_start + 1);
        starts.push(last_start);
        if last_start != 0 {
            starts.push(0);
        }
        starts.extend(1..last_start);

        for start in starts {
            let candidate = words[start..start + window_len].join(" ");
            if candidate.len() < min_len {
                continue;
            }

            let candidate_lower = candidate.to_ascii_lowercase();
            match count_occurrences(&current_lower, &candidate_lower) {
                0 => continue,
                1 => {
                    // Splice using the document's own casing.
                    let idx = current_lower.find(&candidate_lower)?;
                    let matched = current[idx..idx + candidate.len()].to_string();
                    let new_text = splice(current, idx, candidate.len(), request);
                    return Some((new_text, matched));
                }
                // The best qualifying window is ambiguous; do not gamble
                // on a shorter one.
                _ => return None,
            }
        }
    }

    None
}

/// Remove or replace `len` bytes at `idx` and collapse whitespace runs
/// around the splice.
fn splice(current: &str, idx: usize, len: usize, request: &EditRequest) -> String {
    let replacement = match request.kind {
        EditKind::Delete => "",
        EditKind::Replace => request.replacement_text.as_deref().unwrap_or(""),
    };
    let mut out = String::with_capacity(current.len() + replacement.len());
    out.push_str(&current[..idx]);
    out.push_str(replacement);
    out.push_str(&current[idx + len..]);
    collapse_whitespace(&out)
}

/// Collapse runs of whitespace to single spaces and trim the ends.
/// Statements are single paragraphs; internal newlines carry no meaning.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count occurrences including overlapping ones; an overlapping repeat is
/// just as ambiguous a splice target as a disjoint one.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let Some(first) = needle.chars().next() else {
        return 0;
    };
    let mut count = 0;
    let mut rest = haystack;
    while let Some(idx) = rest.find(needle) {
        count += 1;
        rest = &rest[idx + first.len_utf8()..];
    }
    count
}

/// Heuristic validation of an LLM-proposed edit. Returns the first failed
/// check's reason, or `None` when the change looks consistent with the
/// request.
fn validate_change(
    request: &EditRequest,
    new_text: &str,
    thresholds: &ValidationThresholds,
) -> Option<String> {
    let highlighted_len = request.highlighted_text.len() as f64;
    let expected_delta = match request.kind {
        EditKind::Delete => -highlighted_len,
        EditKind::Replace => {
            request.replacement_text.as_deref().unwrap_or("").len() as f64 - highlighted_len
        }
    };
    let actual_delta = new_text.len() as f64 - request.current_text.len() as f64;
    let tolerance =
        thresholds.length_tolerance_base + thresholds.length_tolerance_ratio * highlighted_len;

    if (actual_delta - expected_delta).abs() > tolerance {
        return Some(format!(
            "The edited text changed length by {actual_delta:+.0} characters where \
             roughly {expected_delta:+.0} was expected, please review the result."
        ));
    }

    if request.kind == EditKind::Replace {
        if let Some(replacement) = request
            .replacement_text
            .as_deref()
            .filter(|r| !r.is_empty())
        {
            if !new_text.contains(replacement) {
                return Some(format!(
                    "The requested replacement \"{replacement}\" does not appear in \
                     the edited text, please review the result."
                ));
            }
        }
    }

    // Bag-of-words containment: words outside the highlighted span should
    // survive the edit. Catches wholesale rewrites, not reordering.
    let highlighted_words: std::collections::HashSet<&str> =
        request.highlighted_text.split_whitespace().collect();
    let new_words: std::collections::HashSet<&str> = new_text.split_whitespace().collect();
    let preserved: Vec<&str> = request
        .current_text
        .split_whitespace()
        .filter(|word| !highlighted_words.contains(word))
        .collect();

    if !preserved.is_empty() {
        let surviving = preserved
            .iter()
            .filter(|word| new_words.contains(**word))
            .count();
        let fraction = surviving as f64 / preserved.len() as f64;
        if fraction < thresholds.word_preservation_floor {
            return Some(format!(
                "Only {:.0}% of the surrounding text survived the edit, the model \
                 may have rewritten more than requested.",
                fraction * 100.0
            ));
        }
    }

    None
}
