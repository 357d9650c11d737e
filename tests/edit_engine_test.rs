// End-to-end tests for the surgical edit tiers, with a scripted provider
// standing in for the LLM fallback.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use citewright::edit::{EditEngine, EditKind, EditOutcome, EditRequest};
use citewright::errors::ProviderError;
use citewright::providers::{CompletionRequest, LlmProvider};

/// Returns a canned response and counts how often it was consulted.
struct ScriptedProvider {
    response: String,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

fn delete(current: &str, highlighted: &str) -> EditRequest {
    EditRequest {
        current_text: current.to_string(),
        highlighted_text: highlighted.to_string(),
        kind: EditKind::Delete,
        replacement_text: None,
    }
}

fn replace(current: &str, highlighted: &str, replacement: &str) -> EditRequest {
    EditRequest {
        current_text: current.to_string(),
        highlighted_text: highlighted.to_string(),
        kind: EditKind::Replace,
        replacement_text: Some(replacement.to_string()),
    }
}

#[tokio::test]
async fn exact_match_never_consults_the_model() {
    let provider = ScriptedProvider::new("should not be used");
    let engine = EditEngine::new();

    let request = replace(
        "- Led 12 Airmen through the 2024 readiness inspection. Earned the top rating.",
        "2024",
        "2025",
    );
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        EditOutcome::Applied {
            new_text: "- Led 12 Airmen through the 2025 readiness inspection. \
                       Earned the top rating."
                .to_string()
        }
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn partial_match_delete_needs_review() {
    let provider = ScriptedProvider::new("should not be used");
    let engine = EditEngine::new();

    // The user already trimmed "expertly" off the end of the highlighted
    // span, so only a partial window still matches.
    let request = delete(
        "Trained 40 Airmen across the squadron.",
        "Trained 40 Airmen expertly",
    );
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    match outcome {
        EditOutcome::NeedsReview { new_text, reason } => {
            assert_eq!(new_text, "across the squadron.");
            assert!(reason.contains("Trained 40 Airmen"));
        }
        other => panic!("expected NeedsReview, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn ambiguous_highlight_escalates_to_model() {
    let provider = ScriptedProvider::new(
        r#"{"success": true, "newText": "We briefed the team and led the team."}"#,
    );
    let engine = EditEngine::new();

    // "led the team" appears twice; the deterministic tiers must not guess.
    let request = replace(
        "We led the team and led the team.",
        "led the team",
        "briefed the team",
    );
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 1);
    assert_eq!(
        outcome,
        EditOutcome::Applied {
            new_text: "We briefed the team and led the team.".to_string()
        }
    );
}

#[tokio::test]
async fn model_abort_reports_reason() {
    let provider =
        ScriptedProvider::new(r#"{"success": false, "aborted": true, "reason": "Text not found."}"#);
    let engine = EditEngine::new();

    let request = delete("Completely unrelated sentence.", "phrase that is long gone");
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    match outcome {
        EditOutcome::Aborted { reason } => {
            assert!(reason.contains("phrase that is long gone"));
            assert!(reason.contains("Text not found."));
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
}

#[tokio::test]
async fn unchanged_model_output_aborts() {
    // The model claims success but returns the input verbatim (modulo
    // whitespace); that is a failure to locate the target.
    let provider = ScriptedProvider::new(
        r#"{"success": true, "newText": "Completely  unrelated sentence."}"#,
    );
    let engine = EditEngine::new();

    let request = delete("Completely unrelated sentence.", "missing fragment here");
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    match outcome {
        EditOutcome::Aborted { reason } => {
            assert!(reason.contains("already been edited"));
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
}

#[tokio::test]
async fn overreaching_rewrite_is_flagged_for_review() {
    // Asked to replace one word, the model rewrote the whole statement.
    let provider = ScriptedProvider::new(
        r#"{"success": true, "newText": "A fresh sentence sharing zero phrasing, reworded."}"#,
    );
    let engine = EditEngine::new();

    let request = replace(
        "Managed the flight schedule for three squadrons this cycle period.",
        "flite schedule",
        "flight plan",
    );
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    match outcome {
        EditOutcome::NeedsReview { reason, .. } => {
            assert!(reason.contains("review") || reason.contains("survived"));
        }
        other => panic!("expected NeedsReview, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_model_output_aborts() {
    // Plain prose instead of the JSON contract aborts with a readable
    // reason; nothing panics and nothing gets applied.
    let provider = ScriptedProvider::new("Sure! Here is the edited text you asked for.");
    let engine = EditEngine::new();

    let request = delete(
        "Managed the flight schedule for three squadrons.",
        "for three sqdns",
    );
    let outcome = engine
        .apply(&request, &provider, "scripted-model")
        .await
        .unwrap();

    match outcome {
        EditOutcome::Aborted { reason } => {
            assert!(reason.contains("for three sqdns"));
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_model_call_surfaces_as_timeout() {
    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
            tokio::time::sleep(std::time::Duration::from_secs(120)).await;
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "stalled"
        }

        fn default_model(&self) -> &str {
            "stalled-model"
        }
    }

    let engine = EditEngine::new();
    // Ambiguous on purpose, so the engine escalates to the model tier.
    let request = delete("the team and the squad", "the");
    let err = engine
        .apply(&request, &StalledProvider, "stalled-model")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Timeout { .. }));
}
