// Statement generation pipeline
//
// Ties the resolver, prompt assembler, dispatcher, and parser together:
// caller → prompts → vendor call → raw text → parsed statement groups.
// Each call is independent and stateless apart from reading (never
// writing) the user's style configuration and credentials.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::constants::{
    CONVERT_VERSION_COUNT, GENERATION_TEMPERATURE, REQUEST_TIMEOUT_SECS,
};
use crate::config::VendorKeys;
use crate::errors::{PipelineError, ProviderError};
use crate::parse::parse_statement_array;
use crate::prompt::{
    build_convert_prompt, build_system_prompt, build_user_prompt, PromptMode, PromptParams,
};
use crate::providers::{resolve, CompletionRequest, LlmProvider, UserCredentials};
use crate::style::StyleConfiguration;

/// One structured accomplishment record submitted by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accomplishment {
    pub id: String,
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
}

/// What the user asked the pipeline to do.
#[derive(Debug, Clone)]
pub enum GenerationMode {
    /// Structured accomplishment records, combined per category or one
    /// statement group per record.
    Accomplishments { combine_entries: bool },
    /// Unstructured prose to extract accomplishments from.
    CustomContext { context: String },
    /// Rewrite an existing statement at the given intensity (0–100).
    Revision { statement: String, intensity: u8 },
}

/// The parameters for one generation call. Immutable once constructed;
/// created per HTTP request and discarded after the response.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub mode: GenerationMode,
    pub rank: String,
    /// Sentences per statement (2 or 3).
    pub sentences_per_statement: u8,
    /// Distinct phrasings requested per statement group.
    pub versions_per_statement: usize,
    /// Statement groups requested per entry (or per combined category).
    pub statements_per_entry: usize,
    pub accomplishments: Vec<Accomplishment>,
    pub award_level: Option<String>,
    pub period: Option<String>,
}

/// One generated statement group: several phrasings of one statement,
/// plus the source records it derives from. In memory only; persistence
/// of a chosen version happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementGroup {
    pub id: String,
    pub versions: Vec<String>,
    #[serde(rename = "sourceAccomplishmentIds")]
    pub source_accomplishment_ids: Vec<String>,
}

/// All statement groups generated for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStatements {
    pub category: String,
    #[serde(rename = "statementGroups")]
    pub statement_groups: Vec<StatementGroup>,
}

/// Issue one completion under the wall-clock budget.
///
/// The budget is the only cancellation signal in the pipeline: a stalled
/// vendor call becomes a timeout error rather than hanging the handler.
/// Errors are terminal for the call; no retry happens here.
pub async fn dispatch(
    provider: &dyn LlmProvider,
    request: &CompletionRequest,
) -> Result<String, ProviderError> {
    match tokio::time::timeout(
        Duration::from_secs(REQUEST_TIMEOUT_SECS),
        provider.complete(request),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            vendor: provider.name().to_string(),
            budget_secs: REQUEST_TIMEOUT_SECS,
        }),
    }
}

/// Generate candidate statements for a request.
///
/// Categories are processed concurrently (the calls are independent), but
/// results keep the input's category order and a failure in one category
/// never aborts the rest: the failing category is logged and omitted from
/// the aggregate.
pub async fn generate_statements(
    request: &GenerationRequest,
    style: &StyleConfiguration,
    user: &UserCredentials,
    fallback: &VendorKeys,
) -> Result<Vec<CategoryStatements>, PipelineError> {
    let resolution = resolve(&request.model, user, fallback)?;
    let statements =
        generate_with_provider(resolution.provider.as_ref(), &resolution.model, request, style)
            .await?;
    Ok(statements)
}

/// Generation against an already-resolved vendor client. Split out from
/// [`generate_statements`] so tests can substitute a stub client.
pub async fn generate_with_provider(
    provider: &dyn LlmProvider,
    model: &str,
    request: &GenerationRequest,
    style: &StyleConfiguration,
) -> Result<Vec<CategoryStatements>, ProviderError> {
    let system_prompt = build_system_prompt(style, &request.rank);

    let params = PromptParams {
        sentences: request.sentences_per_statement,
        versions: request.versions_per_statement,
        groups: request.statements_per_entry,
        award_level: request.award_level.as_deref(),
        period: request.period.as_deref(),
    };

    match &request.mode {
        GenerationMode::Accomplishments { combine_entries } => {
            let categories = group_by_category(&request.accomplishments);
            let futures = categories.iter().map(|(category, records)| {
                generate_for_category(
                    provider,
                    model,
                    &system_prompt,
                    category,
                    records,
                    *combine_entries,
                    &params,
                )
            });

            // join_all preserves input order, so the aggregate keeps the
            // caller's category order regardless of completion order.
            let results = join_all(futures).await;
            Ok(results.into_iter().flatten().collect())
        }
        GenerationMode::CustomContext { context } => {
            let raw = dispatch(
                provider,
                &CompletionRequest::new(
                    model,
                    Some(system_prompt),
                    build_user_prompt(&PromptMode::CustomContext(context.as_str()), &params),
                )
                .with_temperature(GENERATION_TEMPERATURE),
            )
            .await?;
            Ok(vec![CategoryStatements {
                category: "custom".to_string(),
                statement_groups: groups_from_raw(&raw, params.groups, Vec::new()),
            }])
        }
        GenerationMode::Revision {
            statement,
            intensity,
        } => {
            let raw = dispatch(
                provider,
                &CompletionRequest::new(
                    model,
                    Some(system_prompt),
                    build_user_prompt(
                        &PromptMode::Revision {
                            statement: statement.as_str(),
                            intensity: *intensity,
                        },
                        &params,
                    ),
                )
                .with_temperature(GENERATION_TEMPERATURE),
            )
            .await?;
            Ok(vec![CategoryStatements {
                category: "revision".to_string(),
                statement_groups: groups_from_raw(&raw, 1, Vec::new()),
            }])
        }
    }
}

/// Generate statement groups for one category; partial failures are
/// isolated here so they never bubble past the category.
async fn generate_for_category(
    provider: &dyn LlmProvider,
    model: &str,
    system_prompt: &str,
    category: &str,
    records: &[&Accomplishment],
    combine_entries: bool,
    params: &PromptParams<'_>,
) -> Option<CategoryStatements> {
    let mut statement_groups = Vec::new();

    if combine_entries {
        let owned: Vec<Accomplishment> = records.iter().map(|r| (*r).clone()).collect();
        let source_ids: Vec<String> = owned.iter().map(|r| r.id.clone()).collect();
        match dispatch(
            provider,
            &CompletionRequest::new(
                model,
                Some(system_prompt.to_string()),
                build_user_prompt(&PromptMode::Combine(&owned), params),
            )
            .with_temperature(GENERATION_TEMPERATURE),
        )
        .await
        {
            Ok(raw) => statement_groups.extend(groups_from_raw(&raw, params.groups, source_ids)),
            Err(e) => {
                tracing::warn!(category, error = %e, "generation failed for category, omitting");
            }
        }
    } else {
        for record in records {
            match dispatch(
                provider,
                &CompletionRequest::new(
                    model,
                    Some(system_prompt.to_string()),
                    build_user_prompt(&PromptMode::PerEntry(*record), params),
                )
                .with_temperature(GENERATION_TEMPERATURE),
            )
            .await
            {
                Ok(raw) => statement_groups.extend(groups_from_raw(
                    &raw,
                    params.groups,
                    vec![record.id.clone()],
                )),
                Err(e) => {
                    tracing::warn!(
                        category,
                        accomplishment = %record.id,
                        error = %e,
                        "generation failed for entry, omitting"
                    );
                }
            }
        }
    }

    if statement_groups.is_empty() {
        None
    } else {
        Some(CategoryStatements {
            category: category.to_string(),
            statement_groups,
        })
    }
}

/// Rewrite one statement at a different sentence count.
///
/// Returns exactly `CONVERT_VERSION_COUNT` candidates when the model
/// cooperates; when parsing yields nothing usable, degrades to the
/// original statement unchanged (generation is better than failure here).
pub async fn convert_sentence_count(
    statement: &str,
    target_sentences: u8,
    model: &str,
    user: &UserCredentials,
    fallback: &VendorKeys,
) -> Result<Vec<String>, PipelineError> {
    let resolution = resolve(model, user, fallback)?;
    let versions = convert_with_provider(
        resolution.provider.as_ref(),
        &resolution.model,
        statement,
        target_sentences,
    )
    .await?;
    Ok(versions)
}

/// Sentence-count conversion against an already-resolved vendor client.
pub async fn convert_with_provider(
    provider: &dyn LlmProvider,
    model: &str,
    statement: &str,
    target_sentences: u8,
) -> Result<Vec<String>, ProviderError> {
    let raw = dispatch(
        provider,
        &CompletionRequest::new(
            model,
            None,
            build_convert_prompt(statement, target_sentences, CONVERT_VERSION_COUNT),
        )
        .with_temperature(GENERATION_TEMPERATURE),
    )
    .await?;

    let versions: Vec<String> = parse_statement_array(&raw, 1)
        .into_iter()
        .flatten()
        .take(CONVERT_VERSION_COUNT)
        .collect();

    if versions.is_empty() {
        tracing::warn!("sentence conversion produced no usable candidates, returning original");
        return Ok(vec![statement.to_string()]);
    }

    Ok(versions)
}

/// Group accomplishments by category, preserving first-seen order.
fn group_by_category(records: &[Accomplishment]) -> Vec<(String, Vec<&Accomplishment>)> {
    let mut categories: Vec<(String, Vec<&Accomplishment>)> = Vec::new();
    for record in records {
        match categories.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, entries)) => entries.push(record),
            None => categories.push((record.category.clone(), vec![record])),
        }
    }
    categories
}

fn groups_from_raw(
    raw: &str,
    expected_groups: usize,
    source_ids: Vec<String>,
) -> Vec<StatementGroup> {
    parse_statement_array(raw, expected_groups)
        .into_iter()
        .map(|versions| StatementGroup {
            id: Uuid::new_v4().to_string(),
            versions,
            source_accomplishment_ids: source_ids.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: &str) -> Accomplishment {
        Accomplishment {
            id: id.to_string(),
            category: category.to_string(),
            description: "did the thing".to_string(),
            impact: None,
            metrics: None,
        }
    }

    #[test]
    fn test_group_by_category_preserves_order() {
        let records = vec![
            record("a", "Leadership"),
            record("b", "Innovation"),
            record("c", "Leadership"),
        ];
        let categories = group_by_category(&records);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].0, "Leadership");
        assert_eq!(categories[0].1.len(), 2);
        assert_eq!(categories[1].0, "Innovation");
    }

    #[test]
    fn test_groups_from_raw_attaches_source_ids() {
        let groups = groups_from_raw(
            r#"[["- v1", "- v2"]]"#,
            1,
            vec!["a1".to_string(), "a2".to_string()],
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].versions.len(), 2);
        assert_eq!(groups[0].source_accomplishment_ids, vec!["a1", "a2"]);
        assert!(!groups[0].id.is_empty());
    }

    #[test]
    fn test_groups_from_raw_garbage_yields_empty() {
        assert!(groups_from_raw("total nonsense", 1, Vec::new()).is_empty());
    }
}
