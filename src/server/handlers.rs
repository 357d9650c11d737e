// HTTP handlers for the statement API

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::stores::{CredentialStore, StyleStore};
use crate::config::Config;
use crate::edit::{EditEngine, EditKind, EditOutcome, EditRequest};
use crate::errors::{CredentialError, PipelineError, ProviderError};
use crate::pipeline::{
    convert_sentence_count, generate_statements, Accomplishment, CategoryStatements,
    GenerationMode, GenerationRequest,
};
use crate::providers::resolve;

/// Shared state for all handlers.
pub struct AppState {
    pub config: Config,
    pub credentials: Arc<dyn CredentialStore>,
    pub styles: Arc<dyn StyleStore>,
    pub edit_engine: EditEngine,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/statements/generate", post(handle_generate))
        .route("/api/statements/edit", post(handle_edit))
        .route("/api/statements/convert", post(handle_convert))
        .with_state(state)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// Generation
// ============================================================================

fn default_sentences() -> u8 {
    2
}

fn default_versions() -> usize {
    3
}

fn default_groups() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHttpRequest {
    /// Model identifier; absent means the configured default.
    pub model: Option<String>,
    /// "accomplishments", "customContext", or "revision".
    pub mode: String,
    pub rank: String,
    #[serde(default = "default_sentences")]
    pub sentences_per_statement: u8,
    #[serde(default = "default_versions")]
    pub versions_per_statement: usize,
    #[serde(default = "default_groups")]
    pub statements_per_entry: usize,
    #[serde(default)]
    pub combine_entries: bool,
    #[serde(default)]
    pub accomplishments: Vec<Accomplishment>,
    pub custom_context: Option<String>,
    pub existing_statement: Option<String>,
    pub revision_intensity: Option<u8>,
    pub award_level: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateHttpResponse {
    pub statements: Vec<CategoryStatements>,
}

impl GenerateHttpRequest {
    /// Resolve the wire-level mode string plus its companion fields into
    /// a pipeline mode; the error is a user-facing message.
    fn generation_mode(&self) -> Result<GenerationMode, String> {
        match self.mode.as_str() {
            "accomplishments" => {
                if self.accomplishments.is_empty() {
                    return Err("mode \"accomplishments\" requires at least one \
                                accomplishment"
                        .to_string());
                }
                Ok(GenerationMode::Accomplishments {
                    combine_entries: self.combine_entries,
                })
            }
            "customContext" => match self.custom_context.as_deref() {
                Some(context) if !context.trim().is_empty() => {
                    Ok(GenerationMode::CustomContext {
                        context: context.to_string(),
                    })
                }
                _ => Err("mode \"customContext\" requires a non-empty customContext".to_string()),
            },
            "revision" => match self.existing_statement.as_deref() {
                Some(statement) if !statement.trim().is_empty() => Ok(GenerationMode::Revision {
                    statement: statement.to_string(),
                    intensity: self.revision_intensity.unwrap_or(50).min(100),
                }),
                _ => Err("mode \"revision\" requires a non-empty existingStatement".to_string()),
            },
            other => Err(format!(
                "unknown mode \"{other}\"; expected \"accomplishments\", \
                 \"customContext\", or \"revision\""
            )),
        }
    }
}

pub async fn handle_generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerateHttpRequest>,
) -> Response {
    let user_id = user_id_from(&headers);
    let mode = match body.generation_mode() {
        Ok(mode) => mode,
        Err(message) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, &message),
    };

    let user = state.credentials.credentials_for(user_id.as_deref()).await;
    let style = state.styles.style_for(user_id.as_deref()).await;

    let request = GenerationRequest {
        model: body
            .model
            .unwrap_or_else(|| state.config.default_model.clone()),
        mode,
        rank: body.rank,
        sentences_per_statement: body.sentences_per_statement,
        versions_per_statement: body.versions_per_statement,
        statements_per_entry: body.statements_per_entry,
        accomplishments: body.accomplishments,
        award_level: body.award_level,
        period: body.period,
    };

    match generate_statements(&request, &style, &user, &state.config.vendors).await {
        Ok(statements) => Json(GenerateHttpResponse { statements }).into_response(),
        Err(e) => pipeline_error_response(e),
    }
}

// ============================================================================
// Surgical edits
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHttpRequest {
    pub current_text: String,
    pub highlighted_text: String,
    /// "delete" or "replace".
    pub suggestion_type: String,
    pub replacement_text: Option<String>,
    /// Model for the LLM fallback tier; absent means the configured default.
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHttpResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<EditOutcome> for EditHttpResponse {
    fn from(outcome: EditOutcome) -> Self {
        match outcome {
            EditOutcome::Applied { new_text } => Self {
                success: true,
                new_text: Some(new_text),
                needs_review: None,
                review_reason: None,
                aborted: None,
                reason: None,
            },
            EditOutcome::NeedsReview { new_text, reason } => Self {
                success: true,
                new_text: Some(new_text),
                needs_review: Some(true),
                review_reason: Some(reason),
                aborted: None,
                reason: None,
            },
            EditOutcome::Aborted { reason } => Self {
                success: false,
                new_text: None,
                needs_review: None,
                review_reason: None,
                aborted: Some(true),
                reason: Some(reason),
            },
        }
    }
}

pub async fn handle_edit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<EditHttpRequest>,
) -> Response {
    let kind = match body.suggestion_type.as_str() {
        "delete" => EditKind::Delete,
        "replace" => EditKind::Replace,
        other => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                &format!("unknown suggestionType \"{other}\"; expected \"delete\" or \"replace\""),
            )
        }
    };
    if kind == EditKind::Replace
        && body
            .replacement_text
            .as_deref()
            .map_or(true, |r| r.is_empty())
    {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "suggestionType \"replace\" requires a non-empty replacementText",
        );
    }

    let request = EditRequest {
        current_text: body.current_text,
        highlighted_text: body.highlighted_text,
        kind,
        replacement_text: body.replacement_text,
    };

    // The deterministic tiers need no vendor at all, so a user without any
    // API key can still make exact and partial-match edits.
    if let Some(outcome) = state.edit_engine.apply_deterministic(&request) {
        return Json(EditHttpResponse::from(outcome)).into_response();
    }

    let user_id = user_id_from(&headers);
    let user = state.credentials.credentials_for(user_id.as_deref()).await;
    let model = body
        .model
        .unwrap_or_else(|| state.config.default_model.clone());
    let resolution = match resolve(&model, &user, &state.config.vendors) {
        Ok(resolution) => resolution,
        Err(e) => return credential_error_response(e),
    };

    match state
        .edit_engine
        .apply(&request, resolution.provider.as_ref(), &resolution.model)
        .await
    {
        Ok(outcome) => Json(EditHttpResponse::from(outcome)).into_response(),
        Err(e) => provider_error_response(e),
    }
}

// ============================================================================
// Sentence-count conversion
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertHttpRequest {
    pub statement: String,
    pub target_sentences: u8,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertHttpResponse {
    pub versions: Vec<String>,
}

pub async fn handle_convert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ConvertHttpRequest>,
) -> Response {
    if body.statement.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "statement must not be empty",
        );
    }

    let user_id = user_id_from(&headers);
    let user = state.credentials.credentials_for(user_id.as_deref()).await;
    let model = body
        .model
        .unwrap_or_else(|| state.config.default_model.clone());

    match convert_sentence_count(
        &body.statement,
        body.target_sentences,
        &model,
        &user,
        &state.config.vendors,
    )
    .await
    {
        Ok(versions) => Json(ConvertHttpResponse { versions }).into_response(),
        Err(e) => pipeline_error_response(e),
    }
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn user_id_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn credential_error_response(e: CredentialError) -> Response {
    error_response(StatusCode::BAD_REQUEST, &e.to_string())
}

fn provider_error_response(e: ProviderError) -> Response {
    let status = match e {
        ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, &e.to_string())
}

fn pipeline_error_response(e: PipelineError) -> Response {
    match e {
        PipelineError::Credential(e) => credential_error_response(e),
        PipelineError::Provider(e) => provider_error_response(e),
    }
}
