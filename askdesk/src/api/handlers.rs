use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AskdeskError, Result};
use crate::models::EmbeddingBackend;
use crate::processing::data_reformat;

use super::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct ChatModelToggle {
    pub value: String,
}

/// `POST /update_chat_model_toggle`
///
/// Switches the active chat model. The value must name one of the two
/// configured models; subsequent turns pick it up, in-flight turns keep the
/// selection they snapshotted.
pub async fn update_chat_model_toggle(
    State(state): State<AppState>,
    Json(toggle): Json<ChatModelToggle>,
) -> Result<Json<Value>> {
    let known = toggle.value == state.config.llm.primary_model
        || toggle.value == state.config.llm.secondary_model;
    if !known {
        return Err(AskdeskError::Validation(format!(
            "Unknown chat model: {}",
            toggle.value
        )));
    }

    let mut selection = state.selection.write().await;
    selection.chat_model = toggle.value.clone();
    tracing::info!(chat_model = %toggle.value, "Chat model toggled");

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingModelToggle {
    #[serde(rename = "selectedModel")]
    pub selected_model: String,
}

/// `POST /update_embedding_model_toggle`
///
/// Switches the active embedding backend, which also switches the index
/// field subsequent searches target.
pub async fn update_embedding_model_toggle(
    State(state): State<AppState>,
    Json(toggle): Json<EmbeddingModelToggle>,
) -> Result<Json<Value>> {
    let backend: EmbeddingBackend = toggle
        .selected_model
        .parse()
        .map_err(AskdeskError::Validation)?;

    let mut selection = state.selection.write().await;
    selection.embedding_backend = backend;
    tracing::info!(backend = %backend, "Embedding backend toggled");

    Ok(Json(json!({ "success": true })))
}

/// `POST /create_embedding`
///
/// Embeds one string with both backends; ingestion tooling uses the pair to
/// populate both index vector fields.
pub async fn create_embedding(
    State(state): State<AppState>,
    Json(text): Json<String>,
) -> Result<Json<Value>> {
    if text.trim().is_empty() {
        return Err(AskdeskError::Validation(
            "Embedding input cannot be empty".to_string(),
        ));
    }

    let (openai, huggingface) = state.embeddings.embed_with_both(&text).await?;
    Ok(Json(json!([openai, huggingface])))
}

/// `POST /data_reformatting`
pub async fn data_reformatting(Json(record): Json<Value>) -> Json<Value> {
    Json(data_reformat(record))
}

/// `POST /metadata_tag`
pub async fn metadata_tag(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>> {
    let label = state.tagger.tag(&input).await?;
    Ok(Json(json!(label)))
}

/// `POST /pii_masking`
pub async fn pii_masking(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>> {
    let masked = state.pii.mask(&input).await?;
    Ok(Json(masked))
}
