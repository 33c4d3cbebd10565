use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskdeskError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector search error: {0}")]
    Search(String),

    #[error("Context assembly error: {0}")]
    Context(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AskdeskError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AskdeskError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AskdeskError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AskdeskError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AskdeskError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AskdeskError::Search(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AskdeskError::Context(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AskdeskError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AskdeskError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AskdeskError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AskdeskError::ApiRateLimit { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AskdeskError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AskdeskError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AskdeskError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            AskdeskError::ChannelClosed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AskdeskError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AskdeskError>;
