//! Router-level tests for the HTTP endpoints, driven through `tower`'s
//! `oneshot` without binding a socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use askdesk::api::{create_router, AppState};
use askdesk::config::{
    Config, DatabaseConfig, EmbeddingsConfig, LlmConfig, RemoteEmbeddingConfig, SearchConfig,
    ServerConfig,
};
use askdesk::db::{Database, LibSqlTranscripts};
use askdesk::embeddings::EmbeddingProvider;
use askdesk::error::Result;
use askdesk::llm::LlmProvider;
use askdesk::models::{EmbeddingBackend, KnnRequest, SearchHit};
use askdesk::search::{MissingFieldPolicy, VectorIndex};

struct NoopIndex;

#[async_trait]
impl VectorIndex for NoopIndex {
    async fn knn(&self, _request: &KnnRequest) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
        },
        search: SearchConfig {
            url: "http://localhost:6334".to_string(),
            collection: "products".to_string(),
            context_field: "assembled_for_embedding".to_string(),
            extra_fields: vec!["source".to_string()],
            result_limit: 13,
            num_candidates: 3,
            missing_field_policy: MissingFieldPolicy::Fail,
            ready_timeout_secs: 5,
        },
        embeddings: EmbeddingsConfig {
            openai: RemoteEmbeddingConfig {
                model: "text-embedding-ada-002".to_string(),
                api_key: None,
                base_url: "http://localhost:9".to_string(),
                timeout_secs: 1,
                max_retries: 0,
            },
            huggingface: RemoteEmbeddingConfig {
                model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
                api_key: None,
                base_url: "http://localhost:9".to_string(),
                timeout_secs: 1,
                max_retries: 0,
            },
            default_backend: EmbeddingBackend::OpenAi,
        },
        llm: LlmConfig {
            primary_model: "ollama/llama3".to_string(),
            secondary_model: "ollama/llama3.1".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 1,
            max_retries: 0,
            answer_temperature: 0.05,
            rewrite_cache_size: 16,
        },
    }
}

async fn test_app() -> Router {
    let config = test_config();
    let database = Database::new(&config.database).await.expect("database");
    let transcripts = Arc::new(LibSqlTranscripts::new(database));
    let embeddings = EmbeddingProvider::new(&config.embeddings).expect("embeddings");
    let llm = LlmProvider::new(&config.llm).expect("llm");

    create_router(AppState::new(
        config,
        embeddings,
        llm,
        Arc::new(NoopIndex),
        transcripts,
    ))
}

async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_chat_model_toggle_accepts_configured_model() {
    let app = test_app().await;

    let (status, body) = post_json(
        app,
        "/update_chat_model_toggle",
        json!({ "value": "ollama/llama3.1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_chat_model_toggle_rejects_unknown_model() {
    let app = test_app().await;

    let (status, body) = post_json(
        app,
        "/update_chat_model_toggle",
        json!({ "value": "openai/gpt-5" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unknown chat model"));
}

#[tokio::test]
async fn test_embedding_model_toggle() {
    let app = test_app().await;

    let (status, body) = post_json(
        app.clone(),
        "/update_embedding_model_toggle",
        json!({ "selectedModel": "huggingface" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = post_json(
        app,
        "/update_embedding_model_toggle",
        json!({ "selectedModel": "word2vec" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_data_reformatting_normalizes_record() {
    let app = test_app().await;

    let (status, body) = post_json(
        app,
        "/data_reformatting",
        json!({
            "last_update": 86400,
            "product_details": "  covers\nwater damage  "
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_update"], "1970/01/02 00:00:00");
    assert_eq!(body["product_details"], "covers water damage");
}

#[tokio::test]
async fn test_create_embedding_rejects_empty_input() {
    let app = test_app().await;

    let (status, body) = post_json(app, "/create_embedding", json!("   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_metadata_tag_rejects_invalid_input_shape() {
    let app = test_app().await;

    let (status, _) = post_json(app, "/metadata_tag", json!(42)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pii_masking_rejects_invalid_input_shape() {
    let app = test_app().await;

    let (status, _) = post_json(app, "/pii_masking", json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
