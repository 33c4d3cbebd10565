use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::ws;
use super::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_handler))
        .route(
            "/update_chat_model_toggle",
            post(handlers::update_chat_model_toggle),
        )
        .route(
            "/update_embedding_model_toggle",
            post(handlers::update_embedding_model_toggle),
        )
        .route("/create_embedding", post(handlers::create_embedding))
        .route("/data_reformatting", post(handlers::data_reformatting))
        .route("/metadata_tag", post(handlers::metadata_tag))
        .route("/pii_masking", post(handlers::pii_masking))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
