//! API routes for the event server

pub mod event;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Event selection
        .route("/event", get(event::get_event).put(event::select_event))
        // Query
        .route("/query", post(query::answer_query))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "event-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over disaster-event corpora with cited sources",
        "models": {
            "embedding": config.llm.embed_model,
            "generation": config.llm.generate_model,
        },
        "top_k": config.retrieval.top_k,
        "endpoints": {
            "GET /api/event": "Currently selected event",
            "PUT /api/event": "Select an event (null clears the selection)",
            "POST /api/query": "Answer a question with canonical citations",
            "GET /api/info": "This document",
            "GET /ready": "Embedding and generation backends reachable"
        }
    }))
}
