//! Query endpoint with canonical citations

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResult};

/// POST /api/query - Answer a question about an event
pub async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResult>> {
    let mut pipeline = state.pipeline().await;

    let result = pipeline
        .answer(&request.question, request.event_id.as_deref())
        .await;
    // An explicit event id becomes the selection even when answering fails
    state.sync_selected_event(&pipeline);

    let result = result.inspect_err(|e| tracing::warn!("Query failed: {}", e))?;
    Ok(Json(result))
}
