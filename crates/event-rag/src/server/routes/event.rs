//! Event selection endpoints

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::EventSelection;

/// GET /api/event - Currently selected event
pub async fn get_event(State(state): State<AppState>) -> Json<EventSelection> {
    Json(EventSelection {
        event_id: state.selected_event(),
    })
}

/// PUT /api/event - Select an event, dropping the cached corpus on change
pub async fn select_event(
    State(state): State<AppState>,
    Json(request): Json<EventSelection>,
) -> Json<EventSelection> {
    let mut pipeline = state.pipeline().await;
    pipeline.select_event(request.event_id.as_deref());
    state.sync_selected_event(&pipeline);

    Json(EventSelection {
        event_id: pipeline.selected_event().map(str::to_string),
    })
}
