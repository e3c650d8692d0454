//! Mock event generation endpoints.

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::AppState;
use crate::template::{generate_event_payload, EventPayload};

use super::models::{EventTypeListResponse, EventTypeSummary, TriggerEventRequest};

/// Generate a mock event payload for a trigger request
#[tracing::instrument(
    name = "http.trigger_event",
    skip(state, request),
    fields(
        trigger_type = %request.trigger_type,
        transport = %request.transport,
        version = %request.version,
    )
)]
pub async fn trigger_event(
    State(state): State<AppState>,
    Json(request): Json<TriggerEventRequest>,
) -> Result<Json<EventPayload>> {
    let template = state
        .registry
        .find(&request.trigger_type, &request.transport, &request.version)?;

    let params = request.into_parameters();
    let payload = generate_event_payload(&state.registry, template, &params)?;

    Ok(Json(payload))
}

/// List registered event types in registration order
#[tracing::instrument(name = "http.list_event_types", skip(state))]
pub async fn list_event_types(State(state): State<AppState>) -> Json<EventTypeListResponse> {
    let event_types: Vec<EventTypeSummary> = state
        .registry
        .events()
        .iter()
        .map(EventTypeSummary::from)
        .collect();
    let total = event_types.len();

    Json(EventTypeListResponse { event_types, total })
}
