use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::trigger::{list_event_types, trigger_event};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        // Mock event endpoints
        .nest(
            "/api/v1",
            Router::new()
                .route("/event-types", get(list_event_types))
                .route("/events/trigger", post(trigger_event)),
        )
}
