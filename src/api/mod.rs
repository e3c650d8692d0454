//! API layer - HTTP endpoint handlers.

mod health;
mod models;
mod routes;
mod trigger;

pub use health::health;
pub use models::{EventTypeListResponse, EventTypeSummary, TriggerEventRequest};
pub use routes::api_routes;
pub use trigger::{list_event_types, trigger_event};
