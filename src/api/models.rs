//! Request and response bodies for the trigger API.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template::{EventTemplate, TriggerParameters};

/// Request to generate one mock event
#[derive(Debug, Deserialize)]
pub struct TriggerEventRequest {
    /// Trigger type, e.g. "channel.follow"
    pub trigger_type: String,

    /// Transport the event should be shaped for
    pub transport: String,

    /// Template version; empty requests auto-selection of a sole version
    #[serde(default)]
    pub version: String,

    /// Event id (optional, defaults to a fresh UUID)
    pub event_id: Option<String>,

    /// Subscription status (optional, defaults to "enabled")
    pub status: Option<String>,

    /// Event timestamp, RFC 3339 (optional, defaults to now)
    pub timestamp: Option<String>,

    /// Subscription cost (optional, defaults to 0)
    pub cost: Option<i64>,

    /// Target user id (optional)
    pub to_user: Option<String>,
}

impl TriggerEventRequest {
    /// Fill unset parameters with generated defaults
    pub fn into_parameters(self) -> TriggerParameters {
        TriggerParameters {
            event_id: self
                .event_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            subscription_status: self.status.unwrap_or_else(|| "enabled".to_string()),
            timestamp: self
                .timestamp
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            cost: self.cost.unwrap_or(0),
            to_user: self.to_user.unwrap_or_default(),
            transport: self.transport,
        }
    }
}

/// One registered event type in the listing
#[derive(Debug, Serialize)]
pub struct EventTypeSummary {
    #[serde(rename = "type")]
    pub event_type: String,
    pub version: String,
    pub supported_transports: Vec<String>,
}

impl From<&EventTemplate> for EventTypeSummary {
    fn from(template: &EventTemplate) -> Self {
        Self {
            event_type: template.metadata.event_type.clone(),
            version: template.metadata.version.clone(),
            supported_transports: template.metadata.supported_transports.clone(),
        }
    }
}

/// Response for listing event types
#[derive(Debug, Serialize)]
pub struct EventTypeListResponse {
    pub event_types: Vec<EventTypeSummary>,
    pub total: usize,
}
