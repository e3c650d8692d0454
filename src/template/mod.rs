//! Mock event template engine.
//!
//! This module provides:
//! - Typed template definitions parsed from YAML documents (event templates
//!   plus reusable reference fragments)
//! - An immutable registry with duplicate detection and trigger lookup
//! - A resolver that expands a template into a JSON payload using built-in
//!   substitution identifiers and declared defaults
//!
//! # Example
//!
//! ```ignore
//! let registry = load_registry(Path::new("templates/events"))?;
//!
//! let template = registry.find("channel.follow", "webhook", "1")?;
//!
//! let params = TriggerParameters {
//!     event_id: "abc-1".to_string(),
//!     subscription_status: "enabled".to_string(),
//!     timestamp: Utc::now().to_rfc3339(),
//!     cost: 1,
//!     to_user: "1337".to_string(),
//!     transport: "webhook".to_string(),
//! };
//!
//! let payload = generate_event_payload(&registry, template, &params)?;
//! ```

use std::path::PathBuf;

use thiserror::Error;

mod loader;
mod registry;
mod resolver;
mod types;

pub use loader::load_registry;
pub use registry::TemplateRegistry;
pub use resolver::generate_event_payload;
pub use types::{
    EventPayload, EventTemplate, FieldSpec, FieldType, ReferenceTemplate, TemplateMetadata,
    TriggerParameters,
};

/// Template-specific error type.
///
/// Load-phase variants abort the whole registry load; lookup and resolve
/// variants are returned to the caller as user-facing diagnostics.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Could not read template file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse template file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Template file '{}' requires `metadata.supported_transports`", path.display())]
    MissingTransports { path: PathBuf },

    #[error("Template file '{}' requires `metadata.type` and `metadata.version`", path.display())]
    MissingIdentity { path: PathBuf },

    #[error("Duplicate subscription type/version pair:\n - {}\n - {}", path.display(), existing.display())]
    DuplicateEvent { path: PathBuf, existing: PathBuf },

    #[error("Duplicate reference file:\n - {}\n - {}", path.display(), existing.display())]
    DuplicateReference { path: PathBuf, existing: PathBuf },

    #[error("Reference `{name}` names another reference in identifier `{identifier}` (in file '{}'); references only expand one level deep", path.display())]
    NestedReference {
        name: String,
        identifier: String,
        path: PathBuf,
    },

    #[error("Invalid transport. This event is not available via WebSockets.")]
    WebsocketUnsupported,

    #[error("Invalid transport. This event supports the following transport types: {supported}")]
    UnsupportedTransport { supported: String },

    #[error("Invalid version given. Valid version(s): {versions}{hint}")]
    InvalidVersion { versions: String, hint: String },

    #[error("Invalid event: no template matches trigger type `{trigger}`")]
    UnknownTrigger { trigger: String },

    #[error("Unexpected type `{field_type}` for identifier `{identifier}` (in file '{}')", path.display())]
    UnknownType {
        field_type: String,
        identifier: String,
        path: PathBuf,
    },

    #[error("Ref `{name}` must be matched with type `{required}`")]
    RefTypeMismatch { name: String, required: FieldType },

    #[error("In identifier `{identifier}`, `data` field must exist when `type` is set to `object` (in file '{}')", path.display())]
    MissingData { identifier: String, path: PathBuf },

    #[error("Could not convert `data` object for identifier `{identifier}`: {source}")]
    DataConversion {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown ref `{name}` on identifier `{identifier}`")]
    UnknownRef { name: String, identifier: String },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
