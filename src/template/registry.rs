//! Immutable template registry: registration with duplicate detection, and
//! trigger/transport/version lookup.

use std::collections::BTreeMap;

use super::types::{EventTemplate, FieldSpec, ReferenceTemplate};
use super::{TemplateError, TemplateResult};

/// Store of registered event templates and reference fragments.
///
/// Built once by the loader, then only read. Lookup and resolution take
/// `&self`, so a registry can be shared behind an `Arc` across request
/// handlers, and independent registries can coexist in tests.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    events: Vec<EventTemplate>,
    references: Vec<ReferenceTemplate>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event template.
    ///
    /// Fails if a template with the same `(type, version)` identity was
    /// already registered; the error carries both origin files, with the
    /// first-registered one as the existing side.
    pub fn register_event(&mut self, template: EventTemplate) -> TemplateResult<()> {
        if let Some(existing) = self.events.iter().find(|e| {
            e.metadata.event_type == template.metadata.event_type
                && e.metadata.version == template.metadata.version
        }) {
            return Err(TemplateError::DuplicateEvent {
                path: template.filepath,
                existing: existing.filepath.clone(),
            });
        }

        self.events.push(template);
        Ok(())
    }

    /// Register a reference fragment, failing on a duplicate name
    pub fn register_reference(&mut self, reference: ReferenceTemplate) -> TemplateResult<()> {
        if let Some(existing) = self.references.iter().find(|r| r.name == reference.name) {
            return Err(TemplateError::DuplicateReference {
                path: reference.filepath,
                existing: existing.filepath.clone(),
            });
        }

        self.references.push(reference);
        Ok(())
    }

    /// Select the event template for a `(trigger, transport, version)` tuple.
    ///
    /// Single linear pass in registration order. A type match with an
    /// unsupported transport fails immediately. The first exact version match
    /// wins. When the requested version is empty and exactly one version
    /// exists for the trigger, that version is selected as a convenience
    /// default; otherwise the error lists every valid version.
    pub fn find(
        &self,
        trigger_type: &str,
        transport: &str,
        version: &str,
    ) -> TemplateResult<&EventTemplate> {
        let mut valid_bad_versions: Vec<String> = Vec::new();
        let mut last_seen: Option<&EventTemplate> = None;

        for event in &self.events {
            if event.metadata.event_type != trigger_type {
                continue;
            }

            if !event
                .metadata
                .supported_transports
                .iter()
                .any(|t| t == transport)
            {
                if transport.eq_ignore_ascii_case("websocket") {
                    return Err(TemplateError::WebsocketUnsupported);
                }
                return Err(TemplateError::UnsupportedTransport {
                    supported: event.metadata.supported_transports.join(", "),
                });
            }

            if version == event.metadata.version {
                return Ok(event);
            }

            valid_bad_versions.push(event.metadata.version.clone());
            last_seen = Some(event);
        }

        // Sole registered version doubles as the default when none was asked for
        if version.is_empty() && valid_bad_versions.len() == 1 {
            if let Some(event) = last_seen {
                return Ok(event);
            }
        }

        if !valid_bad_versions.is_empty() {
            valid_bad_versions.sort();
            let hint = if version.is_empty() {
                "\nUse --version to specify".to_string()
            } else {
                String::new()
            };
            return Err(TemplateError::InvalidVersion {
                versions: valid_bad_versions.join(", "),
                hint,
            });
        }

        Err(TemplateError::UnknownTrigger {
            trigger: trigger_type.to_string(),
        })
    }

    /// Get a reference fragment by name
    pub fn reference(&self, name: &str) -> Option<&ReferenceTemplate> {
        self.references.iter().find(|r| r.name == name)
    }

    /// Registered event templates, in registration order
    pub fn events(&self) -> &[EventTemplate] {
        &self.events
    }

    /// Number of registered event templates
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of registered reference fragments
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Reject reference fragments that invoke other reference fragments.
    ///
    /// Expansion is single-level: a fragment's fields may use built-in
    /// identifiers but may not name another registered fragment, at any
    /// nesting depth through `data`. Run once after the bulk load completes,
    /// when every fragment name is known.
    pub fn validate_references(&self) -> TemplateResult<()> {
        for reference in &self.references {
            self.check_fragment_fields(reference, &reference.reference)?;
        }
        Ok(())
    }

    fn check_fragment_fields(
        &self,
        owner: &ReferenceTemplate,
        fields: &BTreeMap<String, FieldSpec>,
    ) -> TemplateResult<()> {
        for (identifier, spec) in fields {
            if let Some(name) = spec.active_ref() {
                if self.reference(name).is_some() {
                    return Err(TemplateError::NestedReference {
                        name: name.to_string(),
                        identifier: identifier.clone(),
                        path: owner.filepath.clone(),
                    });
                }
            }

            if let Some(data) = &spec.data {
                // Malformed `data` is reported at resolve time; only check
                // the shapes that convert cleanly.
                if let Ok(nested) =
                    serde_json::from_value::<BTreeMap<String, FieldSpec>>(data.clone())
                {
                    self.check_fragment_fields(owner, &nested)?;
                }
            }
        }
        Ok(())
    }
}
