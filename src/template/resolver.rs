//! Payload resolution: recursively expands a selected event template into a
//! JSON payload, substituting built-in references, reference fragments and
//! declared defaults.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::registry::TemplateRegistry;
use super::types::{EventPayload, EventTemplate, FieldSpec, FieldType, TriggerParameters};
use super::{TemplateError, TemplateResult};

/// Expand a template's `subscription` and `event` sections into a payload.
///
/// Pure function over the registry snapshot and the request inputs; the same
/// template and parameters always produce byte-identical JSON.
pub fn generate_event_payload(
    registry: &TemplateRegistry,
    template: &EventTemplate,
    params: &TriggerParameters,
) -> TemplateResult<EventPayload> {
    let subscription = resolve_fields(&template.subscription, template, registry, params, false)?;
    let event = resolve_fields(&template.event, template, registry, params, false)?;

    Ok(EventPayload {
        subscription,
        event,
    })
}

/// Resolve one field map into a JSON object.
///
/// `in_fragment` is set while expanding a reference fragment; fragments may
/// not invoke further fragments.
fn resolve_fields(
    fields: &BTreeMap<String, FieldSpec>,
    root: &EventTemplate,
    registry: &TemplateRegistry,
    params: &TriggerParameters,
    in_fragment: bool,
) -> TemplateResult<Map<String, Value>> {
    let mut working = Map::new();

    for (identifier, spec) in fields {
        let value = resolve_field(identifier, spec, root, registry, params, in_fragment)?;
        working.insert(identifier.clone(), value);
    }

    Ok(working)
}

fn resolve_field(
    identifier: &str,
    spec: &FieldSpec,
    root: &EventTemplate,
    registry: &TemplateRegistry,
    params: &TriggerParameters,
    in_fragment: bool,
) -> TemplateResult<Value> {
    if let Some(name) = spec.active_ref() {
        return resolve_reference(identifier, name, spec, root, registry, params, in_fragment);
    }

    if spec.field_type == "object" {
        let data = spec.data.as_ref().ok_or_else(|| TemplateError::MissingData {
            identifier: identifier.to_string(),
            path: root.filepath.clone(),
        })?;

        let nested = convert_to_field_specs(identifier, data)?;
        let child = resolve_fields(&nested, root, registry, params, in_fragment)?;
        return Ok(Value::Object(child));
    }

    if let Some(default) = &spec.default {
        return Ok(default.clone());
    }

    backup_default(&spec.field_type, identifier, root)
}

/// Convert a generic `data` value into the nested field-spec shape
fn convert_to_field_specs(
    identifier: &str,
    data: &Value,
) -> TemplateResult<BTreeMap<String, FieldSpec>> {
    serde_json::from_value(data.clone()).map_err(|source| TemplateError::DataConversion {
        identifier: identifier.to_string(),
        source,
    })
}

fn resolve_reference(
    identifier: &str,
    name: &str,
    spec: &FieldSpec,
    root: &EventTemplate,
    registry: &TemplateRegistry,
    params: &TriggerParameters,
    in_fragment: bool,
) -> TemplateResult<Value> {
    if let Some(fragment) = registry.reference(name) {
        // Fragments expand one level only; the loader validates this up
        // front, this guard covers hand-built registries.
        if in_fragment {
            return Err(TemplateError::NestedReference {
                name: name.to_string(),
                identifier: identifier.to_string(),
                path: fragment.filepath.clone(),
            });
        }

        let expanded = resolve_fields(&fragment.reference, root, registry, params, true)?;
        return Ok(Value::Object(expanded));
    }

    resolve_builtin_reference(identifier, name, spec, root, params)
}

/// Resolve one of the fixed built-in reference identifiers.
///
/// Every identifier requires a specific declared type; a mismatch is an
/// error, never a coercion. An unrecognized identifier is a hard error.
fn resolve_builtin_reference(
    identifier: &str,
    name: &str,
    spec: &FieldSpec,
    root: &EventTemplate,
    params: &TriggerParameters,
) -> TemplateResult<Value> {
    match name {
        "event_id" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(params.event_id.clone()))
        }
        "subscription_type" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(root.metadata.event_type.clone()))
        }
        "subscription_version" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(root.metadata.version.clone()))
        }
        "status" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(params.subscription_status.clone()))
        }
        "timestamp" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(params.timestamp.clone()))
        }
        "cost" => {
            require_type(spec, name, FieldType::Int)?;
            Ok(Value::from(params.cost))
        }
        "target_id" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(params.to_user.clone()))
        }
        "transport_method" => {
            require_type(spec, name, FieldType::String)?;
            Ok(Value::String(params.transport.clone()))
        }
        "transport_callback" => {
            require_type(spec, name, FieldType::String)?;
            Ok(transport_literal(params, "webhook"))
        }
        "transport_session_id" | "transport_connected_at" | "transport_disconnected_at" => {
            require_type(spec, name, FieldType::String)?;
            Ok(transport_literal(params, "websocket"))
        }
        _ => Err(TemplateError::UnknownRef {
            name: name.to_string(),
            identifier: identifier.to_string(),
        }),
    }
}

fn require_type(spec: &FieldSpec, name: &str, required: FieldType) -> TemplateResult<()> {
    if spec.field_type != required.as_str() {
        return Err(TemplateError::RefTypeMismatch {
            name: name.to_string(),
            required,
        });
    }
    Ok(())
}

/// The literal string `"null"` on the matching transport, JSON null otherwise
fn transport_literal(params: &TriggerParameters, transport: &str) -> Value {
    if params.transport == transport {
        Value::String("null".to_string())
    } else {
        Value::Null
    }
}

/// Zero value for a declared type when no default and no reference apply
fn backup_default(field_type: &str, identifier: &str, root: &EventTemplate) -> TemplateResult<Value> {
    match FieldType::parse(field_type) {
        Some(FieldType::String) => Ok(Value::String(String::new())),
        Some(FieldType::Int) => Ok(Value::from(0)),
        Some(FieldType::StringArray) | Some(FieldType::IntArray) | Some(FieldType::ObjectArray) => {
            Ok(Value::Array(Vec::new()))
        }
        Some(FieldType::Object) => Ok(Value::Object(Map::new())),
        None => Err(TemplateError::UnknownType {
            field_type: field_type.to_string(),
            identifier: identifier.to_string(),
            path: root.filepath.clone(),
        }),
    }
}
