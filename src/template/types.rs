//! Template data model: event templates, reference fragments, field
//! specifications and the runtime parameters a trigger request supplies.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sentinel `ref` value meaning "no reference" even though the key is present.
pub const NO_REF: &str = "--";

/// A versioned event template parsed from one YAML document
#[derive(Debug, Clone, Deserialize)]
pub struct EventTemplate {
    /// Origin file, used only in diagnostics
    #[serde(skip)]
    pub filepath: PathBuf,

    /// Template identity and transport support
    pub metadata: TemplateMetadata,

    /// Fields of the `subscription` section of the payload
    #[serde(default)]
    pub subscription: BTreeMap<String, FieldSpec>,

    /// Fields of the `event` section of the payload
    #[serde(default)]
    pub event: BTreeMap<String, FieldSpec>,
}

/// `metadata` section of an event template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateMetadata {
    /// Transports the event can be delivered over, in declaration order
    #[serde(default)]
    pub supported_transports: Vec<String>,

    /// Trigger type, e.g. "channel.follow"
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Template version; `(type, version)` is the template's identity
    #[serde(default)]
    pub version: String,
}

/// A named, reusable field fragment invocable from event templates
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceTemplate {
    /// Origin file, used only in diagnostics
    #[serde(skip)]
    pub filepath: PathBuf,

    /// Unique fragment name
    #[serde(rename = "reference_name", default)]
    pub name: String,

    /// Fields substituted in place of the referring identifier
    #[serde(default)]
    pub reference: BTreeMap<String, FieldSpec>,
}

/// Declared shape of one payload field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Declared type, validated during resolution
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Reference name: a reference fragment or a built-in identifier
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,

    /// Literal default, used only when no reference applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Nested field map, present only when `type` is `object`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Advisory flag, never enforced by the resolver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl FieldSpec {
    /// The reference name, if one is set and is not the `--` sentinel
    pub fn active_ref(&self) -> Option<&str> {
        self.ref_name.as_deref().filter(|r| *r != NO_REF)
    }
}

/// The set of types a field specification may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    StringArray,
    IntArray,
    Object,
    ObjectArray,
}

impl FieldType {
    /// Parse a declared type string; `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "string[]" => Some(Self::StringArray),
            "int[]" => Some(Self::IntArray),
            "object" => Some(Self::Object),
            "object[]" => Some(Self::ObjectArray),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::StringArray => "string[]",
            Self::IntArray => "int[]",
            Self::Object => "object",
            Self::ObjectArray => "object[]",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime values supplied per generation request
#[derive(Debug, Clone)]
pub struct TriggerParameters {
    /// Identifier of the generated event
    pub event_id: String,
    /// Subscription status reported in the payload, e.g. "enabled"
    pub subscription_status: String,
    /// Event timestamp, RFC 3339
    pub timestamp: String,
    /// Subscription cost
    pub cost: i64,
    /// Target user of the event
    pub to_user: String,
    /// Requested transport identifier
    pub transport: String,
}

/// The generated two-section mock payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub subscription: serde_json::Map<String, serde_json::Value>,
    pub event: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_parse_known() {
        assert_eq!(FieldType::parse("string"), Some(FieldType::String));
        assert_eq!(FieldType::parse("int[]"), Some(FieldType::IntArray));
        assert_eq!(FieldType::parse("object[]"), Some(FieldType::ObjectArray));
    }

    #[test]
    fn test_field_type_parse_unknown() {
        assert_eq!(FieldType::parse("float"), None);
        assert_eq!(FieldType::parse(""), None);
    }

    #[test]
    fn test_active_ref_sentinel() {
        let spec = FieldSpec {
            field_type: "string".to_string(),
            ref_name: Some(NO_REF.to_string()),
            default: None,
            data: None,
            optional: None,
        };
        assert_eq!(spec.active_ref(), None);
    }

    #[test]
    fn test_active_ref_set() {
        let spec = FieldSpec {
            field_type: "string".to_string(),
            ref_name: Some("event_id".to_string()),
            default: None,
            data: None,
            optional: None,
        };
        assert_eq!(spec.active_ref(), Some("event_id"));
    }

    #[test]
    fn test_event_template_from_yaml() {
        let yaml = r#"
metadata:
  type: channel.follow
  version: "1"
  supported_transports:
    - webhook
    - websocket
subscription:
  id:
    type: string
    ref: event_id
event:
  user_name:
    type: string
    default: cool_user
"#;
        let template: EventTemplate = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(template.metadata.event_type, "channel.follow");
        assert_eq!(template.metadata.version, "1");
        assert_eq!(
            template.metadata.supported_transports,
            vec!["webhook", "websocket"]
        );
        assert_eq!(
            template.subscription["id"].ref_name.as_deref(),
            Some("event_id")
        );
        assert_eq!(
            template.event["user_name"].default,
            Some(serde_json::Value::String("cool_user".to_string()))
        );
    }

    #[test]
    fn test_reference_template_from_yaml() {
        let yaml = r#"
reference_name: user_fragment
reference:
  user_id:
    type: string
    default: "1234"
"#;
        let reference: ReferenceTemplate = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(reference.name, "user_fragment");
        assert!(reference.reference.contains_key("user_id"));
    }
}
