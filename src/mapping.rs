//! Mapping-tree conversion for target-engine compatibility.
//!
//! Field types deprecated on the target are rewritten in place wherever
//! they occur in a mapping tree, and `wildcard` fields gain
//! `doc_values: true` so term aggregations keep working on the target
//! engine. The walk treats any object carrying a string `type` attribute
//! as a field definition and recurses through every object and array, so
//! multi-fields and nested properties are covered without path queries.

use serde_json::Value;

/// Deprecated source type -> target type. Grows as the engines diverge.
const TYPE_CONVERSIONS: &[(&str, &str)] = &[("flattened", "flat_object")];

#[derive(Debug, Default)]
pub struct MappingConverter;

impl MappingConverter {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite `mappings` in place. Safe to call on any JSON subtree;
    /// non-objects are left untouched.
    pub fn transform(&self, mappings: &mut Value) {
        self.walk(mappings);
    }

    fn walk(&self, node: &mut Value) {
        match node {
            Value::Object(map) => {
                let field_type = map.get("type").and_then(Value::as_str).map(str::to_string);
                if let Some(current) = field_type {
                    if let Some(replacement) = convert_type(&current) {
                        tracing::info!(
                            "converting mapping type '{}' to '{}'",
                            current,
                            replacement
                        );
                        map.insert("type".to_string(), Value::String(replacement.to_string()));
                    }
                    if current == "wildcard" {
                        // Structural edit on the enclosing field object, not
                        // a value substitution.
                        map.insert("doc_values".to_string(), Value::Bool(true));
                        tracing::info!("enabled doc_values on wildcard field");
                    }
                }
                for (_, child) in map.iter_mut() {
                    self.walk(child);
                }
            }
            Value::Array(items) => {
                for child in items.iter_mut() {
                    self.walk(child);
                }
            }
            _ => {}
        }
    }
}

fn convert_type(current: &str) -> Option<&'static str> {
    TYPE_CONVERSIONS
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, to)| *to)
}
