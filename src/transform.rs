//! Payload transforms: turn a fetched source document into a body the
//! target cluster accepts.

use serde_json::{json, Map, Value};

use crate::error::{MigrateError, Result};
use crate::mapping::MappingConverter;

/// Settings keys the source server assigns; the target assigns its own.
const SERVER_ASSIGNED_SETTINGS: &[&str] = &["uuid", "creation_date", "provided_name", "version"];

/// Build the index-creation payload from a `GET {name}/` response.
///
/// Server-assigned settings are stripped, replica count and refresh
/// interval are forced to bulk-load-friendly defaults (fresh targets start
/// under-replicated with relaxed refresh), and mappings go through the
/// type converter. Aliases pass through, absent aliases become `{}`.
pub fn build_index_payload(
    name: &str,
    raw_body: &str,
    converter: &MappingConverter,
) -> Result<Value> {
    if raw_body.trim().is_empty() {
        return Err(MigrateError::EmptySource);
    }

    let mut document: Value = serde_json::from_str(raw_body)?;
    let Some(index_data) = document.get_mut(name).and_then(Value::as_object_mut) else {
        return Err(MigrateError::MissingDocument);
    };

    let aliases = index_data
        .get("aliases")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let settings = match index_data
        .get_mut("settings")
        .and_then(|s| s.get_mut("index"))
        .and_then(Value::as_object_mut)
    {
        Some(index_settings) => {
            normalize_index_settings(index_settings);
            json!({ "index": index_settings })
        }
        None => Value::Null,
    };

    let mappings = match index_data.get_mut("mappings") {
        Some(mappings) => {
            converter.transform(mappings);
            mappings.take()
        }
        None => Value::Null,
    };

    Ok(json!({
        "aliases": aliases,
        "settings": settings,
        "mappings": mappings,
    }))
}

fn normalize_index_settings(settings: &mut Map<String, Value>) {
    for key in SERVER_ASSIGNED_SETTINGS {
        settings.remove(*key);
    }
    settings.insert("number_of_replicas".to_string(), json!("0"));
    settings.insert("refresh_interval".to_string(), json!("300s"));
}

/// Rewrite a template definition for the target: the mapping converter
/// runs over `template.mappings` when present.
pub fn build_template_payload(definition: &Value, converter: &MappingConverter) -> Value {
    let mut payload = definition.clone();
    if let Some(mappings) = payload
        .get_mut("template")
        .and_then(|t| t.get_mut("mappings"))
    {
        converter.transform(mappings);
    }
    payload
}

/// Unwrap the name-keyed definition the fetch endpoint returns for
/// pipelines; the write endpoint expects the bare definition.
pub fn unwrap_named_definition(name: &str, raw_body: &str) -> Result<Value> {
    if raw_body.trim().is_empty() {
        return Err(MigrateError::EmptySource);
    }
    let document: Value = serde_json::from_str(raw_body)?;
    document
        .get(name)
        .cloned()
        .ok_or(MigrateError::MissingDocument)
}

/// Build the stored-script write payload: the fetch response minus the
/// response-only `_id` and `found` markers. Fails when nothing usable
/// remains of the script body.
pub fn build_script_payload(raw_body: &str) -> Result<Value> {
    if raw_body.trim().is_empty() {
        return Err(MigrateError::NoScriptContent);
    }

    let mut document: Value =
        serde_json::from_str(raw_body).map_err(|_| MigrateError::NoScriptContent)?;
    let Some(body) = document.as_object_mut() else {
        return Err(MigrateError::NoScriptContent);
    };

    body.remove("_id");
    body.remove("found");

    if body.is_empty() {
        return Err(MigrateError::NoScriptContent);
    }
    Ok(document)
}
