//! Resource enumeration against a cluster.
//!
//! Listing fails soft: a transport or parse failure is logged and yields an
//! empty set, so the engine proceeds as if the cluster had no resources of
//! that kind rather than aborting the run.

use serde::Deserialize;
use serde_json::Value;

use crate::client::ClusterClient;

/// Index names containing any of these substrings are never migrated.
/// `.` covers system-internal indices; the other two are log/metric noise
/// that gets recreated by its own shippers.
pub const EXCLUDED_SUBSTRINGS: &[&str] = &["filebeat", ".", "metric"];

/// One row of a `_cat/indices?format=json` response. The column name
/// depends on the query: `h=i` yields `i`, the unabridged form yields
/// `index`.
#[derive(Debug, Deserialize)]
struct CatIndexRow {
    #[serde(default)]
    i: Option<String>,
    #[serde(default)]
    index: Option<String>,
}

impl CatIndexRow {
    fn name(self) -> Option<String> {
        self.i.or(self.index).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateListResponse {
    #[serde(default)]
    index_templates: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    name: String,
    index_template: Value,
}

/// Drop excluded names, preserving order.
pub fn apply_exclusions(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !EXCLUDED_SUBSTRINGS.iter().any(|s| name.contains(s)))
        .collect()
}

/// List every index on `cluster`, exclusion-filtered.
pub async fn list_all_indices(client: &dyn ClusterClient, cluster: &str) -> Vec<String> {
    let names = match client.get("_cat/indices?h=i&format=json").await {
        Ok(body) => parse_cat_rows(&body),
        Err(e) => {
            tracing::warn!("error fetching indices from {} cluster: {}", cluster, e);
            Vec::new()
        }
    };
    apply_exclusions(names)
}

/// List indices matching `pattern` on the source, exclusion-filtered.
pub async fn list_indices_matching(client: &dyn ClusterClient, pattern: &str) -> Vec<String> {
    let path = format!("_cat/indices/{pattern}?format=json");
    let names = match client.get(&path).await {
        Ok(body) => parse_cat_rows(&body),
        Err(e) => {
            tracing::warn!("error fetching index names for pattern '{}': {}", pattern, e);
            Vec::new()
        }
    };
    apply_exclusions(names)
}

fn parse_cat_rows(body: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<CatIndexRow>>(body) {
        Ok(rows) => rows.into_iter().filter_map(CatIndexRow::name).collect(),
        Err(e) => {
            tracing::warn!("unparseable _cat/indices response: {}", e);
            Vec::new()
        }
    }
}

/// List index templates matching `pattern`, paired with their embedded
/// definitions (the list endpoint is also the fetch endpoint for templates).
pub async fn list_templates(
    client: &dyn ClusterClient,
    pattern: &str,
) -> Vec<(String, Value)> {
    let path = format!("_index_template/{pattern}");
    match client.get(&path).await {
        Ok(body) => match serde_json::from_str::<TemplateListResponse>(&body) {
            Ok(response) => response
                .index_templates
                .into_iter()
                .map(|t| (t.name, t.index_template))
                .collect(),
            Err(e) => {
                tracing::warn!("unparseable template list response: {}", e);
                Vec::new()
            }
        },
        Err(e) => {
            tracing::warn!("error fetching templates for pattern '{}': {}", pattern, e);
            Vec::new()
        }
    }
}

/// List template names only, for validation.
pub async fn list_template_names(client: &dyn ClusterClient, pattern: &str) -> Vec<String> {
    let path = format!("_index_template/{pattern}?filter_path=index_templates.name");
    match client.get(&path).await {
        Ok(body) => match serde_json::from_str::<TemplateListResponse>(&body) {
            Ok(response) => response.index_templates.into_iter().map(|t| t.name).collect(),
            Err(_) => {
                // filter_path strips the index_template body, so fall back
                // to a tolerant parse over the raw tree.
                parse_template_names_lenient(&body)
            }
        },
        Err(e) => {
            tracing::warn!("error fetching template names for pattern '{}': {}", pattern, e);
            Vec::new()
        }
    }
}

fn parse_template_names_lenient(body: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    value["index_templates"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|t| t["name"].as_str())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// List every ingest pipeline name on the cluster.
pub async fn list_pipeline_names(client: &dyn ClusterClient) -> Vec<String> {
    match client.get("_ingest/pipeline?filter_path=*.id").await {
        Ok(body) => match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => map.keys().cloned().collect(),
            Ok(_) | Err(_) => {
                tracing::warn!("unparseable pipeline list response");
                Vec::new()
            }
        },
        Err(e) => {
            tracing::warn!("error fetching pipeline names: {}", e);
            Vec::new()
        }
    }
}

/// Split a comma-separated id list into distinct, trimmed names,
/// preserving first-occurrence order.
pub fn parse_id_list(ids: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Order-preserving sequence difference: names in `source` absent from
/// `target`.
pub fn missing_names(source: &[String], target: &[String]) -> Vec<String> {
    let present: std::collections::HashSet<&str> =
        target.iter().map(String::as_str).collect();
    source
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect()
}
