//! End-to-end migration scenarios over a mock transport.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use osmigrate::client::{ClusterClient, TransportError};
use osmigrate::engine::{ExistencePolicy, MigrationEngine};
use osmigrate::ledger::MigrationLedger;
use osmigrate::migrators::{
    migrate_indices_matching, migrate_pipelines, migrate_scripts, migrate_templates,
    sync_missing_indices, ScriptMigrator,
};

/// In-memory stand-in for a cluster. Canned GET responses for source-side
/// fetches; a mutable set of written resource paths so PUTs become visible
/// to later existence probes.
#[derive(Default)]
struct MockCluster {
    responses: HashMap<String, String>,
    existing: Mutex<HashSet<String>>,
    ambiguous_probes: HashSet<String>,
    failing_puts: HashSet<String>,
    puts: Mutex<Vec<(String, String)>>,
}

impl MockCluster {
    fn with_response(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_string(), body.to_string());
        self
    }

    fn with_existing(self, resource_path: &str) -> Self {
        self.existing.lock().unwrap().insert(resource_path.to_string());
        self
    }

    fn with_ambiguous_probe(mut self, probe_path: &str) -> Self {
        self.ambiguous_probes.insert(probe_path.to_string());
        self
    }

    fn with_failing_put(mut self, resource_path: &str) -> Self {
        self.failing_puts.insert(resource_path.to_string());
        self
    }

    fn put_paths(&self) -> Vec<String> {
        self.puts.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    fn put_body(&self, resource_path: &str) -> Option<Value> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == resource_path)
            .map(|(_, body)| serde_json::from_str(body).unwrap())
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        if self.ambiguous_probes.contains(path) {
            return Err(TransportError::Status {
                endpoint: path.to_string(),
                status: 503,
                detail: "cluster unavailable".to_string(),
            });
        }
        if let Some(body) = self.responses.get(path) {
            return Ok(body.clone());
        }
        // Existence probes for indices hit {name}/_settings while the
        // written path is {name}.
        let key = path.trim_end_matches("/_settings");
        if self.existing.lock().unwrap().contains(key) {
            return Ok("{}".to_string());
        }
        Err(TransportError::NotFound {
            endpoint: path.to_string(),
        })
    }

    async fn put(&self, path: &str, body: String) -> Result<(), TransportError> {
        if self.failing_puts.contains(path) {
            return Err(TransportError::Status {
                endpoint: path.to_string(),
                status: 400,
                detail: "mapper_parsing_exception".to_string(),
            });
        }
        self.puts.lock().unwrap().push((path.to_string(), body));
        self.existing.lock().unwrap().insert(path.to_string());
        Ok(())
    }
}

fn cat_rows(names: &[&str]) -> String {
    let rows: Vec<Value> = names.iter().map(|n| json!({ "i": n })).collect();
    Value::Array(rows).to_string()
}

const ALWAYS: fn(&[String]) -> bool = |_| true;

#[tokio::test]
async fn diff_strategy_migrates_only_filtered_missing_indices() {
    let source = MockCluster::default()
        .with_response(
            "_cat/indices?h=i&format=json",
            &cat_rows(&["a", "a.internal", "filebeat-1", "b"]),
        )
        .with_response(
            "b/",
            &json!({
                "b": {
                    "aliases": {},
                    "settings": {
                        "index": {
                            "uuid": "xyz",
                            "number_of_shards": "1",
                            "number_of_replicas": "2",
                            "refresh_interval": "1s"
                        }
                    },
                    "mappings": { "properties": { "f": { "type": "keyword" } } }
                }
            })
            .to_string(),
        );
    let target = MockCluster::default()
        .with_response("_cat/indices?h=i&format=json", &cat_rows(&["a"]));

    let confirm = |missing: &[String]| {
        assert_eq!(missing, ["b".to_string()]);
        true
    };
    let summary = sync_missing_indices(&source, &target, &confirm).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(target.put_paths(), vec!["b".to_string()]);

    let body = target.put_body("b").unwrap();
    assert_eq!(body["settings"]["index"]["number_of_replicas"], "0");
    assert_eq!(body["settings"]["index"]["refresh_interval"], "300s");
    assert!(body["settings"]["index"].get("uuid").is_none());
}

#[tokio::test]
async fn identical_clusters_yield_an_empty_plan() {
    let rows = cat_rows(&["a", "b"]);
    let source =
        MockCluster::default().with_response("_cat/indices?h=i&format=json", &rows);
    let target =
        MockCluster::default().with_response("_cat/indices?h=i&format=json", &rows);

    let confirm = |_: &[String]| -> bool { panic!("confirmation must not run for an empty plan") };
    let summary = sync_missing_indices(&source, &target, &confirm).await.unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(summary.migrated + summary.skipped + summary.failed, 0);
    assert!(target.put_paths().is_empty());
}

#[tokio::test]
async fn declined_confirmation_aborts_before_any_write() {
    let source = MockCluster::default()
        .with_response("_cat/indices?h=i&format=json", &cat_rows(&["only"]));
    let target = MockCluster::default()
        .with_response("_cat/indices?h=i&format=json", &cat_rows(&[]));

    let decline = |_: &[String]| false;
    let summary = sync_missing_indices(&source, &target, &decline).await.unwrap();

    assert_eq!(summary.migrated, 0);
    assert!(target.put_paths().is_empty());
}

#[tokio::test]
async fn script_run_accounts_for_skip_and_empty_source() {
    let source = MockCluster::default()
        .with_response("_scripts/s1", &json!({ "script": { "lang": "painless" } }).to_string())
        .with_response("_scripts/s2", "");
    let target = MockCluster::default().with_existing("_scripts/s1");

    let summary = migrate_scripts(&source, &target, "s1,s2").await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.migrated, 0);
    assert_eq!(summary.failures[0].name, "s2");
    assert!(summary.failures[0].reason.contains("no valid script content"));
    assert!(target.put_paths().is_empty());
}

#[tokio::test]
async fn pattern_strategy_is_idempotent_across_runs() {
    fn source() -> MockCluster {
        MockCluster::default()
            .with_response(
                "_ingest/pipeline/p1",
                &json!({ "p1": { "processors": [] } }).to_string(),
            )
            .with_response(
                "_ingest/pipeline/p2",
                &json!({ "p2": { "processors": [] } }).to_string(),
            )
    }
    let target = MockCluster::default();

    let first = migrate_pipelines(&source(), &target, "p1,p2").await.unwrap();
    assert_eq!(first.migrated, 2);
    assert_eq!(first.skipped, 0);

    let second = migrate_pipelines(&source(), &target, "p1,p2").await.unwrap();
    assert_eq!(second.migrated, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.failed, 0);
    // No second round of writes.
    assert_eq!(target.put_paths().len(), 2);
}

#[tokio::test]
async fn ambiguous_oracle_error_attempts_the_write() {
    // Deliberate policy: a failed existence probe is treated as absence,
    // so the resource is (re-)written rather than silently skipped.
    let source = MockCluster::default()
        .with_response("_scripts/s3", &json!({ "script": { "lang": "painless" } }).to_string());
    let target = MockCluster::default().with_ambiguous_probe("_scripts/s3");

    let summary = migrate_scripts(&source, &target, "s3").await.unwrap();

    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(target.put_paths(), vec!["_scripts/s3".to_string()]);
}

#[tokio::test]
async fn one_failing_item_never_aborts_the_run() {
    let source = MockCluster::default()
        .with_response("_ingest/pipeline/p1", &json!({ "p1": {} }).to_string())
        .with_response("_ingest/pipeline/bad", &json!({ "bad": {} }).to_string())
        .with_response("_ingest/pipeline/p3", &json!({ "p3": {} }).to_string());
    let target = MockCluster::default().with_failing_put("_ingest/pipeline/bad");

    let summary = migrate_pipelines(&source, &target, "p1,bad,p3").await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.migrated, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].name, "bad");
    assert!(summary.failures[0].reason.contains("mapper_parsing_exception"));
    assert_eq!(
        target.put_paths(),
        vec![
            "_ingest/pipeline/p1".to_string(),
            "_ingest/pipeline/p3".to_string()
        ]
    );
}

#[tokio::test]
async fn batch_size_never_changes_outcomes() {
    let source = {
        let mut cluster = MockCluster::default();
        for i in 0..5 {
            cluster = cluster.with_response(
                &format!("_scripts/s{i}"),
                &json!({ "script": { "source": "x" } }).to_string(),
            );
        }
        cluster
    };
    let plan: Vec<String> = (0..5).map(|i| format!("s{i}")).collect();

    for batch_size in [1, 2, 100] {
        let target = MockCluster::default().with_existing("_scripts/s2");
        let engine = MigrationEngine::new(&source, &target, batch_size);
        let mut ledger = MigrationLedger::new(plan.len());
        engine
            .execute(&ScriptMigrator, &plan, ExistencePolicy::ProbeTarget, &mut ledger)
            .await;

        assert_eq!(ledger.settled(), 5, "batch_size={batch_size}");
        assert_eq!(ledger.migrated(), 4, "batch_size={batch_size}");
        assert_eq!(ledger.skipped(), 1, "batch_size={batch_size}");
        assert_eq!(ledger.failed(), 0, "batch_size={batch_size}");
    }
}

#[tokio::test]
async fn template_migration_converts_mappings_and_skips_existing() {
    let list_body = json!({
        "index_templates": [
            {
                "name": "default_logs",
                "index_template": {
                    "index_patterns": ["logs-*"],
                    "template": {
                        "mappings": { "properties": { "tags": { "type": "flattened" } } }
                    }
                }
            },
            {
                "name": "default_old",
                "index_template": { "index_patterns": ["old-*"] }
            }
        ]
    })
    .to_string();

    let source = MockCluster::default().with_response("_index_template/default_*", &list_body);
    let target = MockCluster::default().with_existing("_index_template/default_old");

    let summary = migrate_templates(&source, &target, "default_*").await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.skipped, 1);

    let body = target.put_body("_index_template/default_logs").unwrap();
    assert_eq!(
        body["template"]["mappings"]["properties"]["tags"]["type"],
        "flat_object"
    );
}

#[tokio::test]
async fn index_pattern_run_probes_and_excludes() {
    let source = MockCluster::default()
        .with_response(
            "_cat/indices/dm-*?format=json",
            &json!([
                { "health": "green", "index": "dm-a" },
                { "health": "green", "index": "dm-b" },
                { "health": "green", "index": "dm.system" }
            ])
            .to_string(),
        )
        .with_response(
            "dm-b/",
            &json!({ "dm-b": { "mappings": { "properties": {} } } }).to_string(),
        );
    let target = MockCluster::default().with_existing("dm-a");

    let summary = migrate_indices_matching(&source, &target, "dm-*").await.unwrap();

    // dm.system is exclusion-filtered, dm-a already exists, dm-b migrates.
    assert_eq!(summary.total, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.migrated, 1);
    assert_eq!(target.put_paths(), vec!["dm-b".to_string()]);
}

#[tokio::test]
async fn unreachable_source_yields_a_zero_run_not_an_error() {
    // Enumeration fails soft: no responses configured at all.
    let source = MockCluster::default();
    let target = MockCluster::default();

    let summary = sync_missing_indices(&source, &target, &ALWAYS).await.unwrap();
    assert_eq!(summary.total, 0);
    assert!(target.put_paths().is_empty());
}
