//! Ingest-pipeline migration and validation.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ClusterClient;
use crate::engine::{
    ExistencePolicy, MigrationEngine, ResourceKind, ResourceMigrator, PATTERN_BATCH_SIZE,
};
use crate::enumerate::{list_pipeline_names, missing_names, parse_id_list};
use crate::error::Result;
use crate::ledger::{MigrationLedger, MigrationSummary};
use crate::transform::unwrap_named_definition;

pub struct PipelineMigrator;

#[async_trait]
impl ResourceMigrator for PipelineMigrator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::IngestPipeline
    }

    fn resource_path(&self, name: &str) -> String {
        format!("_ingest/pipeline/{name}")
    }

    async fn build_payload(&self, source: &dyn ClusterClient, name: &str) -> Result<Value> {
        let raw = source.get(&self.resource_path(name)).await?;
        unwrap_named_definition(name, &raw)
    }
}

/// Migrate the comma-separated pipeline ids, per-item existence check.
pub async fn migrate_pipelines(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    ids: &str,
) -> Result<MigrationSummary> {
    tracing::info!("starting ingest pipeline migration for: {}", ids);

    let plan = parse_id_list(ids);
    let mut ledger = MigrationLedger::new(plan.len());

    if plan.is_empty() {
        tracing::info!("no valid pipeline ids provided");
        tracing::info!("\n{}", ledger.render("Ingest pipeline migration"));
        return Ok(ledger.summary());
    }

    tracing::info!("found {} ingest pipelines to migrate", plan.len());

    let engine = MigrationEngine::new(source, target, PATTERN_BATCH_SIZE);
    engine
        .execute(&PipelineMigrator, &plan, ExistencePolicy::ProbeTarget, &mut ledger)
        .await;

    tracing::info!("ingest pipeline migration completed");
    tracing::info!("\n{}", ledger.render("Ingest pipeline migration"));
    Ok(ledger.summary())
}

/// Report pipeline names present on the source but missing on the target.
pub async fn validate_pipelines(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
) -> Vec<String> {
    tracing::info!("starting ingest pipeline validation");

    let source_pipelines = list_pipeline_names(source).await;
    let target_pipelines = list_pipeline_names(target).await;
    let missing = missing_names(&source_pipelines, &target_pipelines);

    if missing.is_empty() {
        tracing::info!("all ingest pipelines from source are present in target");
    } else {
        tracing::info!("found {} pipelines missing in target:", missing.len());
        for name in &missing {
            tracing::info!("- {}", name);
        }
    }

    tracing::info!("ingest pipeline validation completed");
    missing
}
