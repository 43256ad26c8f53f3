//! Index migration: the bulk diff strategy over all indices, and the
//! pattern strategy for operator-triggered syncs.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ClusterClient;
use crate::engine::{
    ExistencePolicy, MigrationEngine, ResourceKind, ResourceMigrator, DIFF_BATCH_SIZE,
    PATTERN_BATCH_SIZE,
};
use crate::enumerate::{list_all_indices, list_indices_matching, missing_names};
use crate::error::Result;
use crate::ledger::{MigrationLedger, MigrationSummary};
use crate::mapping::MappingConverter;
use crate::transform::build_index_payload;

#[derive(Default)]
pub struct IndexMigrator {
    converter: MappingConverter,
}

impl IndexMigrator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceMigrator for IndexMigrator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Index
    }

    fn resource_path(&self, name: &str) -> String {
        name.to_string()
    }

    fn probe_path(&self, name: &str) -> String {
        format!("{name}/_settings")
    }

    async fn build_payload(&self, source: &dyn ClusterClient, name: &str) -> Result<Value> {
        let raw = source.get(&format!("{name}/")).await?;
        build_index_payload(name, &raw, &self.converter)
    }
}

/// Diff strategy: migrate every index present on the source but absent
/// from the target. `confirm` gates the run after the missing set is
/// known and before the first write; returning false aborts cleanly.
pub async fn sync_missing_indices(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    confirm: &(dyn Fn(&[String]) -> bool + Send + Sync),
) -> Result<MigrationSummary> {
    tracing::info!("starting all-index migration");

    let source_indices = list_all_indices(source, "source").await;
    let target_indices = list_all_indices(target, "target").await;
    tracing::info!("found {} indices in source cluster", source_indices.len());
    tracing::info!("found {} indices in target cluster", target_indices.len());

    let missing = missing_names(&source_indices, &target_indices);
    let mut ledger = MigrationLedger::new(missing.len());

    if missing.is_empty() {
        tracing::info!("no indices missing in target cluster");
        tracing::info!("\n{}", ledger.render("All-index migration"));
        return Ok(ledger.summary());
    }

    tracing::info!(
        "found {} indices missing in target: {}",
        missing.len(),
        missing.join(", ")
    );

    if !confirm(&missing) {
        tracing::info!("migration aborted before any writes");
        tracing::info!("\n{}", ledger.render("All-index migration"));
        return Ok(ledger.summary());
    }

    let engine = MigrationEngine::new(source, target, DIFF_BATCH_SIZE);
    let migrator = IndexMigrator::new();
    engine
        .execute(&migrator, &missing, ExistencePolicy::AssumeMissing, &mut ledger)
        .await;

    tracing::info!("all-index migration completed");
    tracing::info!("\n{}", ledger.render("All-index migration"));
    Ok(ledger.summary())
}

/// Pattern strategy: migrate indices matching `pattern`, probing the
/// target per item for the idempotent skip.
pub async fn migrate_indices_matching(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    pattern: &str,
) -> Result<MigrationSummary> {
    tracing::info!("starting index migration for pattern: {}", pattern);

    let plan = list_indices_matching(source, pattern).await;
    let mut ledger = MigrationLedger::new(plan.len());

    if plan.is_empty() {
        tracing::info!("no indices found matching pattern '{}' in source cluster", pattern);
        tracing::info!("\n{}", ledger.render("Index migration"));
        return Ok(ledger.summary());
    }

    tracing::info!("found {} indices matching pattern '{}'", plan.len(), pattern);

    let engine = MigrationEngine::new(source, target, PATTERN_BATCH_SIZE);
    let migrator = IndexMigrator::new();
    engine
        .execute(&migrator, &plan, ExistencePolicy::ProbeTarget, &mut ledger)
        .await;

    tracing::info!("index migration completed");
    tracing::info!("\n{}", ledger.render("Index migration"));
    Ok(ledger.summary())
}
