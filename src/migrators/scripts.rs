//! Stored-script migration.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ClusterClient;
use crate::engine::{
    ExistencePolicy, MigrationEngine, ResourceKind, ResourceMigrator, PATTERN_BATCH_SIZE,
};
use crate::enumerate::parse_id_list;
use crate::error::Result;
use crate::ledger::{MigrationLedger, MigrationSummary};
use crate::transform::build_script_payload;

pub struct ScriptMigrator;

#[async_trait]
impl ResourceMigrator for ScriptMigrator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::StoredScript
    }

    fn resource_path(&self, name: &str) -> String {
        format!("_scripts/{name}")
    }

    async fn build_payload(&self, source: &dyn ClusterClient, name: &str) -> Result<Value> {
        let raw = source.get(&self.resource_path(name)).await?;
        build_script_payload(&raw)
    }
}

/// Migrate the comma-separated script ids, per-item existence check.
pub async fn migrate_scripts(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    ids: &str,
) -> Result<MigrationSummary> {
    tracing::info!("starting stored script migration for: {}", ids);

    let plan = parse_id_list(ids);
    let mut ledger = MigrationLedger::new(plan.len());

    if plan.is_empty() {
        tracing::info!("no valid script ids provided");
        tracing::info!("\n{}", ledger.render("Stored script migration"));
        return Ok(ledger.summary());
    }

    tracing::info!("found {} stored scripts to migrate", plan.len());

    let engine = MigrationEngine::new(source, target, PATTERN_BATCH_SIZE);
    engine
        .execute(&ScriptMigrator, &plan, ExistencePolicy::ProbeTarget, &mut ledger)
        .await;

    tracing::info!("stored script migration completed");
    tracing::info!("\n{}", ledger.render("Stored script migration"));
    Ok(ledger.summary())
}
