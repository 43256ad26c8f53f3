//! Generic migration engine and batch executor.
//!
//! Each resource kind plugs into [`ResourceMigrator`] with its endpoint
//! shape and payload builder; the engine owns the control flow every kind
//! shares — batching, idempotent skip, per-item fault isolation, and
//! ledger accounting. Execution is strictly sequential: batches in plan
//! order, items in batch order, at most one in-flight request. Batch size
//! only groups log output; it never changes which resources migrate.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ClusterClient, TransportError};
use crate::error::Result;
use crate::ledger::{MigrationLedger, MigrationOutcome};

/// Batch size for the bulk source-minus-target diff over all indices.
pub const DIFF_BATCH_SIZE: usize = 100;
/// Batch size for pattern- and id-list-driven runs.
pub const PATTERN_BATCH_SIZE: usize = 20;

/// Category of migrated resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Index,
    IndexTemplate,
    IngestPipeline,
    StoredScript,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Index => "index",
            ResourceKind::IndexTemplate => "index template",
            ResourceKind::IngestPipeline => "ingest pipeline",
            ResourceKind::StoredScript => "stored script",
        }
    }
}

/// Whether the target is probed per item before each write.
///
/// Pattern-driven runs probe every name (ad hoc syncs tolerate per-item
/// round trips); the bulk diff already knows its plan is the missing set
/// and writes without probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistencePolicy {
    ProbeTarget,
    AssumeMissing,
}

/// Kind-specific capabilities the engine is parameterized over.
#[async_trait]
pub trait ResourceMigrator: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Write path for `name`, relative to the cluster base.
    fn resource_path(&self, name: &str) -> String;

    /// Existence-probe path; defaults to the write path.
    fn probe_path(&self, name: &str) -> String {
        self.resource_path(name)
    }

    /// Fetch `name` from the source and build its write payload.
    async fn build_payload(&self, source: &dyn ClusterClient, name: &str) -> Result<Value>;
}

pub struct MigrationEngine<'a> {
    source: &'a dyn ClusterClient,
    target: &'a dyn ClusterClient,
    batch_size: usize,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(
        source: &'a dyn ClusterClient,
        target: &'a dyn ClusterClient,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            target,
            batch_size,
        }
    }

    /// Drive `plan` through `migrator`, recording one outcome per name.
    pub async fn execute(
        &self,
        migrator: &dyn ResourceMigrator,
        plan: &[String],
        policy: ExistencePolicy,
        ledger: &mut MigrationLedger,
    ) {
        for (batch_index, batch) in plan.chunks(self.batch_size.max(1)).enumerate() {
            tracing::info!(
                "processing batch {} of {} {}s: {}",
                batch_index + 1,
                batch.len(),
                migrator.kind().label(),
                batch.join(", ")
            );
            for name in batch {
                let outcome = self.migrate_one(migrator, name, policy).await;
                ledger.record(name, outcome);
            }
        }
    }

    async fn migrate_one(
        &self,
        migrator: &dyn ResourceMigrator,
        name: &str,
        policy: ExistencePolicy,
    ) -> MigrationOutcome {
        let kind = migrator.kind().label();

        if policy == ExistencePolicy::ProbeTarget
            && self.exists_on_target(&migrator.probe_path(name)).await
        {
            tracing::info!("{} {} already exists in target cluster, skipping", kind, name);
            return MigrationOutcome::Skipped;
        }

        tracing::info!("migrating {}: {}", kind, name);

        let payload = match migrator.build_payload(self.source, name).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("error preparing {} {}: {}", kind, name, e);
                return MigrationOutcome::Failed(e.to_string());
            }
        };

        match self
            .target
            .put(&migrator.resource_path(name), payload.to_string())
            .await
        {
            Ok(()) => {
                tracing::info!("successfully migrated {}: {}", kind, name);
                MigrationOutcome::Migrated
            }
            Err(e) => {
                tracing::warn!("error migrating {} {}: {}", kind, name, e);
                MigrationOutcome::Failed(e.to_string())
            }
        }
    }

    /// Existence oracle. A 404 is a true absence; any other failure is
    /// logged and classified as absent so an ambiguous probe never blocks
    /// a migration attempt (overwrite is preferred over silent skip).
    pub async fn exists_on_target(&self, probe_path: &str) -> bool {
        match self.target.get(probe_path).await {
            Ok(_) => true,
            Err(TransportError::NotFound { .. }) => false,
            Err(e) => {
                tracing::warn!(
                    "ambiguous existence check at {}: {}; attempting migration anyway",
                    probe_path,
                    e
                );
                false
            }
        }
    }
}
