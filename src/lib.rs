//! osmigrate: sync index metadata, templates, ingest pipelines and stored
//! scripts from an Elasticsearch cluster to an OpenSearch cluster.
//!
//! The engine enumerates resources on the source, diffs or probes the
//! target for idempotent skips, rewrites each payload for target
//! compatibility (deprecated mapping types, migration-time setting
//! defaults), and writes items one at a time with per-item fault
//! isolation. Every run ends with a rendered outcome summary.

pub mod client;
pub mod config;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod ledger;
pub mod mapping;
pub mod migrators;
pub mod transform;

pub use client::{ClusterClient, HttpClient, TransportError};
pub use config::{ClusterConfig, MigrationConfig};
pub use engine::{ExistencePolicy, MigrationEngine, ResourceKind, ResourceMigrator};
pub use error::{MigrateError, Result};
pub use ledger::{MigrationLedger, MigrationOutcome, MigrationSummary};
pub use mapping::MappingConverter;
