//! Index-template migration and validation.
//!
//! The template list endpoint embeds each definition, so enumeration and
//! fetch are one call; the migrator carries the fetched bodies and the
//! engine only probes and writes.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ClusterClient;
use crate::engine::{
    ExistencePolicy, MigrationEngine, ResourceKind, ResourceMigrator, PATTERN_BATCH_SIZE,
};
use crate::enumerate::{list_template_names, list_templates, missing_names};
use crate::error::{MigrateError, Result};
use crate::ledger::{MigrationLedger, MigrationSummary};
use crate::mapping::MappingConverter;
use crate::transform::build_template_payload;

pub struct TemplateMigrator {
    definitions: HashMap<String, Value>,
    converter: MappingConverter,
}

impl TemplateMigrator {
    pub fn new(templates: Vec<(String, Value)>) -> Self {
        Self {
            definitions: templates.into_iter().collect(),
            converter: MappingConverter::new(),
        }
    }
}

#[async_trait]
impl ResourceMigrator for TemplateMigrator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::IndexTemplate
    }

    fn resource_path(&self, name: &str) -> String {
        format!("_index_template/{name}")
    }

    async fn build_payload(&self, _source: &dyn ClusterClient, name: &str) -> Result<Value> {
        let definition = self
            .definitions
            .get(name)
            .ok_or(MigrateError::MissingDocument)?;
        Ok(build_template_payload(definition, &self.converter))
    }
}

/// Migrate index templates matching `pattern`, per-item existence check.
pub async fn migrate_templates(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    pattern: &str,
) -> Result<MigrationSummary> {
    tracing::info!("starting index template migration for pattern: {}", pattern);

    let templates = list_templates(source, pattern).await;
    let plan: Vec<String> = templates.iter().map(|(name, _)| name.clone()).collect();
    let mut ledger = MigrationLedger::new(plan.len());

    if plan.is_empty() {
        tracing::info!("no index templates found matching pattern '{}'", pattern);
        tracing::info!("\n{}", ledger.render("Index template migration"));
        return Ok(ledger.summary());
    }

    tracing::info!("found {} index templates matching pattern '{}'", plan.len(), pattern);

    let engine = MigrationEngine::new(source, target, PATTERN_BATCH_SIZE);
    let migrator = TemplateMigrator::new(templates);
    engine
        .execute(&migrator, &plan, ExistencePolicy::ProbeTarget, &mut ledger)
        .await;

    tracing::info!("index template migration completed");
    tracing::info!("\n{}", ledger.render("Index template migration"));
    Ok(ledger.summary())
}

/// Report template names present on the source but missing on the target.
/// Read-only; never writes.
pub async fn validate_templates(
    source: &dyn ClusterClient,
    target: &dyn ClusterClient,
    pattern: &str,
) -> Vec<String> {
    tracing::info!("starting index template validation for pattern: {}", pattern);

    let source_templates = list_template_names(source, pattern).await;
    let target_templates = list_template_names(target, pattern).await;
    let missing = missing_names(&source_templates, &target_templates);

    if missing.is_empty() {
        tracing::info!("all templates from source are present in target");
    } else {
        tracing::info!("found {} templates missing in target:", missing.len());
        for name in &missing {
            tracing::info!("- {}", name);
        }
    }

    tracing::info!("index template validation completed");
    missing
}
