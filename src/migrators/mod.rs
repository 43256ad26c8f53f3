pub mod batches;
pub mod indices;
pub mod pipelines;
pub mod scripts;
pub mod templates;

pub use batches::generate_index_batches;
pub use indices::{migrate_indices_matching, sync_missing_indices, IndexMigrator};
pub use pipelines::{migrate_pipelines, validate_pipelines, PipelineMigrator};
pub use scripts::{migrate_scripts, ScriptMigrator};
pub use templates::{migrate_templates, validate_templates, TemplateMigrator};
