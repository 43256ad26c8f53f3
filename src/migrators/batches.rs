//! Batch-file generation: a sorted, comma-joined listing of source index
//! names, chunked for operators driving external reindex tooling.

use std::path::PathBuf;

use crate::client::ClusterClient;
use crate::enumerate::list_all_indices;
use crate::error::Result;

pub const BATCH_FILE_BATCH_SIZE: usize = 400;

/// Enumerate and exclusion-filter source indices, sort them, and write
/// comma-joined batches to a timestamped text file in `dir`. Returns the
/// file path, or `None` when the source had no eligible indices.
pub async fn generate_index_batches(
    source: &dyn ClusterClient,
    batch_size: usize,
    dir: &std::path::Path,
) -> Result<Option<PathBuf>> {
    tracing::info!("fetching indices from source cluster");

    let mut indices = list_all_indices(source, "source").await;
    if indices.is_empty() {
        tracing::info!("no indices found, nothing to batch");
        return Ok(None);
    }

    tracing::info!("total indices retrieved: {}", indices.len());
    indices.sort();

    let batches: Vec<&[String]> = indices.chunks(batch_size.max(1)).collect();
    tracing::info!("created {} batches", batches.len());

    let mut content = String::new();
    for batch in &batches {
        content.push_str(&batch.join(","));
        content.push('\n');
        content.push_str("===========================================\n");
    }

    let file_name = format!(
        "index_batches_{}.txt",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(file_name);
    std::fs::write(&path, content)?;

    tracing::info!("batches written to {}", path.display());
    Ok(Some(path))
}
