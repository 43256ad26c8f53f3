//! Per-run migration accounting.
//!
//! The ledger is a plain value created fresh for each run and mutated only
//! by the batch executor; nothing about it is global or persisted. Every
//! planned name must land in exactly one bucket.

use serde::Serialize;

/// Terminal outcome of one planned resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated,
    Skipped,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct MigrationLedger {
    total: usize,
    migrated: usize,
    skipped: usize,
    failures: Vec<(String, String)>,
}

/// Serializable snapshot of a finished (or aborted) run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MigrationSummary {
    pub total: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailureEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailureEntry {
    pub name: String,
    pub reason: String,
}

impl MigrationLedger {
    /// A fresh ledger for a plan of `total` candidates.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, name: &str, outcome: MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated => self.migrated += 1,
            MigrationOutcome::Skipped => self.skipped += 1,
            MigrationOutcome::Failed(reason) => {
                self.failures.push((name.to_string(), reason));
            }
        }
    }

    pub fn migrated(&self) -> usize {
        self.migrated
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Outcomes recorded so far; equals `total` once the run completes.
    pub fn settled(&self) -> usize {
        self.migrated + self.skipped + self.failures.len()
    }

    pub fn summary(&self) -> MigrationSummary {
        MigrationSummary {
            total: self.total,
            migrated: self.migrated,
            skipped: self.skipped,
            failed: self.failures.len(),
            failures: self
                .failures
                .iter()
                .map(|(name, reason)| FailureEntry {
                    name: name.clone(),
                    reason: reason.clone(),
                })
                .collect(),
        }
    }

    /// Human-readable summary block, logged at the end of every run.
    pub fn render(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("{title} summary:\n"));
        out.push_str(&format!("  Total candidates:       {}\n", self.total));
        out.push_str(&format!("  Successfully migrated:  {}\n", self.migrated));
        out.push_str(&format!("  Skipped (already exist): {}\n", self.skipped));
        out.push_str(&format!("  Failed:                 {}\n", self.failures.len()));
        if !self.failures.is_empty() {
            out.push_str("  Failures:\n");
            for (name, reason) in &self.failures {
                out.push_str(&format!("    - {name}: {reason}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_outcome_lands_in_one_bucket() {
        let mut ledger = MigrationLedger::new(3);
        ledger.record("a", MigrationOutcome::Migrated);
        ledger.record("b", MigrationOutcome::Skipped);
        ledger.record("c", MigrationOutcome::Failed("boom".to_string()));

        assert_eq!(ledger.settled(), 3);
        let summary = ledger.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.migrated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].name, "c");
        assert_eq!(summary.failures[0].reason, "boom");
    }

    #[test]
    fn failures_keep_processing_order() {
        let mut ledger = MigrationLedger::new(2);
        ledger.record("later", MigrationOutcome::Failed("second".to_string()));
        ledger.record("earlier", MigrationOutcome::Failed("first".to_string()));

        let summary = ledger.summary();
        let names: Vec<&str> = summary
            .failures
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["later", "earlier"]);
    }

    #[test]
    fn render_lists_failures() {
        let mut ledger = MigrationLedger::new(1);
        ledger.record("x", MigrationOutcome::Failed("no valid script content".to_string()));
        let text = ledger.render("Stored script migration");
        assert!(text.contains("Total candidates:       1"));
        assert!(text.contains("- x: no valid script content"));
    }

    #[test]
    fn summary_serializes_to_structured_data() {
        let mut ledger = MigrationLedger::new(1);
        ledger.record("a", MigrationOutcome::Migrated);
        let json = serde_json::to_value(ledger.summary()).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["migrated"], 1);
        assert_eq!(json["failures"], serde_json::json!([]));
    }
}
