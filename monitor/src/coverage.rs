//! Session-long accumulation of per-beat match quality.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MonitorError;

/// One monitored beat and its best similarity against the clip index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub beat: String,
    pub similarity: f64,
}

/// Collects beat scores for a monitoring session and writes the report
/// when the session ends.
pub struct CoverageSession {
    entries: Vec<CoverageEntry>,
    threshold: f64,
}

impl CoverageSession {
    pub fn new(threshold: f64) -> Self {
        Self {
            entries: Vec::new(),
            threshold,
        }
    }

    /// Record a beat score. Returns whether it cleared the threshold.
    pub fn record(&mut self, beat: &str, similarity: f64) -> bool {
        let rounded = (similarity * 10000.0).round() / 10000.0;
        self.entries.push(CoverageEntry {
            beat: beat.to_string(),
            similarity: rounded,
        });
        rounded >= self.threshold
    }

    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn covered(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.similarity >= self.threshold)
            .count()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Write the JSON report and log the covered/total summary. No-op
    /// when nothing was recorded.
    pub fn save_report(&self, path: &Path) -> Result<(), MonitorError> {
        if self.entries.is_empty() {
            info!("no beats monitored, skipping report");
            return Ok(());
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, data)?;

        let covered = self.covered();
        let total = self.total();
        let pct = covered as f64 / total as f64 * 100.0;
        info!(
            covered,
            total,
            threshold = self.threshold,
            "coverage: {covered}/{total} beats ({pct:.0}%) above threshold"
        );
        info!(report = %path.display(), "report saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_rounds_and_gates() {
        let mut session = CoverageSession::new(0.75);
        assert!(session.record("hello there", 0.91234567));
        assert!(!session.record("so long", 0.12));
        assert_eq!(session.entries()[0].similarity, 0.9123);
        assert_eq!(session.covered(), 1);
        assert_eq!(session.total(), 2);
    }

    #[test]
    fn report_round_trips_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.json");

        let mut session = CoverageSession::new(0.75);
        session.record("hello there", 0.9);
        session.record("so long", 0.3);
        session.save_report(&path).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<CoverageEntry> = serde_json::from_str(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].beat, "hello there");
        assert_eq!(entries[1].similarity, 0.3);
    }

    #[test]
    fn empty_session_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.json");
        let session = CoverageSession::new(0.75);
        session.save_report(&path).unwrap();
        assert!(!path.exists());
    }
}
