//! Run-wide accumulators.
//!
//! Some checks can only be decided once every row has been seen: duplicate
//! druids and source ids, blank source ids, and formula-error cells (which are
//! reported as one finding per kind rather than one per cell). A [`RunTally`]
//! is owned by a single run, filled during the row pass, and drained into the
//! finding log at the end.

use std::collections::BTreeMap;

use crate::finding::{FindingLog, Locator};
use crate::schema::duplicate_values;
use crate::vocabulary::FormulaSentinel;

/// Accumulated identifiers and cell references for one validation run.
#[derive(Debug, Clone, Default)]
pub struct RunTally {
    druids: Vec<String>,
    source_ids: Vec<String>,
    blank_source_ids: Vec<String>,
    sentinels: BTreeMap<FormulaSentinel, Vec<String>>,
}

impl RunTally {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-blank druid.
    pub fn record_druid(&mut self, druid: &str) {
        self.druids.push(druid.to_string());
    }

    /// Record a non-blank source id.
    pub fn record_source_id(&mut self, source_id: &str) {
        self.source_ids.push(source_id.to_string());
    }

    /// Record the reference of a blank source-id cell.
    pub fn record_blank_source_id(&mut self, cell_ref: &str) {
        self.blank_source_ids.push(cell_ref.to_string());
    }

    /// Record the reference of a cell holding a formula-error sentinel.
    pub fn record_sentinel(&mut self, sentinel: FormulaSentinel, cell_ref: &str) {
        self.sentinels
            .entry(sentinel)
            .or_default()
            .push(cell_ref.to_string());
    }

    /// Number of druids recorded.
    #[must_use]
    pub fn druid_count(&self) -> usize {
        self.druids.len()
    }

    /// Cell references recorded for a sentinel kind.
    #[must_use]
    pub fn sentinel_cells(&self, sentinel: FormulaSentinel) -> &[String] {
        self.sentinels
            .get(&sentinel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Emit the end-of-run findings.
    ///
    /// In order: duplicate druids, blank source ids (always reported, even
    /// with an empty locator), duplicate source ids, then one finding per
    /// sentinel kind with hits.
    pub fn report(self, log: &mut FindingLog) {
        let duplicate_druids = duplicate_values(self.druids.iter().map(String::as_str));
        if !duplicate_druids.is_empty() {
            log.error(Locator::label(duplicate_druids.join(", ")), "Duplicate druids");
        }

        log.info(
            Locator::label(self.blank_source_ids.join(", ")),
            "Blank source ID",
        );

        let duplicate_source_ids = duplicate_values(self.source_ids.iter().map(String::as_str));
        if !duplicate_source_ids.is_empty() {
            log.info(
                Locator::label(duplicate_source_ids.join(", ")),
                "Duplicate source IDs",
            );
        }

        for (sentinel, cells) in &self.sentinels {
            if cells.is_empty() {
                continue;
            }
            let locator = Locator::label(cells.join(", "));
            if sentinel.is_error() {
                log.error(locator, sentinel.description());
            } else {
                log.warning(locator, sentinel.description());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    #[test]
    fn test_empty_tally_reports_blank_source_ids_only() {
        let mut log = FindingLog::new();
        RunTally::new().report(&mut log);
        let findings: Vec<_> = log.iter().collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].message, "Blank source ID");
        assert_eq!(findings[0].locator.as_str(), "");
    }

    #[test]
    fn test_report_order() {
        let mut tally = RunTally::new();
        tally.record_druid("aa111aa1111");
        tally.record_druid("bb222bb2222");
        tally.record_druid("aa111aa1111");
        tally.record_source_id("s1");
        tally.record_source_id("s1");
        tally.record_blank_source_id("B4");
        tally.record_blank_source_id("B5");
        tally.record_sentinel(FormulaSentinel::Value, "C3");
        tally.record_sentinel(FormulaSentinel::Zero, "D3");
        tally.record_sentinel(FormulaSentinel::NotAvailable, "E3");
        tally.record_sentinel(FormulaSentinel::NotAvailable, "E4");
        assert_eq!(tally.sentinel_cells(FormulaSentinel::NotAvailable), ["E3", "E4"]);
        assert!(tally.sentinel_cells(FormulaSentinel::Ref).is_empty());

        let mut log = FindingLog::new();
        tally.report(&mut log);
        let summary: Vec<(Severity, &str, &str)> = log
            .iter()
            .map(|f| (f.severity, f.message.as_str(), f.locator.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Severity::Error, "Duplicate druids", "aa111aa1111"),
                (Severity::Info, "Blank source ID", "B4, B5"),
                (Severity::Info, "Duplicate source IDs", "s1"),
                (Severity::Error, "#N/A error in cell", "E3, E4"),
                (Severity::Warning, "Cell value is 0", "D3"),
                (Severity::Error, "#VALUE! error in cell", "C3"),
            ]
        );
    }
}
