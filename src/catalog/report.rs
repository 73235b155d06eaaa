use serde::Serialize;

/// One row that did not reach the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Source line of the row; `0` for a run-level failure.
    pub row: usize,
    #[serde(rename = "ref")]
    pub product_ref: Option<String>,
    pub reason: String,
}

/// Terminal state of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Done,
    Failed,
}

/// Outcome of one import run. Built once by [`ReportAccumulator::finish`] or
/// [`ImportReport::aborted`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    status: RunStatus,
    total_rows: usize,
    imported: usize,
    failed: usize,
    failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Report for a run stopped before any row was inserted.
    pub fn aborted(total_rows: usize, reason: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            total_rows,
            imported: 0,
            failed: total_rows,
            failures: vec![ImportFailure {
                row: 0,
                product_ref: None,
                reason: reason.into(),
            }],
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Failed
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn imported(&self) -> usize {
        self.imported
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn failures(&self) -> &[ImportFailure] {
        &self.failures
    }
}

/// Running tally threaded through the import stages.
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    total_rows: usize,
    imported: usize,
    failures: Vec<ImportFailure>,
}

impl ReportAccumulator {
    pub fn with_total(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn record_imported(&mut self, count: usize) {
        self.imported += count;
    }

    pub fn push_failure(
        &mut self,
        row: usize,
        product_ref: Option<String>,
        reason: impl Into<String>,
    ) {
        self.failures.push(ImportFailure {
            row,
            product_ref,
            reason: reason.into(),
        });
    }

    /// Folds a partial tally (for instance one batch) into this one.
    pub fn merge(&mut self, other: ReportAccumulator) {
        self.imported += other.imported;
        self.failures.extend(other.failures);
    }

    pub fn finish(mut self) -> ImportReport {
        self.failures.sort_by_key(|failure| failure.row);
        ImportReport {
            status: RunStatus::Done,
            total_rows: self.total_rows,
            imported: self.imported,
            failed: self.failures.len(),
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_orders_failures_by_row() {
        let mut acc = ReportAccumulator::with_total(4);
        acc.push_failure(5, Some("C".into()), "store: boom");
        acc.push_failure(2, None, "missing_ref");
        acc.record_imported(2);

        let report = acc.finish();

        assert_eq!(report.status(), RunStatus::Done);
        assert_eq!(report.imported(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.failures()[0].row, 2);
        assert_eq!(report.failures()[1].row, 5);
    }

    #[test]
    fn merge_adds_partial_tallies() {
        let mut acc = ReportAccumulator::with_total(3);
        let mut batch = ReportAccumulator::default();
        batch.record_imported(2);
        batch.push_failure(4, Some("X".into()), "store: constraint");

        acc.merge(batch);
        let report = acc.finish();

        assert_eq!(report.imported(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.total_rows(), 3);
    }

    #[test]
    fn aborted_report_serializes_counts() {
        let report = ImportReport::aborted(3, "catalog clear failed");
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["imported"], 0);
        assert_eq!(value["failed"], 3);
        assert_eq!(value["failures"][0]["row"], 0);
        assert!(value["failures"][0]["ref"].is_null());
    }
}
