//! Full-replace writer: clear the catalog, then insert accepted rows in
//! bounded batches while collecting a per-row outcome.

use crate::catalog::normalize::RowRejection;
use crate::catalog::report::{ImportReport, ReportAccumulator};
use crate::domain::product::NewProduct;
use crate::repository::{CatalogWriter, RepositoryError};

pub const DEFAULT_BATCH_SIZE: usize = 25;
pub const MAX_BATCH_SIZE: usize = 500;

/// A normalized, deduplicated row waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedRow {
    pub row_number: usize,
    pub product: NewProduct,
}

/// Progress of one replace run.
///
/// `Idle -> Clearing -> Inserting(1..n) -> Done`, or `Clearing -> Failed`
/// when the catalog could not be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceState {
    Idle,
    Clearing,
    Inserting { batch: usize, of: usize },
    Done,
    Failed,
}

#[derive(Debug)]
pub struct BatchReplaceEngine {
    batch_size: usize,
    state: ReplaceState,
}

impl Default for BatchReplaceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchReplaceEngine {
    /// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            state: ReplaceState::Idle,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn state(&self) -> ReplaceState {
        self.state
    }

    fn transition(&mut self, next: ReplaceState) {
        log::debug!("Catalog replace: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Replaces the catalog held by `store` with `accepted`.
    ///
    /// `report` already carries the rows rejected upstream. A failed clear
    /// discards it and returns an aborted report without inserting anything.
    pub fn run<S>(
        &mut self,
        store: &S,
        accepted: Vec<AcceptedRow>,
        mut report: ReportAccumulator,
    ) -> ImportReport
    where
        S: CatalogWriter + ?Sized,
    {
        self.transition(ReplaceState::Clearing);
        match store.clear_all() {
            Ok(removed) => log::info!("Cleared {removed} products before import"),
            Err(e) => {
                log::error!("Failed to clear catalog, import aborted: {e}");
                self.transition(ReplaceState::Failed);
                return ImportReport::aborted(
                    report.total_rows(),
                    format!("catalog clear failed: {e}"),
                );
            }
        }

        let total_batches = accepted.len().div_ceil(self.batch_size);
        for (idx, batch) in accepted.chunks(self.batch_size).enumerate() {
            self.transition(ReplaceState::Inserting {
                batch: idx + 1,
                of: total_batches,
            });
            report.merge(insert_batch(store, batch));
        }

        self.transition(ReplaceState::Done);
        report.finish()
    }
}

/// Inserts one batch and tallies its outcome.
fn insert_batch<S>(store: &S, batch: &[AcceptedRow]) -> ReportAccumulator
where
    S: CatalogWriter + ?Sized,
{
    let products = batch
        .iter()
        .map(|row| row.product.clone())
        .collect::<Vec<_>>();
    let mut outcomes = store.bulk_insert(&products).into_iter();

    let mut tally = ReportAccumulator::default();
    for row in batch {
        let outcome = outcomes.next().unwrap_or_else(|| {
            Err(RepositoryError::Database(
                "store returned no outcome for row".to_string(),
            ))
        });
        match outcome {
            Ok(()) => tally.record_imported(1),
            Err(e) => {
                log::warn!(
                    "Row {} ({}) was not stored: {e}",
                    row.row_number,
                    row.product.product_ref
                );
                tally.push_failure(
                    row.row_number,
                    Some(row.product.product_ref.to_string()),
                    RowRejection::Store(e.to_string()).to_string(),
                );
            }
        }
    }
    tally
}
