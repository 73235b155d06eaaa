//! Bulk catalog synchronization.
//!
//! A feed flows through [`parser`], [`mapping`] and [`normalize`], is
//! deduplicated by [`dedup`] and written by [`replace`] with full-replace
//! semantics. [`export`] renders the stored catalog back into the same
//! tabular shape. [`import_catalog`] is the single entry point shared by the
//! HTTP service and direct callers.

pub mod dedup;
pub mod export;
pub mod mapping;
pub mod normalize;
pub mod parser;
pub mod replace;
pub mod report;

use crate::domain::field::CanonicalField;
use crate::repository::CatalogWriter;

use self::dedup::Deduplicator;
use self::mapping::ColumnMapping;
use self::normalize::{ImportMode, normalize_row};
use self::parser::{ParsedFeed, parse_feed};
use self::replace::{AcceptedRow, BatchReplaceEngine, DEFAULT_BATCH_SIZE};
use self::report::{ImportReport, ReportAccumulator};

/// Per-run import parameters.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub mapping: ColumnMapping,
    pub mode: ImportMode,
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mapping: ColumnMapping::default(),
            mode: ImportMode::Full,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Replaces the catalog in `store` with the rows of `feed`.
///
/// Rows missing a primary key or repeating one already seen in the feed are
/// reported and skipped. Only a failure to clear the catalog aborts the run.
pub fn import_catalog<S>(feed: &ParsedFeed, options: &ImportOptions, store: &S) -> ImportReport
where
    S: CatalogWriter + ?Sized,
{
    let mut report = ReportAccumulator::with_total(feed.rows.len());
    let mut dedup = Deduplicator::new();
    let mut accepted = Vec::with_capacity(feed.rows.len());

    for row in &feed.rows {
        let outcome = normalize_row(row, &options.mapping, options.mode).and_then(|product| {
            dedup.admit(&product.product_ref)?;
            Ok(product)
        });

        match outcome {
            Ok(product) => accepted.push(AcceptedRow {
                row_number: row.row_number,
                product,
            }),
            Err(rejection) => {
                let product_ref = options
                    .mapping
                    .resolve(CanonicalField::Ref, row)
                    .trim();
                log::debug!("Row {} rejected: {rejection}", row.row_number);
                report.push_failure(
                    row.row_number,
                    (!product_ref.is_empty()).then(|| product_ref.to_string()),
                    rejection.to_string(),
                );
            }
        }
    }

    log::info!(
        "Import accepted {} of {} rows, replacing catalog",
        accepted.len(),
        feed.rows.len()
    );

    let report = BatchReplaceEngine::new(options.batch_size).run(store, accepted, report);

    log::info!(
        "Import finished: {:?}, {} imported, {} failed",
        report.status(),
        report.imported(),
        report.failed()
    );
    report
}

/// Parses `text` and imports it; see [`import_catalog`].
pub fn import_catalog_text<S>(text: &str, options: &ImportOptions, store: &S) -> ImportReport
where
    S: CatalogWriter + ?Sized,
{
    import_catalog(&parse_feed(text), options, store)
}
