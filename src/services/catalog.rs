use std::sync::{Mutex, PoisonError};

use crate::catalog::report::ImportReport;
use crate::catalog::{ImportOptions, import_catalog};
use crate::forms::import_export::{ParsedUpload, UploadImportForm, parse_upload};
use crate::models::config::ImportSettings;
use crate::repository::{CatalogReader, CatalogWriter};
use crate::services::import_export::{DownloadFile, DownloadFormat, render_download_file};

use super::{ServiceError, ServiceResult};

const DOWNLOAD_BASE_NAME: &str = "catalog";

/// Serializes full-replace imports so one run's clear never lands between
/// another run's inserts.
#[derive(Debug, Default)]
pub struct ImportGate {
    lock: Mutex<()>,
}

impl ImportGate {
    /// Runs `import` while no other import holds the gate.
    pub fn run<T>(&self, import: impl FnOnce() -> T) -> T {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        import()
    }
}

/// Validates a multipart upload and replaces the catalog with its rows.
pub fn upload_catalog<R>(
    form: &mut UploadImportForm,
    settings: &ImportSettings,
    repo: &R,
) -> ServiceResult<ImportReport>
where
    R: CatalogWriter + ?Sized,
{
    let upload = match parse_upload(form) {
        Ok(upload) => upload,
        Err(e) => {
            log::warn!("Rejected catalog upload: {e}");
            return Err(e.into());
        }
    };

    import_parsed_upload(upload, settings, repo)
}

/// Runs the import pipeline over an already parsed upload.
///
/// The mapping sent with the upload is layered over the configured one. A
/// feed without a header row is refused so an empty file cannot wipe the
/// catalog.
pub fn import_parsed_upload<R>(
    upload: ParsedUpload,
    settings: &ImportSettings,
    repo: &R,
) -> ServiceResult<ImportReport>
where
    R: CatalogWriter + ?Sized,
{
    if upload.feed.is_empty() {
        return Err(ServiceError::Form("feed has no header row".to_string()));
    }

    let options = ImportOptions {
        mapping: settings.mapping(upload.mapping.as_ref()),
        mode: upload.mode,
        batch_size: settings.batch_size,
    };

    log::info!(
        "Importing {:?} feed with {} rows ({:?} mode)",
        upload.format,
        upload.feed.rows.len(),
        options.mode
    );

    Ok(import_catalog(&upload.feed, &options, repo))
}

/// Renders the whole catalog in the requested format.
pub fn download_catalog<R>(format: &str, repo: &R) -> ServiceResult<DownloadFile>
where
    R: CatalogReader + ?Sized,
{
    let format = DownloadFormat::try_from(format)?;
    let products = repo
        .list_all()?
        .into_iter()
        .map(|product| product.record)
        .collect::<Vec<_>>();

    log::info!("Rendering {} products as {format:?}", products.len());

    match render_download_file(DOWNLOAD_BASE_NAME, format, &products) {
        Ok(file) => Ok(file),
        Err(e) => {
            log::error!("Failed to render catalog download: {e}");
            Err(e.into())
        }
    }
}

/// Number of products currently stored.
pub fn count_catalog<R>(repo: &R) -> ServiceResult<usize>
where
    R: CatalogReader + ?Sized,
{
    Ok(repo.count_products()?)
}
