use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

use crate::catalog::mapping::ColumnMapping;
use crate::catalog::normalize::ImportMode;
use crate::catalog::parser::{ParsedFeed, parse_feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for UploadFormat {
    type Error = UploadParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(UploadParseError::InvalidFormat(other.to_string())),
        }
    }
}

/// Multipart body of a catalog import request.
#[derive(MultipartForm)]
pub struct UploadImportForm {
    #[multipart(limit = "25MB")]
    pub file: TempFile,
    pub format: Text<String>,
    /// `full` (default) or `names_only`.
    pub mode: Option<Text<String>>,
    /// JSON object of canonical field to source column name.
    pub mapping: Option<Text<String>>,
}

/// A validated upload, ready for the import pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpload {
    pub format: UploadFormat,
    pub mode: ImportMode,
    pub mapping: Option<ColumnMapping>,
    pub feed: ParsedFeed,
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("invalid upload format: {0}")]
    InvalidFormat(String),
    #[error("invalid import mode: {0}")]
    InvalidMode(String),
    #[error("uploaded file is missing")]
    MissingFile,
    #[error("uploaded file extension does not match selected format")]
    ExtensionMismatch,
    #[error("uploaded file content type does not match selected format")]
    ContentTypeMismatch,
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("failed to parse XLSX")]
    XlsxParseFailed,
    #[error("uploaded file has no worksheet")]
    XlsxMissingSheet,
    #[error("header validation failed: {0}")]
    HeaderValidation(String),
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<calamine::Error> for UploadParseError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

pub fn parse_upload(form: &mut UploadImportForm) -> Result<ParsedUpload, UploadParseError> {
    let format = UploadFormat::try_from(form.format.as_str())?;
    let mode = match form.mode.as_ref() {
        Some(mode) => ImportMode::try_from(mode.as_str())
            .map_err(|_| UploadParseError::InvalidMode(mode.trim().to_string()))?,
        None => ImportMode::Full,
    };
    let mapping = form
        .mapping
        .as_ref()
        .filter(|mapping| !mapping.trim().is_empty())
        .map(|mapping| ColumnMapping::from_json(Some(mapping.as_str())));

    validate_file_meta(form, format)?;

    let feed = match format {
        UploadFormat::Csv => parse_feed(&read_text(form)?),
        UploadFormat::Xlsx => parse_xlsx_feed(form)?,
    };

    validate_headers(&feed)?;

    Ok(ParsedUpload {
        format,
        mode,
        mapping,
        feed,
    })
}

/// Rejects a feed without a usable header row before the catalog is touched.
fn validate_headers(feed: &ParsedFeed) -> Result<(), UploadParseError> {
    if feed.is_empty() {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    }
    Ok(())
}

fn validate_file_meta(
    form: &UploadImportForm,
    format: UploadFormat,
) -> Result<(), UploadParseError> {
    let Some(file_name) = form.file.file_name.as_ref() else {
        return Err(UploadParseError::MissingFile);
    };

    let extension_ok = match format {
        UploadFormat::Csv => {
            let name = file_name.to_ascii_lowercase();
            name.ends_with(".csv") || name.ends_with(".txt")
        }
        UploadFormat::Xlsx => file_name.to_ascii_lowercase().ends_with(".xlsx"),
    };

    if !extension_ok {
        return Err(UploadParseError::ExtensionMismatch);
    }

    if let Some(content_type) = form.file.content_type.as_ref() {
        let mime = content_type.essence_str();
        let content_type_ok = match format {
            UploadFormat::Csv => matches!(
                mime,
                "text/csv"
                    | "text/plain"
                    | "application/csv"
                    | "application/vnd.ms-excel"
                    | "application/octet-stream"
            ),
            UploadFormat::Xlsx => matches!(
                mime,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                    | "application/octet-stream"
            ),
        };

        if !content_type_ok {
            return Err(UploadParseError::ContentTypeMismatch);
        }
    }

    Ok(())
}

fn read_text(form: &mut UploadImportForm) -> Result<String, UploadParseError> {
    let file = form.file.file.as_file_mut();
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn parse_xlsx_feed(form: &mut UploadImportForm) -> Result<ParsedFeed, UploadParseError> {
    let path = form.file.file.path().to_path_buf();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(UploadParseError::XlsxMissingSheet)??;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();
    let records = iter
        .enumerate()
        .map(|(idx, row)| (idx + 2, row.iter().map(cell_to_string).collect::<Vec<_>>()))
        .filter(|(_, values)| values.iter().any(|value| !value.trim().is_empty()))
        .collect();

    Ok(ParsedFeed::from_records(headers, records))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_formats() {
        assert_eq!(UploadFormat::try_from(" CSV ").unwrap(), UploadFormat::Csv);
        assert_eq!(UploadFormat::try_from("xlsx").unwrap(), UploadFormat::Xlsx);
        let err = UploadFormat::try_from("ods").unwrap_err().to_string();
        assert!(err.contains("invalid upload format"));
    }

    #[test]
    fn rejects_feed_without_header() {
        let err = validate_headers(&parse_feed("\n \n")).unwrap_err().to_string();
        assert!(err.contains("missing header row"));
    }

    #[test]
    fn accepts_feed_with_header_only() {
        assert!(validate_headers(&parse_feed("ref,name\n")).is_ok());
    }

    #[test]
    fn xlsx_cells_render_as_text() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("A-1".into())), "A-1");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
    }
}
