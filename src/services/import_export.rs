use rust_xlsxwriter::Workbook;
use thiserror::Error;

use crate::catalog::export::{ExportCell, export_headers, export_row, render_feed};
use crate::domain::product::NewProduct;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render xlsx")]
    XlsxRender,
}

impl From<rust_xlsxwriter::XlsxError> for DownloadError {
    fn from(_: rust_xlsxwriter::XlsxError) -> Self {
        Self::XlsxRender
    }
}

/// Renders `products` as a downloadable catalog file.
///
/// Both formats share the header and column order of the CSV feed, so either
/// can be uploaded back unchanged.
pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    products: &[NewProduct],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => Ok(DownloadFile {
            file_name: format!("{base_name}.csv"),
            content_type: "text/csv; charset=utf-8",
            bytes: render_feed(products).into_bytes(),
        }),
        DownloadFormat::Xlsx => {
            let mut workbook = Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in export_headers().into_iter().enumerate() {
                worksheet.write_string(0, col_idx as u16, header)?;
            }

            for (row_idx, product) in products.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, cell) in export_row(product).into_iter().enumerate() {
                    match cell {
                        ExportCell::Text(value) => {
                            worksheet.write_string(sheet_row, col_idx as u16, value)?;
                        }
                        ExportCell::Number(value) => {
                            worksheet.write_number(sheet_row, col_idx as u16, value)?;
                        }
                    }
                }
            }

            let bytes = workbook.save_to_buffer()?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DownloadFormat, render_download_file};
    use crate::domain::product::NewProduct;
    use crate::domain::types::{ProductPrice, ProductRef};

    fn sample() -> NewProduct {
        NewProduct {
            primary_name: "=SUM(A1:A2)".into(),
            unit_price: ProductPrice::new(3.0).unwrap(),
            ..NewProduct::with_ref(ProductRef::new("SKU-123").unwrap())
        }
    }

    #[test]
    fn parses_download_formats() {
        assert_eq!(DownloadFormat::try_from("CSV").unwrap(), DownloadFormat::Csv);
        assert_eq!(DownloadFormat::try_from(" xlsx").unwrap(), DownloadFormat::Xlsx);
        assert!(DownloadFormat::try_from("pdf").is_err());
    }

    #[test]
    fn csv_export_keeps_cells_verbatim() {
        let file = render_download_file("catalog", DownloadFormat::Csv, &[sample()])
            .expect("csv render should succeed");

        assert_eq!(file.file_name, "catalog.csv");
        let csv_output = String::from_utf8(file.bytes).expect("csv output should be utf-8");
        assert!(csv_output.contains("\"SKU-123\",\"=SUM(A1:A2)\""));
        assert!(csv_output.contains(",3.00,"));
    }

    #[test]
    fn xlsx_export_produces_a_workbook() {
        let file = render_download_file("catalog", DownloadFormat::Xlsx, &[sample()])
            .expect("xlsx render should succeed");

        assert_eq!(file.file_name, "catalog.xlsx");
        assert!(file.content_type.contains("spreadsheetml"));
        assert!(file.bytes.starts_with(b"PK"));
    }
}
