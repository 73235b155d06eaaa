//! Serializes the catalog back into the delimited feed shape accepted by
//! [`crate::catalog::parser::parse_feed`].

use crate::domain::field::CanonicalField;
use crate::domain::product::NewProduct;
use crate::domain::types::ImageUrl;
use crate::repository::{CatalogReader, RepositoryResult};

/// Separator used when re-joining multi-valued fields.
pub const LIST_SEPARATOR: &str = ";";

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

/// Header names in export order.
pub fn export_headers() -> Vec<&'static str> {
    CanonicalField::ALL
        .into_iter()
        .map(CanonicalField::as_str)
        .collect()
}

/// Value of `field` for `product`, with list fields joined by [`LIST_SEPARATOR`].
pub fn export_cell(product: &NewProduct, field: CanonicalField) -> ExportCell {
    let text = |value: &str| ExportCell::Text(value.to_string());
    match field {
        CanonicalField::Ref => text(product.product_ref.as_str()),
        CanonicalField::PrimaryName => text(&product.primary_name),
        CanonicalField::SecondaryName => text(&product.secondary_name),
        CanonicalField::Line => text(&product.line),
        CanonicalField::ProductType => text(&product.product_type),
        CanonicalField::Notice => text(&product.notice),
        CanonicalField::Description => text(&product.description),
        CanonicalField::ActiveIngredients => text(&product.active_ingredients),
        CanonicalField::UsageInstructions => text(&product.usage_instructions),
        CanonicalField::Size => text(&product.size),
        CanonicalField::UnitPrice => ExportCell::Number(product.unit_price.get()),
        CanonicalField::MainImage => {
            text(product.main_image.as_ref().map(ImageUrl::as_str).unwrap_or(""))
        }
        CanonicalField::Images => ExportCell::Text(
            product
                .images
                .iter()
                .map(ImageUrl::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        ),
        CanonicalField::Highlights => ExportCell::Text(product.highlights.join(LIST_SEPARATOR)),
    }
}

/// Cells of one product in export order.
pub fn export_row(product: &NewProduct) -> Vec<ExportCell> {
    CanonicalField::ALL
        .into_iter()
        .map(|field| export_cell(product, field))
        .collect()
}

/// Renders `products` as delimited text.
///
/// Text cells are always quoted with embedded quotes doubled; numbers are
/// written unquoted with two decimals.
pub fn render_feed<'a>(products: impl IntoIterator<Item = &'a NewProduct>) -> String {
    let mut out = export_headers()
        .into_iter()
        .map(quote)
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for product in products {
        let line = export_row(product)
            .iter()
            .map(|cell| match cell {
                ExportCell::Text(value) => quote(value),
                ExportCell::Number(value) => format!("{value:.2}"),
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Reads the full catalog from `store` and renders it.
pub fn export_catalog<R>(store: &R) -> RepositoryResult<String>
where
    R: CatalogReader + ?Sized,
{
    let products = store.list_all()?;
    log::info!("Exporting {} products", products.len());
    Ok(render_feed(products.iter().map(|p| &p.record)))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parser::parse_feed;
    use crate::domain::types::{ProductPrice, ProductRef};

    fn sample() -> NewProduct {
        NewProduct {
            primary_name: "Crème \"douce\"".into(),
            description: "<p>Soft, light</p>\nTwo lines".into(),
            unit_price: ProductPrice::new(12.5).unwrap(),
            main_image: Some(ImageUrl::new("https://ok.test/main.png").unwrap()),
            images: vec![
                ImageUrl::new("https://ok.test/1.png").unwrap(),
                ImageUrl::new("https://ok.test/2.png").unwrap(),
            ],
            highlights: vec!["soft".into(), "light".into()],
            ..NewProduct::with_ref(ProductRef::new("A-1").unwrap())
        }
    }

    #[test]
    fn header_lists_canonical_fields() {
        let text = render_feed(std::iter::empty());

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("\"ref\",\"primary_name\","));
        assert!(text.trim_end().ends_with("\"images\",\"highlights\""));
    }

    #[test]
    fn quotes_text_and_leaves_numbers_bare() {
        let product = sample();
        let text = render_feed([&product]);
        let row = text.lines().nth(1).unwrap();

        assert!(row.starts_with("\"A-1\",\"Crème \"\"douce\"\"\","));
        assert!(text.contains(",12.50,"));
        assert!(text.contains("\"https://ok.test/1.png;https://ok.test/2.png\""));
        assert!(text.contains("\"soft;light\""));
    }

    #[test]
    fn output_parses_back_into_the_same_cells() {
        let product = sample();
        let feed = parse_feed(&render_feed([&product]));

        assert_eq!(feed.rows.len(), 1);
        let row = &feed.rows[0];
        assert_eq!(row.get("primary_name"), Some("Crème \"douce\""));
        assert_eq!(
            row.get("description"),
            Some("<p>Soft, light</p>\nTwo lines")
        );
        assert_eq!(row.get("unit_price"), Some("12.50"));
        assert_eq!(row.get("main_image"), Some("https://ok.test/main.png"));
    }

    #[test]
    fn output_is_standard_csv() {
        let product = sample();
        let text = render_feed([&product]);

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .expect("export should be valid csv");

        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "A-1");
        assert_eq!(&records[0][1], "Crème \"douce\"");
    }

    #[test]
    fn missing_main_image_exports_empty() {
        let product = NewProduct::with_ref(ProductRef::new("B").unwrap());

        assert_eq!(
            export_cell(&product, CanonicalField::MainImage),
            ExportCell::Text(String::new())
        );
        assert_eq!(
            export_cell(&product, CanonicalField::UnitPrice),
            ExportCell::Number(0.0)
        );
    }
}
