//! Conversion of one raw feed row into a canonical [`NewProduct`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::mapping::ColumnMapping;
use crate::catalog::parser::RawRow;
use crate::domain::field::CanonicalField;
use crate::domain::product::NewProduct;
use crate::domain::types::{ImageUrl, ProductPrice, ProductRef, TypeConstraintError};

/// Delimiters accepted between items of a multi-valued field.
const LIST_DELIMITERS: [char; 4] = [',', '|', ';', '\n'];

/// Why a row was excluded from the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowRejection {
    #[error("missing_ref")]
    MissingRef,
    #[error("duplicate_ref_in_batch")]
    DuplicateRefInBatch,
    #[error("store: {0}")]
    Store(String),
}

/// Which fields an import run carries into the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Every canonical field is imported.
    #[default]
    Full,
    /// Identity, names, classification, size and imagery only. Prices are
    /// reset to zero and descriptive fields are left empty.
    NamesOnly,
}

impl TryFrom<&str> for ImportMode {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "full" => Ok(Self::Full),
            "names_only" | "names-only" => Ok(Self::NamesOnly),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "import mode: {other}"
            ))),
        }
    }
}

/// Normalizes `row` into a product record.
///
/// The only rejection is a missing primary key. Unparseable prices become
/// zero and invalid image URLs are dropped.
pub fn normalize_row(
    row: &RawRow,
    mapping: &ColumnMapping,
    mode: ImportMode,
) -> Result<NewProduct, RowRejection> {
    let resolve = |field| mapping.resolve(field, row);
    let text = |field| resolve(field).trim().to_string();

    let product_ref =
        ProductRef::new(resolve(CanonicalField::Ref)).map_err(|_| RowRejection::MissingRef)?;

    let images = split_multi_value(resolve(CanonicalField::Images))
        .iter()
        .filter_map(|candidate| sanitize_url(candidate))
        .collect::<Vec<_>>();
    let main_image =
        sanitize_url(resolve(CanonicalField::MainImage)).or_else(|| images.first().cloned());

    let mut product = NewProduct {
        product_ref,
        primary_name: text(CanonicalField::PrimaryName),
        secondary_name: text(CanonicalField::SecondaryName),
        line: text(CanonicalField::Line),
        product_type: text(CanonicalField::ProductType),
        notice: text(CanonicalField::Notice),
        description: text(CanonicalField::Description),
        active_ingredients: text(CanonicalField::ActiveIngredients),
        usage_instructions: text(CanonicalField::UsageInstructions),
        size: text(CanonicalField::Size),
        unit_price: parse_price(resolve(CanonicalField::UnitPrice)),
        main_image,
        images,
        highlights: split_multi_value(resolve(CanonicalField::Highlights)),
    };

    if mode == ImportMode::NamesOnly {
        product.unit_price = ProductPrice::default();
        product.notice.clear();
        product.description.clear();
        product.active_ingredients.clear();
        product.usage_instructions.clear();
        product.highlights.clear();
    }

    Ok(product)
}

/// Parses a price such as `12.50`, `12,50 €` or `1,299.00`, rounded to
/// cents; anything that is not a finite non-negative number becomes zero.
pub fn parse_price(raw: &str) -> ProductPrice {
    let compact = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£'))
        .collect::<String>();

    let numeric = if compact.contains('.') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    };

    numeric
        .parse::<f64>()
        .ok()
        .and_then(|value| ProductPrice::new((value * 100.0).round() / 100.0).ok())
        .unwrap_or_default()
}

/// Splits a multi-valued cell into trimmed, non-empty items.
///
/// JSON arrays (`["a","b"]`) and brace lists (`{a,b}`) are unwrapped first.
/// Every item is split on comma, pipe, semicolon or newline, so a JSON item
/// such as `"soft, light"` yields two entries.
pub fn split_multi_value(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            return items
                .into_iter()
                .flat_map(|item| match item {
                    serde_json::Value::String(s) => split_delimited(&s),
                    serde_json::Value::Null => Vec::new(),
                    other => vec![other.to_string()],
                })
                .collect();
        }
        return split_delimited(&trimmed[1..trimmed.len() - 1]);
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return split_delimited(&trimmed[1..trimmed.len() - 1]);
    }

    split_delimited(trimmed)
}

fn split_delimited(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITERS)
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strips one leading `@` and surrounding whitespace, then keeps the value
/// only if it is an http(s) URL.
pub fn sanitize_url(raw: &str) -> Option<ImageUrl> {
    let trimmed = raw.trim();
    let candidate = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    ImageUrl::new(candidate).ok()
}
