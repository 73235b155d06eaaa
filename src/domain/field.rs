use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Logical product attribute every accepted feed row is mapped onto.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Ref,
    PrimaryName,
    SecondaryName,
    Line,
    ProductType,
    Notice,
    Description,
    ActiveIngredients,
    UsageInstructions,
    Size,
    UnitPrice,
    MainImage,
    Images,
    Highlights,
}

impl CanonicalField {
    /// All fields in export column order.
    pub const ALL: [CanonicalField; 14] = [
        Self::Ref,
        Self::PrimaryName,
        Self::SecondaryName,
        Self::Line,
        Self::ProductType,
        Self::Notice,
        Self::Description,
        Self::ActiveIngredients,
        Self::UsageInstructions,
        Self::Size,
        Self::UnitPrice,
        Self::MainImage,
        Self::Images,
        Self::Highlights,
    ];

    /// Stable key, also used as the default source column and export header.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ref => "ref",
            Self::PrimaryName => "primary_name",
            Self::SecondaryName => "secondary_name",
            Self::Line => "line",
            Self::ProductType => "product_type",
            Self::Notice => "notice",
            Self::Description => "description",
            Self::ActiveIngredients => "active_ingredients",
            Self::UsageInstructions => "usage_instructions",
            Self::Size => "size",
            Self::UnitPrice => "unit_price",
            Self::MainImage => "main_image",
            Self::Images => "images",
            Self::Highlights => "highlights",
        }
    }

    /// Column names seen in historical feeds, tried after the configured mapping.
    pub const fn fallback_columns(self) -> &'static [&'static str] {
        match self {
            Self::Ref => &["Ref", "REF", "reference", "Reference", "sku", "SKU", "code"],
            Self::PrimaryName => &["name", "Name", "primaryName", "nom", "Nom", "title"],
            Self::SecondaryName => &["secondaryName", "subtitle", "Subtitle", "nom2"],
            Self::Line => &["Line", "gamme", "Gamme", "range"],
            Self::ProductType => &["productType", "type", "Type", "category"],
            Self::Notice => &["Notice", "warning", "warnings"],
            Self::Description => &["Description", "desc"],
            Self::ActiveIngredients => &[
                "activeIngredients",
                "ingredients",
                "Ingredients",
                "actifs",
            ],
            Self::UsageInstructions => &["usageInstructions", "usage", "Usage", "conseils"],
            Self::Size => &["Size", "volume", "contenance", "format"],
            Self::UnitPrice => &["unitPrice", "price", "Price", "prix", "Prix"],
            Self::MainImage => &["mainImage", "image", "Image", "image_url"],
            Self::Images => &["Images", "gallery", "image_urls", "photos"],
            Self::Highlights => &["Highlights", "points_forts", "bullets", "features"],
        }
    }
}

impl Display for CanonicalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for CanonicalField {
    type Error = TypeConstraintError;

    /// Accepts the snake_case key as well as camelCase or dashed spellings.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let wanted = fold_key(value);
        Self::ALL
            .into_iter()
            .find(|field| fold_key(field.as_str()) == wanted)
            .ok_or_else(|| {
                TypeConstraintError::InvalidValue(format!("canonical field: {}", value.trim()))
            })
    }
}

fn fold_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
