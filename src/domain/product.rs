use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ImageUrl, ProductId, ProductPrice, ProductRef};

/// A catalog product as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub created_at: NaiveDateTime,
    #[serde(flatten)]
    pub record: NewProduct,
}

/// Canonical product record produced by the import pipeline.
///
/// Optional text fields are stored as empty strings when the feed does not
/// provide them. `main_image` is either empty or an http(s) URL, and every
/// entry of `images` carries an http(s) scheme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    #[serde(rename = "ref")]
    pub product_ref: ProductRef,
    pub primary_name: String,
    pub secondary_name: String,
    pub line: String,
    pub product_type: String,
    pub notice: String,
    pub description: String,
    pub active_ingredients: String,
    pub usage_instructions: String,
    pub size: String,
    pub unit_price: ProductPrice,
    pub main_image: Option<ImageUrl>,
    pub images: Vec<ImageUrl>,
    pub highlights: Vec<String>,
}

impl NewProduct {
    /// Creates a record holding only the primary key; every other field is empty.
    pub fn with_ref(product_ref: ProductRef) -> Self {
        Self {
            product_ref,
            primary_name: String::new(),
            secondary_name: String::new(),
            line: String::new(),
            product_type: String::new(),
            notice: String::new(),
            description: String::new(),
            active_ingredients: String::new(),
            usage_instructions: String::new(),
            size: String::new(),
            unit_price: ProductPrice::default(),
            main_image: None,
            images: Vec::new(),
            highlights: Vec::new(),
        }
    }
}
