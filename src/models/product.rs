use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{ImageUrl, ProductId, ProductPrice, ProductRef};
use crate::repository::RepositoryError;

/// Diesel model representing the `products` table.
///
/// `images` and `highlights` hold JSON arrays of strings; an empty
/// `main_image` means the product has no primary picture.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub product_ref: String,
    pub primary_name: String,
    pub secondary_name: String,
    pub line: String,
    pub product_type: String,
    pub notice: String,
    pub description: String,
    pub active_ingredients: String,
    pub usage_instructions: String,
    pub size: String,
    pub unit_price: f64,
    pub main_image: String,
    pub images: String,
    pub highlights: String,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Product`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub product_ref: String,
    pub primary_name: String,
    pub secondary_name: String,
    pub line: String,
    pub product_type: String,
    pub notice: String,
    pub description: String,
    pub active_ingredients: String,
    pub usage_instructions: String,
    pub size: String,
    pub unit_price: f64,
    pub main_image: String,
    pub images: String,
    pub highlights: String,
}

impl TryFrom<&DomainNewProduct> for NewProduct {
    type Error = RepositoryError;

    fn try_from(product: &DomainNewProduct) -> Result<Self, Self::Error> {
        let images = product
            .images
            .iter()
            .map(ImageUrl::as_str)
            .collect::<Vec<_>>();

        Ok(Self {
            product_ref: product.product_ref.as_str().to_string(),
            primary_name: product.primary_name.clone(),
            secondary_name: product.secondary_name.clone(),
            line: product.line.clone(),
            product_type: product.product_type.clone(),
            notice: product.notice.clone(),
            description: product.description.clone(),
            active_ingredients: product.active_ingredients.clone(),
            usage_instructions: product.usage_instructions.clone(),
            size: product.size.clone(),
            unit_price: product.unit_price.get(),
            main_image: product
                .main_image
                .as_ref()
                .map(|url| url.as_str().to_string())
                .unwrap_or_default(),
            images: serde_json::to_string(&images)?,
            highlights: serde_json::to_string(&product.highlights)?,
        })
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = RepositoryError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        let main_image = match product.main_image.trim() {
            "" => None,
            url => Some(ImageUrl::new(url)?),
        };
        let images = serde_json::from_str::<Vec<String>>(&product.images)?
            .into_iter()
            .map(ImageUrl::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: ProductId::new(product.id)?,
            created_at: product.created_at,
            record: DomainNewProduct {
                product_ref: ProductRef::new(product.product_ref)?,
                primary_name: product.primary_name,
                secondary_name: product.secondary_name,
                line: product.line,
                product_type: product.product_type,
                notice: product.notice,
                description: product.description,
                active_ingredients: product.active_ingredients,
                usage_instructions: product.usage_instructions,
                size: product.size,
                unit_price: ProductPrice::new(product.unit_price)?,
                main_image,
                images,
                highlights: serde_json::from_str(&product.highlights)?,
            },
        })
    }
}
