//! Domain entities shared by the import pipeline, the store and the services.

pub mod field;
pub mod product;
pub mod types;
