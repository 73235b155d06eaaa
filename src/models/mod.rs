//! Diesel row types and service configuration models.

pub mod config;
pub mod product;
