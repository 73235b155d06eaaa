//! Bulk catalog synchronization service.
//!
//! The `data` feature exposes the import/export pipeline and the SQLite store;
//! `server` adds the multipart forms, services and Actix-web routes used by
//! the `catalog-sync` binary.

#[cfg(feature = "data")]
pub mod catalog;
#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
