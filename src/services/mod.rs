pub mod catalog;
pub mod errors;
pub mod import_export;

pub use errors::{ServiceError, ServiceResult};
