//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the `From` impls that bridge them live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::forms::import_export::UploadParseError;
    use crate::repository::RepositoryError;
    use crate::services::errors::ServiceError;
    use crate::services::import_export::DownloadError;

    impl From<UploadParseError> for ServiceError {
        fn from(val: UploadParseError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<DownloadError> for ServiceError {
        fn from(val: DownloadError) -> Self {
            match val {
                DownloadError::InvalidFormat(_) => ServiceError::Form(val.to_string()),
                _ => ServiceError::Internal,
            }
        }
    }

    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            log::error!("Repository error: {val}");
            ServiceError::Internal
        }
    }
}
