use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product};

pub mod errors;
pub mod product;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over the whole catalog.
pub trait CatalogReader {
    /// List every stored product in insertion order.
    fn list_all(&self) -> RepositoryResult<Vec<Product>>;
    /// Number of stored products.
    fn count_products(&self) -> RepositoryResult<usize>;
}

/// Write operations used by the full-replace import.
pub trait CatalogWriter {
    /// Delete every stored product, returning how many were removed.
    fn clear_all(&self) -> RepositoryResult<usize>;
    /// Insert `products`, returning one outcome per input row in the same
    /// order. A failing row must not prevent the others from being stored.
    fn bulk_insert(&self, products: &[NewProduct]) -> Vec<RepositoryResult<()>>;
}
