use std::collections::HashSet;
use std::sync::Mutex;

use chrono::DateTime;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{ProductId, ProductRef};
use crate::repository::{CatalogReader, CatalogWriter, RepositoryError, RepositoryResult};

/// Simple in-memory repository used for unit tests.
///
/// Enforces `ref` uniqueness like the SQLite schema and can be told to fail
/// the clear step or specific rows.
#[derive(Default)]
pub struct TestRepository {
    products: Mutex<Vec<Product>>,
    next_id: Mutex<i32>,
    batch_sizes: Mutex<Vec<usize>>,
    fail_clear: bool,
    failing_refs: HashSet<String>,
}

impl TestRepository {
    pub fn with_refs(refs: &[&str]) -> Self {
        let repo = Self::default();
        let products = refs
            .iter()
            .map(|r| NewProduct::with_ref(ProductRef::new(*r).unwrap()))
            .collect::<Vec<_>>();
        repo.bulk_insert(&products);
        repo.batch_sizes.lock().unwrap().clear();
        repo
    }

    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn failing_on(mut self, product_ref: &str) -> Self {
        self.failing_refs.insert(product_ref.to_string());
        self
    }

    pub fn refs(&self) -> Vec<String> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.record.product_ref.to_string())
            .collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

impl CatalogReader for TestRepository {
    fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        Ok(self.products.lock().unwrap().len())
    }
}

impl CatalogWriter for TestRepository {
    fn clear_all(&self) -> RepositoryResult<usize> {
        if self.fail_clear {
            return Err(RepositoryError::Connection("database is locked".into()));
        }
        let mut products = self.products.lock().unwrap();
        let removed = products.len();
        products.clear();
        Ok(removed)
    }

    fn bulk_insert(&self, batch: &[NewProduct]) -> Vec<RepositoryResult<()>> {
        self.batch_sizes.lock().unwrap().push(batch.len());
        let mut products = self.products.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        batch
            .iter()
            .map(|product| {
                let product_ref = product.product_ref.as_str();
                if self.failing_refs.contains(product_ref)
                    || products
                        .iter()
                        .any(|p| p.record.product_ref.as_str() == product_ref)
                {
                    return Err(RepositoryError::ConstraintViolation(format!(
                        "UNIQUE constraint failed: products.product_ref ({product_ref})"
                    )));
                }
                *next_id += 1;
                products.push(Product {
                    id: ProductId::new(*next_id).unwrap(),
                    created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
                    record: product.clone(),
                });
                Ok(())
            })
            .collect()
    }
}
