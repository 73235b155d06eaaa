use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product};
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct};
use crate::repository::{
    CatalogReader, CatalogWriter, DieselRepository, RepositoryError, RepositoryResult,
};

impl CatalogReader for DieselRepository {
    fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let items = products::table
            .order(products::id.asc())
            .select(DbProduct::as_select())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let total = products::table.count().get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }
}

impl CatalogWriter for DieselRepository {
    fn clear_all(&self) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let affected = diesel::delete(products::table).execute(&mut conn)?;

        Ok(affected)
    }

    /// Runs the batch in one transaction with a savepoint per row, so a
    /// rejected row rolls back alone while its siblings commit together.
    fn bulk_insert(&self, products: &[NewProduct]) -> Vec<RepositoryResult<()>> {
        use crate::schema::products;

        let mut conn = match self.conn() {
            Ok(conn) => conn,
            Err(e) => return vec![Err(e); products.len()],
        };

        let mut outcomes = Vec::with_capacity(products.len());
        let committed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for product in products {
                let outcome = DbNewProduct::try_from(product).and_then(|row| {
                    conn.transaction::<_, diesel::result::Error, _>(|conn| {
                        diesel::insert_into(products::table)
                            .values(&row)
                            .execute(conn)
                    })
                    .map(|_| ())
                    .map_err(RepositoryError::from)
                });
                outcomes.push(outcome);
            }
            Ok(())
        });

        match committed {
            Ok(()) => outcomes,
            Err(e) => {
                log::error!("Failed to commit product batch: {e}");
                vec![Err(RepositoryError::from(e)); products.len()]
            }
        }
    }
}
