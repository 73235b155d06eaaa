use diesel::prelude::*;

use catalog_sync::schema::products;

mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    let conn = pool.get();
    assert!(conn.is_ok());
}

#[test]
fn migrations_create_an_empty_products_table() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should acquire DB connection");

    let total = products::table
        .count()
        .get_result::<i64>(&mut conn)
        .expect("products table should exist");

    assert_eq!(total, 0);
}

#[test]
fn product_ref_is_unique() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should acquire DB connection");

    diesel::insert_into(products::table)
        .values(products::product_ref.eq("SKU-1"))
        .execute(&mut conn)
        .expect("first insert should succeed");
    let duplicate = diesel::insert_into(products::table)
        .values(products::product_ref.eq("SKU-1"))
        .execute(&mut conn);

    assert!(duplicate.is_err());
}
