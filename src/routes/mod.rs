use actix_web::web;

pub mod catalog;

/// Registers the catalog API under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(catalog::import_catalog)
            .service(catalog::export_catalog)
            .service(catalog::catalog_count),
    );
}
