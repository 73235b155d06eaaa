use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::forms::import_export::UploadImportForm;
use crate::models::config::ImportSettings;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::catalog::{
    ImportGate, count_catalog as count_catalog_service, download_catalog as download_catalog_service,
    upload_catalog as upload_catalog_service,
};

#[derive(Deserialize)]
struct DownloadQueryParams {
    format: Option<String>,
}

fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Form(message) => HttpResponse::BadRequest().json(json!({ "error": message })),
        ServiceError::Internal => {
            log::error!("Failed to {action}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/v1/catalog/import")]
pub async fn import_catalog(
    repo: web::Data<DieselRepository>,
    settings: web::Data<ImportSettings>,
    gate: web::Data<ImportGate>,
    MultipartForm(mut form): MultipartForm<UploadImportForm>,
) -> impl Responder {
    let result = web::block(move || {
        gate.run(|| upload_catalog_service(&mut form, settings.get_ref(), repo.get_ref()))
    })
    .await;

    match result {
        Ok(Ok(report)) if report.is_aborted() => HttpResponse::InternalServerError().json(report),
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(err)) => error_response(err, "import catalog"),
        Err(e) => {
            log::error!("Catalog import task failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/catalog/export")]
pub async fn export_catalog(
    params: web::Query<DownloadQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let format = params.into_inner().format.unwrap_or_else(|| "csv".to_string());
    let result = web::block(move || download_catalog_service(&format, repo.get_ref())).await;

    match result {
        Ok(Ok(file)) => HttpResponse::Ok()
            .append_header(("Content-Type", file.content_type))
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Ok(Err(err)) => error_response(err, "export catalog"),
        Err(e) => {
            log::error!("Catalog export task failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/catalog/count")]
pub async fn catalog_count(repo: web::Data<DieselRepository>) -> impl Responder {
    match web::block(move || count_catalog_service(repo.get_ref())).await {
        Ok(Ok(count)) => HttpResponse::Ok().json(json!({ "count": count })),
        Ok(Err(err)) => error_response(err, "count catalog"),
        Err(e) => {
            log::error!("Catalog count task failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
