use std::io;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};

use catalog_sync::db::{establish_connection_pool, run_migrations};
use catalog_sync::models::config::ServerConfig;
use catalog_sync::repository::DieselRepository;
use catalog_sync::routes;
use catalog_sync::services::catalog::ImportGate;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
        .set_default("database_url", "catalog.db")?
        .set_default("address", "127.0.0.1")?
        .set_default("port", 8080)?
        .add_source(File::with_name("config/settings").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = load_config().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        io::Error::other(e)
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to open database {}: {e}", server_config.database_url);
        io::Error::other(e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run migrations: {e}");
        io::Error::other(e)
    })?;

    let repo = web::Data::new(DieselRepository::new(pool));
    let import_settings = web::Data::new(server_config.import.clone());
    let import_gate = web::Data::new(ImportGate::default());

    log::info!(
        "Starting catalog sync on {}:{} (batch size {})",
        server_config.address,
        server_config.port,
        server_config.import.batch_size
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(import_settings.clone())
            .app_data(import_gate.clone())
            .configure(routes::configure)
    })
    .bind((server_config.address.as_str(), server_config.port))?
    .run()
    .await
}
