mod auth;
mod config;
mod db;
mod error;
mod services;
mod storage;

use crate::config::Config;
use crate::db::Database;
use crate::storage::{Storage, PUBLIC_PREFIX};
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use env_logger::Env;
use log::{error, info};

/// Registers shared state and every route. Used by `main` and by the handler tests.
pub(crate) fn configure_app(cfg: &mut web::ServiceConfig, database: Database, storage: Storage) {
    let files = Files::new(PUBLIC_PREFIX.trim_end_matches('/'), storage.root());
    let json = web::JsonConfig::default()
        .limit(10 * 1024 * 1024) // 10 MB, images arrive as data URLs
        .error_handler(crate::error::json_error_handler);
    cfg.app_data(json)
        .app_data(web::Data::new(database))
        .app_data(web::Data::new(storage))
        .service(files)
        .service(services::surveys::configure_routes())
        .service(services::users::configure_routes())
        .service(services::dashboard::configure_routes())
        // Must stay last: its `/api` prefix would shadow the scopes above.
        .service(services::auth::configure_routes())
        .default_service(web::route().to(|| async {
            HttpResponse::NotFound().json(serde_json::json!({ "message": "Not Found" }))
        }));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(|e| {
        error!("{}", e);
        std::io::Error::other(e)
    })?;

    let database = Database::new(&config.database_path);
    database.init_schema().map_err(|e| {
        error!("Could not prepare {}: {}", config.database_path.display(), e);
        std::io::Error::other(e)
    })?;

    let storage = Storage::new(&config.storage_dir);
    storage.ensure_dirs()?;

    info!("Server running at {}", config.url());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| configure_app(cfg, database.clone(), storage.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
