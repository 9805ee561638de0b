mod auth;
mod config;
mod db;
mod error;
mod export;
mod import;
mod seed;
mod services;
mod state;
mod validation;

use crate::config::AppConfig;
use crate::db::sqlite::SqliteStore;
use crate::state::AppState;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {err}"))
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = match allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin).supports_credentials(),
        None => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("invalid configuration", e))?;
    let store = SqliteStore::open(&config.database_path)
        .map_err(|e| startup_error("cannot open database", e))?;
    let seeded = seed::seed_users(&store, &config)
        .map_err(|e| startup_error("cannot seed user accounts", e))?;
    info!("Database ready at {} ({} accounts seeded)", config.database_path, seeded);

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(store, config);

    info!("Voter Management API listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors(state.config.cors_allowed_origin.as_deref()))
            .wrap(
                middleware::DefaultHeaders::new()
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::REFERRER_POLICY, "no-referrer")),
            )
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .default_service(web::route().to(services::route_not_found))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
