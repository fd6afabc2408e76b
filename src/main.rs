mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::middleware::session::{session_key, session_middleware};
use crate::services::seed_service;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    info!("connecting to database");
    let db = db::establish_connection(&config.db_path).await.map_err(|e| {
        error!("failed to connect to database: {e}");
        io::Error::other(e)
    })?;

    seed_service::build_database(&db, &config).await.map_err(|e| {
        error!("failed to initialise database: {e}");
        io::Error::other(e)
    })?;

    let key = session_key(&config.secret_key);
    let cookie_secure = config.cookie_secure;
    let data = web::Data::new(db);

    info!(host = %config.host, port = config.port, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(session_middleware(key.clone(), cookie_secure))
            .wrap(Logger::default())
            .configure(routes::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
