mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, StoreBackend};
use crate::database::{MemoryUserStore, MongoDB, MongoUserStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting User Service...");

    let store = build_store(&config).await?;
    let store_data = web::Data::from(store);

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .wrap(cors)
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}

/// Picks the user store. A malformed MONGO_URI aborts startup; an unreachable
/// server does not, and handlers answer 500 until it comes back.
async fn build_store(config: &Config) -> std::io::Result<Arc<dyn UserStore>> {
    match config.store {
        StoreBackend::Memory => {
            log::warn!("⚠️  USER_STORE=memory: users live in process memory only");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StoreBackend::Mongo => {
            log::info!("📊 Database: {}", config.mongo_uri);

            let db = MongoDB::new(&config.mongo_uri).await.map_err(|e| {
                log::error!("❌ Invalid MongoDB configuration: {}", e);
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
            })?;

            jobs::index_bootstrap::start_index_bootstrap(db.clone());

            Ok(Arc::new(MongoUserStore::new(db)))
        }
    }
}
