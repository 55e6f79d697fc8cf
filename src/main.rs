//! Donghua Scraper API Server
//!
//! Main entry point for the donghua scraper REST API service.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use donghua_scraper::config::Config;
use donghua_scraper::routes::{configure_routes, cors, route_not_found, ApiDoc, AppState};
use donghua_scraper::scraper::{MemoryCache, Scraper, ScraperConfig};

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = format!("{}:{}", config.host, config.port);

    let scraper_config = ScraperConfig {
        base_url: config.base_url.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
        cache_ttl: Duration::from_secs(config.cache_ttl_secs),
    };
    let mut scraper = Scraper::new(scraper_config).map_err(|e| {
        error!("Failed to initialise HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    if config.cache_enabled() {
        info!("Page cache enabled with {}s TTL", config.cache_ttl_secs);
        scraper = scraper.with_cache(Arc::new(MemoryCache::new()));
    } else {
        info!("Page cache disabled");
    }

    let app_state = web::Data::new(AppState::new(Arc::new(scraper), config.clone()));

    info!(
        "Starting Donghua Scraper API server on {} (source {}, theme {})",
        bind_address, config.base_url, app_state.theme.name
    );

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors())
            .route("/health", web::get().to(health_check))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure_routes)
            .default_service(web::route().to(route_not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}
