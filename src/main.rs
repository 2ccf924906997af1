use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use tracing::{info, warn};

use linkmark::config::Config;
use linkmark::middleware::JwtService;
use linkmark::services::{HealthService, ResolveService, ShareService};
use linkmark::storages::StorageFactory;
use linkmark::structs::AppStartTime;
use linkmark::system;
use linkmark::utils::generate_random_code;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();
    let _log_guard = system::init_logging(&config);

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let storage = StorageFactory::create(&config)
        .await
        .map_err(|e| std::io::Error::other(e.format_simple()))?;
    info!("Using storage backend: {}", storage.backend_name().await);

    let jwt_secret = if config.jwt_secret.is_empty() {
        warn!("JWT_SECRET not configured, generating an ephemeral secret");
        generate_random_code(32)
    } else {
        config.jwt_secret.clone()
    };
    let jwt = JwtService::new(&jwt_secret);

    let bind_address = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server at http://{}", bind_address);
    info!(
        "Share links served under {} (collections) and {} (resources)",
        config.collection_route_prefix, config.resource_route_prefix
    );

    let app_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(jwt.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .route(
                &format!("{}/{{short_code}}", app_config.collection_route_prefix),
                web::get().to(ResolveService::resolve_collection),
            )
            .route(
                &format!("{}/{{short_code}}", app_config.resource_route_prefix),
                web::get().to(ResolveService::resolve_resource),
            )
            .route("/api/share", web::post().to(ShareService::create_share))
            .route(
                &app_config.health_route_prefix,
                web::get().to(HealthService::health_check),
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
