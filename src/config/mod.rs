use std::env;

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// `sqlite` (default), `mysql`, `postgres` or `memory`.
    pub storage_backend: String,
    pub database_url: String,
    /// Prefix for collection short links, e.g. `/c`.
    pub collection_route_prefix: String,
    /// Prefix for resource short links, e.g. `/r`.
    pub resource_route_prefix: String,
    pub health_route_prefix: String,
    /// Base URL prepended to minted short links in API responses.
    pub public_base_url: String,
    pub jwt_secret: String,
    pub log_level: String,
    /// `text` (default) or `json`.
    pub log_format: String,
    pub log_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://linkmark.db?mode=rwc".to_string()),
            collection_route_prefix: env::var("COLLECTION_ROUTE_PREFIX")
                .unwrap_or_else(|_| "/c".to_string()),
            resource_route_prefix: env::var("RESOURCE_ROUTE_PREFIX")
                .unwrap_or_else(|_| "/r".to_string()),
            health_route_prefix: env::var("HEALTH_ROUTE_PREFIX")
                .unwrap_or_else(|_| "/health".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            log_file: env::var("LOG_FILE").ok().filter(|f| !f.is_empty()),
        }
    }
}
