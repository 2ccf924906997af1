use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::config::Config;
use crate::errors::{LinkmarkError, Result};
use crate::structs::{Collection, EntityKind, Resource, ShortLink};

pub mod backends;
pub mod models;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up a short link by code. Purely a read; no side effects.
    async fn get_short_link(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Find the existing short link for an entity, if one was already minted.
    async fn find_short_link_for(
        &self,
        kind: EntityKind,
        entity_id: i64,
    ) -> Result<Option<ShortLink>>;

    /// Insert a new short link. Fails with [`LinkmarkError::Conflict`] when
    /// either the code or the (kind, entity) pair is already taken.
    async fn create_short_link(&self, link: ShortLink) -> Result<()>;

    async fn get_resource(&self, id: i64) -> Result<Option<Resource>>;
    async fn get_collection(&self, id: i64) -> Result<Option<Collection>>;

    async fn upsert_resource(&self, resource: Resource) -> Result<()>;
    async fn upsert_collection(&self, collection: Collection) -> Result<()>;

    /// Relative increment (`view_count = view_count + 1`) at the storage
    /// layer, so concurrent resolutions never lose updates.
    async fn increment_resource_views(&self, id: i64) -> Result<()>;

    async fn backend_name(&self) -> String;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &Config) -> Result<Arc<dyn Storage>> {
        let backend = config.storage_backend.as_str();

        match backend {
            "sqlite" | "mysql" | "postgres" | "mariadb" => {
                let storage =
                    backends::sea_orm::SeaOrmStorage::new(&config.database_url, backend).await?;
                Ok(Arc::new(storage) as Arc<dyn Storage>)
            }
            "memory" => {
                let storage = backends::memory::MemoryStorage::new();
                Ok(Arc::new(storage) as Arc<dyn Storage>)
            }
            _ => {
                error!("Unknown storage backend: {}", backend);
                Err(LinkmarkError::storage_plugin_not_found(format!(
                    "Unknown storage backend: {}. Supported: sqlite, mysql, postgres, mariadb, memory",
                    backend
                )))
            }
        }
    }
}
