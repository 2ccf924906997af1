use std::str::FromStr;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter,
};
use tracing::{error, info, warn};

use crate::errors::{LinkmarkError, Result};
use crate::storages::models::{
    parse_share_entries, parse_shared_emails, serialize_share_entries, serialize_shared_emails,
};
use crate::storages::Storage;
use crate::structs::{Collection, CollectionAccess, EntityKind, Resource, ShortLink};

use migration::{Migrator, MigratorTrait, entities::collection, entities::resource,
    entities::short_link};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkmarkError::database_config("DATABASE_URL is not set"));
        }

        let db = if backend_name == "sqlite" {
            Self::connect_sqlite(database_url).await?
        } else {
            Self::connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        };

        storage.run_migrations().await?;

        info!("{} storage initialized", storage.backend_name.to_uppercase());
        Ok(storage)
    }

    /// 连接 SQLite 数据库（带自动创建和性能优化）
    async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::SqlitePool;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

        let opt = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                LinkmarkError::database_config(format!("SQLite URL parse failed: {}", e))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
            LinkmarkError::database_connection(format!("Cannot connect to SQLite: {}", e))
        })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 连接通用数据库（MySQL/PostgreSQL）
    async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(std::time::Duration::from_secs(8))
            .acquire_timeout(std::time::Duration::from_secs(8))
            .idle_timeout(std::time::Duration::from_secs(8))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            LinkmarkError::database_connection(format!(
                "Cannot connect to {} database: {}",
                backend_name.to_uppercase(),
                e
            ))
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| LinkmarkError::database_operation(format!("Migration failed: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }

    fn model_to_short_link(model: short_link::Model) -> Result<ShortLink> {
        let kind = EntityKind::from_str(&model.entity_kind)
            .map_err(LinkmarkError::validation)?;

        Ok(ShortLink {
            short_code: model.short_code,
            kind,
            entity_id: model.entity_id,
            full_path: model.full_path,
            created_at: model.created_at,
        })
    }

    fn model_to_resource(model: resource::Model) -> Result<Resource> {
        Ok(Resource {
            id: model.id,
            owner_id: model.owner_id,
            owner_email: crate::utils::normalize_email(&model.owner_email),
            full_path: model.full_path,
            restricted_to: parse_shared_emails(&model.shared_emails)?,
            view_count: model.view_count,
        })
    }

    fn model_to_collection(model: collection::Model) -> Result<Collection> {
        let access = if model.is_public {
            CollectionAccess::Public
        } else {
            CollectionAccess::Restricted {
                entries: parse_share_entries(&model.shared_with)?,
            }
        };

        Ok(Collection {
            id: model.id,
            owner_id: model.owner_id,
            access,
        })
    }

    /// 判断是否是唯一约束冲突错误
    fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
        use sea_orm::sqlx::Error;

        match err {
            sea_orm::DbErr::Exec(sea_orm::RuntimeErr::SqlxError(sqlx_err)) => {
                match &**sqlx_err {
                    Error::Database(db_err) => {
                        let code = db_err.code();
                        // SQLite: SQLITE_CONSTRAINT (code 2067)
                        // MySQL: ER_DUP_ENTRY (code 1062)
                        // PostgreSQL: unique_violation (code 23505)
                        code.as_ref()
                            .map(|c| c == "2067" || c == "1062" || c == "23505")
                            .unwrap_or(false)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn get_short_link(&self, code: &str) -> Result<Option<ShortLink>> {
        let model = short_link::Entity::find_by_id(code)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Short link lookup failed: {}", e);
                LinkmarkError::database_operation(format!("Short link lookup failed: {}", e))
            })?;

        match model {
            Some(model) => match Self::model_to_short_link(model) {
                Ok(link) => Ok(Some(link)),
                Err(e) => {
                    // 行损坏视为无可用链接，而不是请求失败
                    warn!("Unusable short link row for {}: {}", code, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn find_short_link_for(
        &self,
        kind: EntityKind,
        entity_id: i64,
    ) -> Result<Option<ShortLink>> {
        let model = short_link::Entity::find()
            .filter(short_link::Column::EntityKind.eq(kind.to_string()))
            .filter(short_link::Column::EntityId.eq(entity_id))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(Self::model_to_short_link(model)?)),
            None => Ok(None),
        }
    }

    async fn create_short_link(&self, link: ShortLink) -> Result<()> {
        use sea_orm::ActiveValue::Set;

        let active_model = short_link::ActiveModel {
            short_code: Set(link.short_code.clone()),
            entity_kind: Set(link.kind.to_string()),
            entity_id: Set(link.entity_id),
            full_path: Set(link.full_path.clone()),
            created_at: Set(link.created_at),
        };

        match short_link::Entity::insert(active_model).exec(&self.db).await {
            Ok(_) => {
                info!("Short link created: {} -> {}", link.short_code, link.full_path);
                Ok(())
            }
            Err(e) if Self::is_unique_violation(&e) => Err(LinkmarkError::conflict(format!(
                "Short link conflict for code {}",
                link.short_code
            ))),
            Err(e) => Err(LinkmarkError::database_operation(format!(
                "Short link insert failed: {}",
                e
            ))),
        }
    }

    async fn get_resource(&self, id: i64) -> Result<Option<Resource>> {
        let model = resource::Entity::find_by_id(id).one(&self.db).await?;

        match model {
            Some(model) => match Self::model_to_resource(model) {
                Ok(resource) => Ok(Some(resource)),
                Err(e) => {
                    warn!("Unusable resource row {}: {}", id, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn get_collection(&self, id: i64) -> Result<Option<Collection>> {
        let model = collection::Entity::find_by_id(id).one(&self.db).await?;

        match model {
            Some(model) => match Self::model_to_collection(model) {
                Ok(collection) => Ok(Some(collection)),
                Err(e) => {
                    warn!("Unusable collection row {}: {}", id, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn upsert_resource(&self, res: Resource) -> Result<()> {
        use sea_orm::ActiveValue::Set;
        use sea_orm::sea_query::OnConflict;

        let active_model = resource::ActiveModel {
            id: Set(res.id),
            owner_id: Set(res.owner_id),
            owner_email: Set(res.owner_email.clone()),
            full_path: Set(res.full_path.clone()),
            shared_emails: Set(serialize_shared_emails(&res.restricted_to)?),
            view_count: Set(res.view_count),
            created_at: Set(chrono::Utc::now()),
        };

        resource::Entity::insert(active_model)
            .on_conflict(
                // 更新列里不含 view_count，避免覆盖已累计的浏览数
                OnConflict::column(resource::Column::Id)
                    .update_columns([
                        resource::Column::OwnerId,
                        resource::Column::OwnerEmail,
                        resource::Column::FullPath,
                        resource::Column::SharedEmails,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinkmarkError::database_operation(format!("Resource upsert failed: {}", e))
            })?;

        Ok(())
    }

    async fn upsert_collection(&self, col: Collection) -> Result<()> {
        use sea_orm::ActiveValue::Set;
        use sea_orm::sea_query::OnConflict;

        let (is_public, shared_with) = match &col.access {
            CollectionAccess::Public => (true, "[]".to_string()),
            CollectionAccess::Restricted { entries } => (false, serialize_share_entries(entries)?),
        };

        let active_model = collection::ActiveModel {
            id: Set(col.id),
            owner_id: Set(col.owner_id),
            is_public: Set(is_public),
            shared_with: Set(shared_with),
            created_at: Set(chrono::Utc::now()),
        };

        collection::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(collection::Column::Id)
                    .update_columns([
                        collection::Column::OwnerId,
                        collection::Column::IsPublic,
                        collection::Column::SharedWith,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinkmarkError::database_operation(format!("Collection upsert failed: {}", e))
            })?;

        Ok(())
    }

    async fn increment_resource_views(&self, id: i64) -> Result<()> {
        use sea_orm::ExprTrait;
        use sea_orm::sea_query::Expr;

        // 原子相对更新，并发访问不丢计数
        let result = resource::Entity::update_many()
            .col_expr(
                resource::Column::ViewCount,
                Expr::col(resource::Column::ViewCount).add(1),
            )
            .filter(resource::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinkmarkError::database_operation(format!("View count update failed: {}", e))
            })?;

        if result.rows_affected == 0 {
            return Err(LinkmarkError::not_found(format!("Resource not found: {}", id)));
        }

        Ok(())
    }

    async fn backend_name(&self) -> String {
        self.backend_name.clone()
    }
}
