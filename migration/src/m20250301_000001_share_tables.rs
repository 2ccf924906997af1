use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 资源表：书签条目及其访问限制列表
        manager
            .create_table(
                Table::create()
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resource::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resource::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Resource::OwnerEmail).string().not_null())
                    .col(ColumnDef::new(Resource::FullPath).text().not_null())
                    .col(
                        ColumnDef::new(Resource::SharedEmails)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Resource::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resource::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 收藏夹表：可见性 + 共享名单
        manager
            .create_table(
                Table::create()
                    .table(Collection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Collection::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Collection::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Collection::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Collection::SharedWith)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Collection::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 短链接表：短码一对一指向一个实体
        manager
            .create_table(
                Table::create()
                    .table(ShortLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLink::ShortCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortLink::EntityKind).string().not_null())
                    .col(ColumnDef::new(ShortLink::EntityId).big_integer().not_null())
                    .col(ColumnDef::new(ShortLink::FullPath).text().not_null())
                    .col(
                        ColumnDef::new(ShortLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个实体最多一个短码（幂等创建依赖该唯一索引）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_entity")
                    .table(ShortLink::Table)
                    .col(ShortLink::EntityKind)
                    .col(ShortLink::EntityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_links_entity").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Collection::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Resource::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Resource {
    #[sea_orm(iden = "resources")]
    Table,
    Id,
    OwnerId,
    OwnerEmail,
    FullPath,
    SharedEmails,
    ViewCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Collection {
    #[sea_orm(iden = "collections")]
    Table,
    Id,
    OwnerId,
    IsPublic,
    SharedWith,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    ShortCode,
    EntityKind,
    EntityId,
    FullPath,
    CreatedAt,
}
