use sea_orm::entity::prelude::*;

/// Collection folder row. `shared_with` is a JSON array of
/// `{ "email": ..., "permission": ... }` entries; it only matters when
/// `is_public` is false.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub owner_id: i64,
    pub is_public: bool,
    #[sea_orm(column_type = "Text")]
    pub shared_with: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
