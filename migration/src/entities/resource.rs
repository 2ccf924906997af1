use sea_orm::entity::prelude::*;

/// Bookmarked resource row. `shared_emails` is a JSON array of email strings;
/// an empty array means the resource is unrestricted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub owner_id: i64,
    pub owner_email: String,
    #[sea_orm(column_type = "Text")]
    pub full_path: String,
    #[sea_orm(column_type = "Text")]
    pub shared_emails: String,
    pub view_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
