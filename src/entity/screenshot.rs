//! Screenshot entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "screenshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub build_id: Uuid,
    pub view: String,
    pub captured_at: DateTimeUtc,
    pub path: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub platform: Option<JsonValue>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub fingerprint: Option<String>,
    pub kind: String, // captured | dynamic
    pub thumbnail_path: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::build::Entity",
        from = "Column::BuildId",
        to = "super::build::Column::Id",
        on_delete = "Cascade"
    )]
    Build,
    #[sea_orm(has_many = "super::baseline::Entity")]
    Baselines,
}

impl Related<super::build::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Build.def()
    }
}

impl Related<super::baseline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Baselines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
