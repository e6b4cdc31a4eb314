//! Baseline entity for SeaORM.
//!
//! `(view, fingerprint)` is unique where fingerprint is set.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "baselines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub screenshot_id: Uuid,
    pub view: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub platform: JsonValue,
    pub screen_width: Option<i32>,
    pub screen_height: Option<i32>,
    pub fingerprint: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub ignore_boxes: JsonValue,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::screenshot::Entity",
        from = "Column::ScreenshotId",
        to = "super::screenshot::Column::Id",
        on_delete = "Restrict"
    )]
    Screenshot,
}

impl Related<super::screenshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Screenshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
