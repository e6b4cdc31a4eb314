//! Database queries for baselines.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::baseline::{self as baseline, ActiveModel, Entity as BaselineEntity};
use crate::error::{AppError, AppResult};
use crate::models::Baseline;

use super::{DbPool, from_db_dim, from_json, to_db_dim, to_json, write_error};

fn to_active(value: &Baseline) -> AppResult<ActiveModel> {
    Ok(ActiveModel {
        id: Set(value.id),
        screenshot_id: Set(value.screenshot_id),
        view: Set(value.view.clone()),
        platform: Set(to_json(&value.platform, "platform")?),
        screen_width: Set(to_db_dim(value.screen_width)),
        screen_height: Set(to_db_dim(value.screen_height)),
        fingerprint: Set(value.fingerprint.clone()),
        ignore_boxes: Set(to_json(&value.ignore_boxes, "ignore_boxes")?),
        created_at: Set(value.created_at),
        updated_at: Set(value.updated_at),
    })
}

fn from_model(model: baseline::Model) -> AppResult<Baseline> {
    Ok(Baseline {
        id: model.id,
        screenshot_id: model.screenshot_id,
        view: model.view,
        platform: from_json(model.platform, "platform")?,
        screen_width: from_db_dim(model.screen_width),
        screen_height: from_db_dim(model.screen_height),
        fingerprint: model.fingerprint,
        ignore_boxes: from_json(model.ignore_boxes, "ignore_boxes")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn conflict_message(value: &Baseline) -> String {
    format!(
        "A baseline for view '{}' on target '{}' already exists",
        value.view,
        value.fingerprint.as_deref().unwrap_or("unknown")
    )
}

impl DbPool {
    /// Insert a baseline; the unique index on (view, fingerprint) arbitrates races.
    pub async fn create_baseline(&self, value: &Baseline) -> AppResult<()> {
        to_active(value)?
            .insert(self.connection())
            .await
            .map_err(|e| write_error(e, "insert baseline", || conflict_message(value)))?;
        Ok(())
    }

    /// Get a baseline by ID.
    pub async fn get_baseline_by_id(&self, id: Uuid) -> AppResult<Option<Baseline>> {
        let result = BaselineEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get baseline: {}", e)))?;

        result.map(from_model).transpose()
    }

    /// List baselines, optionally for one view.
    pub async fn find_baselines(&self, view: Option<&str>) -> AppResult<Vec<Baseline>> {
        let mut select = BaselineEntity::find();
        if let Some(view) = view {
            select = select.filter(baseline::Column::View.eq(view));
        }

        let models = select
            .order_by_asc(baseline::Column::View)
            .order_by_asc(baseline::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list baselines: {}", e)))?;

        models.into_iter().map(from_model).collect()
    }

    /// Overwrite a baseline's mutable fields.
    pub async fn save_baseline(&self, value: &Baseline) -> AppResult<()> {
        let mut active = to_active(value)?;
        active.created_at = sea_orm::ActiveValue::NotSet;

        active.update(self.connection()).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                AppError::NotFound(format!("Baseline {}", value.id))
            }
            e => write_error(e, "update baseline", || conflict_message(value)),
        })?;
        Ok(())
    }
}
