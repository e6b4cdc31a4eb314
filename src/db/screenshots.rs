//! Database queries for screenshots.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entity::screenshot::{self as screenshot, ActiveModel, Entity as ScreenshotEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Screenshot, ScreenshotKind};

use super::{DbPool, from_db_dim, from_json, to_db_dim, to_json, write_error};

fn from_model(model: screenshot::Model) -> AppResult<Screenshot> {
    Ok(Screenshot {
        id: model.id,
        build_id: model.build_id,
        view: model.view,
        captured_at: model.captured_at,
        path: model.path,
        platform: model
            .platform
            .map(|p| from_json(p, "platform"))
            .transpose()?,
        width: from_db_dim(model.width),
        height: from_db_dim(model.height),
        fingerprint: model.fingerprint,
        kind: ScreenshotKind::parse(&model.kind),
        thumbnail_path: model.thumbnail_path,
    })
}

impl DbPool {
    /// Insert a screenshot record.
    pub async fn create_screenshot(&self, value: &Screenshot) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(value.id),
            build_id: Set(value.build_id),
            view: Set(value.view.clone()),
            captured_at: Set(value.captured_at),
            path: Set(value.path.clone()),
            platform: Set(value
                .platform
                .as_ref()
                .map(|p| to_json(p, "platform"))
                .transpose()?),
            width: Set(to_db_dim(value.width)),
            height: Set(to_db_dim(value.height)),
            fingerprint: Set(value.fingerprint.clone()),
            kind: Set(value.kind.as_str().to_string()),
            thumbnail_path: Set(value.thumbnail_path.clone()),
            created_at: Set(Utc::now()),
        };

        model.insert(self.connection()).await.map_err(|e| {
            write_error(e, "insert screenshot", || {
                format!("Screenshot {} already exists", value.id)
            })
        })?;
        Ok(())
    }

    /// Get a screenshot by ID.
    pub async fn get_screenshot_by_id(&self, id: Uuid) -> AppResult<Option<Screenshot>> {
        let result = ScreenshotEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get screenshot: {}", e)))?;

        result.map(from_model).transpose()
    }

    /// Most recent captures of a target before `before`, oldest first.
    pub async fn find_prior_captures(
        &self,
        view: &str,
        fingerprint: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<Screenshot>> {
        let models = ScreenshotEntity::find()
            .filter(screenshot::Column::View.eq(view))
            .filter(screenshot::Column::Fingerprint.eq(fingerprint))
            .filter(screenshot::Column::Kind.eq(ScreenshotKind::Captured.as_str()))
            .filter(screenshot::Column::CapturedAt.lt(before))
            .order_by_desc(screenshot::Column::CapturedAt)
            .limit(limit as u64)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list prior captures: {}", e)))?;

        let mut history = models
            .into_iter()
            .map(from_model)
            .collect::<AppResult<Vec<_>>>()?;
        history.reverse();
        Ok(history)
    }
}
