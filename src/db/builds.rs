//! Database queries for builds.

use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entity::build::{self as build, ActiveModel, Entity as BuildEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Build, Outcome};

use super::{DbPool, from_json, to_json, write_error};

pub(super) fn to_active(value: &Build) -> AppResult<ActiveModel> {
    Ok(ActiveModel {
        id: Set(value.id),
        name: Set(value.name.clone()),
        status: Set(value.status.as_str().to_string()),
        start_time: Set(value.start),
        end_time: Set(value.end),
        histogram: Set(to_json(&value.histogram, "histogram")?),
        suites: Set(to_json(&value.suites, "suites")?),
        created_at: Set(value.created_at),
        updated_at: Set(value.updated_at),
    })
}

fn from_model(model: build::Model) -> AppResult<Build> {
    Ok(Build {
        id: model.id,
        name: model.name,
        status: Outcome::parse(&model.status).unwrap_or_default(),
        start: model.start_time,
        end: model.end_time,
        histogram: from_json(model.histogram, "histogram")?,
        suites: from_json(model.suites, "suites")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl DbPool {
    /// Insert a new build.
    pub async fn create_build(&self, value: &Build) -> AppResult<()> {
        to_active(value)?
            .insert(self.connection())
            .await
            .map_err(|e| {
                write_error(e, "insert build", || format!("Build {} already exists", value.id))
            })?;
        Ok(())
    }

    /// Get a build by ID.
    pub async fn get_build_by_id(&self, id: Uuid) -> AppResult<Option<Build>> {
        let result = BuildEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get build: {}", e)))?;

        result.map(from_model).transpose()
    }
}
