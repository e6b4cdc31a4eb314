//! Database queries for executions.

use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::execution::{self as execution, ActiveModel, Entity as ExecutionEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Build, Execution, Outcome, SuiteKey};

use super::{DbPool, builds, from_json, to_json};

fn from_model(model: execution::Model) -> AppResult<Execution> {
    Ok(Execution {
        id: model.id,
        build_id: model.build_id,
        title: model.title,
        suite_name: model.suite_name,
        actions: from_json(model.actions, "actions")?,
        platforms: from_json(model.platforms, "platforms")?,
        status: Outcome::parse(&model.status).unwrap_or_default(),
        start: model.start_time,
        end: model.end_time,
    })
}

impl DbPool {
    /// Upsert an execution and write its build's new rollup in one transaction.
    ///
    /// The upsert only updates a row owned by the same build; an id recorded
    /// under another build affects no rows and is reported as a conflict.
    pub async fn save_execution_with_build(&self, value: &Execution, build: &Build) -> AppResult<()> {
        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(value.id),
            build_id: Set(value.build_id),
            title: Set(value.title.clone()),
            suite_name: Set(value.suite_name.clone()),
            suite_key: Set(SuiteKey::new(&value.suite_name).as_str().to_string()),
            status: Set(value.status.as_str().to_string()),
            start_time: Set(value.start),
            end_time: Set(value.end),
            actions: Set(to_json(&value.actions, "actions")?),
            platforms: Set(to_json(&value.platforms, "platforms")?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let written = ExecutionEntity::insert(model)
            .on_conflict(
                OnConflict::column(execution::Column::Id)
                    .update_columns([
                        execution::Column::Title,
                        execution::Column::SuiteName,
                        execution::Column::SuiteKey,
                        execution::Column::Status,
                        execution::Column::StartTime,
                        execution::Column::EndTime,
                        execution::Column::Actions,
                        execution::Column::Platforms,
                        execution::Column::UpdatedAt,
                    ])
                    .action_and_where(
                        Expr::col((ExecutionEntity, execution::Column::BuildId)).eq(value.build_id),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to save execution: {}", e)))?;

        if written == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(format!("Failed to roll back: {}", e)))?;
            return Err(AppError::Conflict(format!(
                "Execution {} belongs to another build",
                value.id
            )));
        }

        let mut build_model = builds::to_active(build)?;
        build_model.created_at = ActiveValue::NotSet;
        build_model.update(&txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound(format!("Build {}", build.id)),
            e => AppError::Database(format!("Failed to update build: {}", e)),
        })?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit execution: {}", e)))?;

        Ok(())
    }

    /// Get an execution by ID.
    pub async fn get_execution_by_id(&self, id: Uuid) -> AppResult<Option<Execution>> {
        let result = ExecutionEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get execution: {}", e)))?;

        result.map(from_model).transpose()
    }

    /// List a build's executions in report order.
    pub async fn list_executions_by_build(&self, build_id: Uuid) -> AppResult<Vec<Execution>> {
        let models = ExecutionEntity::find()
            .filter(execution::Column::BuildId.eq(build_id))
            .order_by_asc(execution::Column::CreatedAt)
            .order_by_asc(execution::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list executions: {}", e)))?;

        models.into_iter().map(from_model).collect()
    }
}
