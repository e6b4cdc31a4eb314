//! Build lifecycle and result recording.

use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{Build, BuildSummaryResponse, CreateBuildRequest, Execution, NewExecution, SuiteSummary};

use super::aggregator::{Rollup, apply_execution};
use super::locks::BuildLocks;

pub async fn create_build(store: &dyn Store, request: CreateBuildRequest) -> AppResult<Build> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }

    let build = Build::new(name);
    store.insert_build(&build).await?;
    info!(build_id = %build.id, name = %build.name, "Build created");
    Ok(build)
}

pub async fn get_build(store: &dyn Store, id: Uuid) -> AppResult<Build> {
    store
        .get_build(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Build {}", id)))
}

/// Rollups of a build and each of its suites.
pub fn summarize(build: &Build) -> BuildSummaryResponse {
    BuildSummaryResponse {
        id: build.id,
        name: build.name.clone(),
        rollup: build.rollup(),
        suites: build
            .suites
            .iter()
            .map(|s| SuiteSummary {
                name: s.name.clone(),
                rollup: s.rollup(),
            })
            .collect(),
    }
}

/// Record an execution into a build and update every affected aggregate.
///
/// Writes to one build are serialized through `locks`. Re-reporting an execution
/// id replaces the earlier report; an id already recorded under a different build
/// is a conflict.
pub async fn record_execution(
    store: &dyn Store,
    locks: &BuildLocks,
    build_id: Uuid,
    request: NewExecution,
) -> AppResult<Execution> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let _guard = locks.acquire(build_id).await;

    let mut build = get_build(store, build_id).await?;
    let mut execution = Execution::new(build_id, request);

    if let Some(existing) = store.get_execution(execution.id).await?
        && existing.build_id != build_id
    {
        return Err(AppError::Conflict(format!(
            "Execution {} belongs to build {}",
            execution.id, existing.build_id
        )));
    }

    let applied = apply_execution(&mut build, &mut execution);
    store.commit_execution(&execution, &build).await?;

    info!(
        build_id = %build_id,
        execution_id = %execution.id,
        suite = %execution.suite_name,
        status = %execution.status,
        applied = ?applied,
        build_status = %build.status,
        "Execution recorded"
    );

    Ok(execution)
}
