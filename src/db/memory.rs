//! In-memory `Store` used by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Baseline, Build, Execution, Screenshot, ScreenshotKind};

use super::Store;

#[derive(Default)]
struct Tables {
    builds: HashMap<Uuid, Build>,
    executions: HashMap<Uuid, Execution>,
    // insertion order per build, for stable listing
    execution_order: HashMap<Uuid, Vec<Uuid>>,
    screenshots: HashMap<Uuid, Screenshot>,
    baselines: HashMap<Uuid, Baseline>,
}

impl Tables {
    fn baseline_target_taken(&self, candidate: &Baseline) -> bool {
        let Some(fingerprint) = candidate.fingerprint.as_deref() else {
            return false;
        };
        self.baselines.values().any(|b| {
            b.id != candidate.id
                && b.view == candidate.view
                && b.fingerprint.as_deref() == Some(fingerprint)
        })
    }
}

fn baseline_conflict(value: &Baseline) -> AppError {
    AppError::Conflict(format!(
        "A baseline for view '{}' on target '{}' already exists",
        value.view,
        value.fingerprint.as_deref().unwrap_or("unknown")
    ))
}

/// All records behind one lock, so uniqueness checks and writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_build(&self, build: &Build) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.builds.contains_key(&build.id) {
            return Err(AppError::Conflict(format!("Build {} already exists", build.id)));
        }
        tables.builds.insert(build.id, build.clone());
        Ok(())
    }

    async fn get_build(&self, id: Uuid) -> AppResult<Option<Build>> {
        Ok(self.tables.read().await.builds.get(&id).cloned())
    }

    async fn commit_execution(&self, execution: &Execution, build: &Build) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let Tables {
            builds,
            executions,
            execution_order,
            ..
        } = &mut *tables;

        let Some(stored_build) = builds.get_mut(&build.id) else {
            return Err(AppError::NotFound(format!("Build {}", build.id)));
        };
        if let Some(existing) = executions.get(&execution.id)
            && existing.build_id != execution.build_id
        {
            return Err(AppError::Conflict(format!(
                "Execution {} belongs to build {}",
                execution.id, existing.build_id
            )));
        }
        *stored_build = build.clone();

        if executions
            .insert(execution.id, execution.clone())
            .is_none()
        {
            execution_order
                .entry(execution.build_id)
                .or_default()
                .push(execution.id);
        }
        Ok(())
    }

    async fn get_execution(&self, id: Uuid) -> AppResult<Option<Execution>> {
        Ok(self.tables.read().await.executions.get(&id).cloned())
    }

    async fn list_executions(&self, build_id: Uuid) -> AppResult<Vec<Execution>> {
        let tables = self.tables.read().await;
        let ids = tables
            .execution_order
            .get(&build_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tables.executions.get(id))
            .filter(|e| e.build_id == build_id)
            .cloned()
            .collect())
    }

    async fn insert_screenshot(&self, screenshot: &Screenshot) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.screenshots.contains_key(&screenshot.id) {
            return Err(AppError::Conflict(format!(
                "Screenshot {} already exists",
                screenshot.id
            )));
        }
        tables.screenshots.insert(screenshot.id, screenshot.clone());
        Ok(())
    }

    async fn get_screenshot(&self, id: Uuid) -> AppResult<Option<Screenshot>> {
        Ok(self.tables.read().await.screenshots.get(&id).cloned())
    }

    async fn list_prior_captures(
        &self,
        view: &str,
        fingerprint: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<Screenshot>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Screenshot> = tables
            .screenshots
            .values()
            .filter(|s| {
                s.kind == ScreenshotKind::Captured
                    && s.view == view
                    && s.fingerprint.as_deref() == Some(fingerprint)
                    && s.captured_at < before
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.captured_at.cmp(&a.captured_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit);
        matching.reverse();
        Ok(matching)
    }

    async fn insert_baseline(&self, baseline: &Baseline) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.baselines.contains_key(&baseline.id) {
            return Err(AppError::Conflict(format!(
                "Baseline {} already exists",
                baseline.id
            )));
        }
        if tables.baseline_target_taken(baseline) {
            return Err(baseline_conflict(baseline));
        }
        tables.baselines.insert(baseline.id, baseline.clone());
        Ok(())
    }

    async fn get_baseline(&self, id: Uuid) -> AppResult<Option<Baseline>> {
        Ok(self.tables.read().await.baselines.get(&id).cloned())
    }

    async fn list_baselines(&self, view: Option<&str>) -> AppResult<Vec<Baseline>> {
        let tables = self.tables.read().await;
        let mut baselines: Vec<Baseline> = tables
            .baselines
            .values()
            .filter(|b| view.is_none_or(|v| b.view == v))
            .cloned()
            .collect();
        baselines.sort_by(|a, b| a.view.cmp(&b.view).then(a.created_at.cmp(&b.created_at)));
        Ok(baselines)
    }

    async fn update_baseline(&self, baseline: &Baseline) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.baselines.contains_key(&baseline.id) {
            return Err(AppError::NotFound(format!("Baseline {}", baseline.id)));
        }
        if tables.baseline_target_taken(baseline) {
            return Err(baseline_conflict(baseline));
        }
        tables.baselines.insert(baseline.id, baseline.clone());
        Ok(())
    }
}
