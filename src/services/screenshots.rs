//! Screenshot registration and dynamic baseline requests.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{
    DynamicBaselineRequest, DynamicBaselineResponse, Platform, RegisterScreenshotRequest,
    Screenshot, ScreenshotKind,
};

use super::baseline_matcher::screenshot_fingerprint;
use super::diff_cache::DiffCache;
use super::dynamic_baseline::build_dynamic_baseline;

/// Record a screenshot already uploaded to the blob store.
pub async fn register_screenshot(
    store: &dyn Store,
    request: RegisterScreenshotRequest,
) -> AppResult<Screenshot> {
    let view = request.view.trim();
    if view.is_empty() {
        return Err(AppError::InvalidRequest("view must not be empty".to_string()));
    }
    if request.path.trim().is_empty() {
        return Err(AppError::InvalidRequest("path must not be empty".to_string()));
    }
    if request.width == Some(0) || request.height == Some(0) {
        return Err(AppError::InvalidRequest(
            "width and height must be positive".to_string(),
        ));
    }

    let platform = request.platform.map(Platform::normalized);
    if let Some(platform) = &platform {
        platform.validate().map_err(AppError::InvalidRequest)?;
    }

    if store.get_build(request.build_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Build {}", request.build_id)));
    }

    let mut screenshot = Screenshot {
        id: Uuid::now_v7(),
        build_id: request.build_id,
        view: view.to_string(),
        captured_at: request.captured_at.unwrap_or_else(Utc::now),
        path: request.path,
        platform,
        width: request.width,
        height: request.height,
        fingerprint: None,
        kind: ScreenshotKind::Captured,
        thumbnail_path: None,
    };
    screenshot.fingerprint = screenshot_fingerprint(&screenshot);

    store.insert_screenshot(&screenshot).await?;

    info!(
        screenshot_id = %screenshot.id,
        build_id = %screenshot.build_id,
        view = %screenshot.view,
        fingerprint = screenshot.fingerprint.as_deref().unwrap_or(""),
        "Screenshot registered"
    );
    Ok(screenshot)
}

pub async fn get_screenshot(store: &dyn Store, id: Uuid) -> AppResult<Screenshot> {
    store
        .get_screenshot(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Screenshot {}", id)))
}

/// History to fold: the explicit list in caller order, or earlier captures of
/// the same target, oldest first.
async fn resolve_history(
    store: &dyn Store,
    target: &Screenshot,
    explicit: Option<&[Uuid]>,
    limit: usize,
) -> AppResult<Vec<Screenshot>> {
    if let Some(ids) = explicit {
        let mut history = Vec::with_capacity(ids.len());
        for id in ids {
            history.push(get_screenshot(store, *id).await?);
        }
        return Ok(history);
    }

    match target.fingerprint.as_deref() {
        Some(fingerprint) => {
            store
                .list_prior_captures(&target.view, fingerprint, target.captured_at, limit)
                .await
        }
        None => Ok(Vec::new()),
    }
}

/// Build a dynamic baseline for screenshot `id` and record it so it can be promoted.
pub async fn create_dynamic_baseline(
    store: &dyn Store,
    cache: &DiffCache,
    id: Uuid,
    request: DynamicBaselineRequest,
) -> AppResult<DynamicBaselineResponse> {
    let target = get_screenshot(store, id).await?;
    let limit = cache.settings().dynamic_history_limit;
    let history = resolve_history(store, &target, request.history.as_deref(), limit).await?;

    let dynamic = build_dynamic_baseline(cache, &target, &history, &request.ignore_boxes).await?;
    store.insert_screenshot(&dynamic).await?;

    Ok(DynamicBaselineResponse {
        screenshot: dynamic,
        folded: history.iter().map(|s| s.id).collect(),
    })
}
