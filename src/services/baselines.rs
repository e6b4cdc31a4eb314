//! Baseline lifecycle: promotion, rebinding and ignore-region edits.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{
    Baseline, CreateBaselineRequest, IgnoreBox, RebindBaselineRequest, Screenshot,
    UpdateIgnoreBoxesRequest,
};

use super::baseline_matcher::{find_conflicts, is_eligible, screenshot_fingerprint, validate_rebind};

fn validate_boxes(boxes: &[IgnoreBox]) -> AppResult<()> {
    for ignore in boxes {
        ignore.validate().map_err(AppError::InvalidRequest)?;
    }
    Ok(())
}

async fn load_screenshot(store: &dyn Store, id: Uuid) -> AppResult<Screenshot> {
    store
        .get_screenshot(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Screenshot {}", id)))
}

pub async fn get_baseline(store: &dyn Store, id: Uuid) -> AppResult<Baseline> {
    store
        .get_baseline(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Baseline {}", id)))
}

/// Promote a screenshot to the baseline of its (view, platform) target.
pub async fn create_baseline(
    store: &dyn Store,
    request: CreateBaselineRequest,
) -> AppResult<Baseline> {
    validate_boxes(&request.ignore_boxes)?;

    let screenshot = load_screenshot(store, request.screenshot_id).await?;
    is_eligible(&screenshot)?;
    let platform = screenshot.platform.clone().ok_or_else(|| {
        AppError::InvalidRequest(format!("Screenshot {} has no platform", screenshot.id))
    })?;

    // Catches legacy rows the unique index cannot see; the insert arbitrates races.
    let existing = store.list_baselines(Some(&screenshot.view)).await?;
    if let Some(conflict) = find_conflicts(&screenshot.view, &screenshot, &existing).first() {
        return Err(AppError::Conflict(format!(
            "Baseline {} already covers view '{}' on this platform",
            conflict.id, screenshot.view
        )));
    }

    let dims = screenshot.dims();
    let now = Utc::now();
    let baseline = Baseline {
        id: Uuid::now_v7(),
        screenshot_id: screenshot.id,
        view: screenshot.view.clone(),
        platform,
        screen_width: dims.map(|d| d.0),
        screen_height: dims.map(|d| d.1),
        fingerprint: screenshot_fingerprint(&screenshot),
        ignore_boxes: request.ignore_boxes,
        created_at: now,
        updated_at: now,
    };

    store.insert_baseline(&baseline).await?;

    info!(
        baseline_id = %baseline.id,
        view = %baseline.view,
        fingerprint = baseline.fingerprint.as_deref().unwrap_or(""),
        "Baseline created"
    );
    Ok(baseline)
}

/// Point a baseline at a newer capture of the same view and platform.
pub async fn rebind_baseline(
    store: &dyn Store,
    id: Uuid,
    request: RebindBaselineRequest,
) -> AppResult<Baseline> {
    let mut baseline = get_baseline(store, id).await?;
    let screenshot = load_screenshot(store, request.screenshot_id).await?;
    is_eligible(&screenshot)?;
    validate_rebind(&baseline, &screenshot)?;

    let dims = screenshot.dims();
    baseline.screenshot_id = screenshot.id;
    if let Some(platform) = screenshot.platform.clone() {
        baseline.platform = platform;
    }
    baseline.screen_width = dims.map(|d| d.0);
    baseline.screen_height = dims.map(|d| d.1);
    baseline.fingerprint = screenshot_fingerprint(&screenshot);
    baseline.updated_at = Utc::now();

    store.update_baseline(&baseline).await?;

    info!(baseline_id = %baseline.id, screenshot_id = %screenshot.id, "Baseline rebound");
    Ok(baseline)
}

pub async fn update_ignore_boxes(
    store: &dyn Store,
    id: Uuid,
    request: UpdateIgnoreBoxesRequest,
) -> AppResult<Baseline> {
    validate_boxes(&request.ignore_boxes)?;

    let mut baseline = get_baseline(store, id).await?;
    baseline.ignore_boxes = request.ignore_boxes;
    baseline.updated_at = Utc::now();
    store.update_baseline(&baseline).await?;

    info!(
        baseline_id = %baseline.id,
        boxes = baseline.ignore_boxes.len(),
        "Baseline ignore regions updated"
    );
    Ok(baseline)
}
