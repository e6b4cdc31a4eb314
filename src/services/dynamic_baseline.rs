//! Synthesizes a variance-tolerant baseline by folding prior captures into a screenshot.

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CompareRequest, IgnoreBox, Screenshot, ScreenshotKind};

use super::diff_cache::DiffCache;
use super::pixel_diff;

pub fn thumbnail_path(id: Uuid) -> String {
    format!("thumbnails/{}.png", id)
}

/// Fold `history` into `screenshot`, oldest first.
///
/// Each step diffs the running candidate against the next capture without the
/// cache, so regions that ever changed end up marked. The result is a new,
/// unpersisted screenshot of kind `Dynamic` with a thumbnail attached.
pub async fn build_dynamic_baseline(
    cache: &DiffCache,
    screenshot: &Screenshot,
    history: &[Screenshot],
    ignore_boxes: &[IgnoreBox],
) -> AppResult<Screenshot> {
    let mut candidate = screenshot.clone();
    candidate.id = Uuid::now_v7();

    for prior in history {
        let request = CompareRequest::new(candidate.path.clone(), prior.path.clone())
            .with_ignore_boxes(ignore_boxes.to_vec())
            .bypass_cache();
        let artifact = cache.compare(&request).await?;
        candidate.path = artifact.path;
    }

    let raster = cache.read_source(&candidate.path).await?;
    let settings = *cache.settings();
    let (png, width, height) = tokio::task::spawn_blocking(move || -> AppResult<_> {
        let image = pixel_diff::decode(&raster)?;
        let thumb = pixel_diff::thumbnail(
            &image,
            settings.thumbnail_width,
            settings.thumbnail_height,
        );
        let png = pixel_diff::encode_png(&thumb.to_rgba8())?;
        Ok((png, image.width(), image.height()))
    })
    .await
    .map_err(|e| AppError::Io(format!("Thumbnail task failed: {}", e)))??;

    let thumb_path = thumbnail_path(candidate.id);
    cache
        .blobs()
        .put(&thumb_path, png, Some("image/png"))
        .await?;

    candidate.width = Some(width);
    candidate.height = Some(height);
    candidate.thumbnail_path = Some(thumb_path);
    candidate.kind = ScreenshotKind::Dynamic;

    info!(
        source_id = %screenshot.id,
        dynamic_id = %candidate.id,
        folded = history.len(),
        "Dynamic baseline built"
    );

    Ok(candidate)
}
