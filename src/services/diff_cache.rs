//! Content-addressed cache of visual diff artifacts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::DiffSettings;
use crate::error::{AppError, AppResult};
use crate::models::{CompareRequest, DiffArtifact, DiffScore, IgnoreBox};

use super::locks::KeyedLocks;
use super::pixel_diff;
use super::storage::BlobStore;

const MAX_CACHE_KEY_LEN: usize = 128;

/// Cache key for a comparison. Independent of image order and box order.
pub fn cache_key(image_a: &str, image_b: &str, ignore_boxes: &[IgnoreBox]) -> String {
    let mut images = [image_a, image_b];
    images.sort_unstable();

    let mut boxes = ignore_boxes.to_vec();
    boxes.sort_unstable();
    boxes.dedup();

    let mut hasher = Sha256::new();
    for image in images {
        hasher.update(image.as_bytes());
        hasher.update([0u8]);
    }
    for b in &boxes {
        hasher.update(format!("{},{},{},{};", b.left, b.top, b.right, b.bottom).as_bytes());
    }
    hex::encode(hasher.finalize())
}

pub fn artifact_path(key: &str) -> String {
    format!("diffs/{}.png", key)
}

fn validate_cache_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_CACHE_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !key.starts_with('.');
    if !valid {
        return Err(AppError::InvalidRequest(format!(
            "Invalid cache key '{}': use up to {} of [A-Za-z0-9._-]",
            key, MAX_CACHE_KEY_LEN
        )));
    }
    Ok(())
}

/// Computes diff artifacts and reuses them by key.
///
/// A per-key lock spans check, compute and write, so concurrent requests for one
/// key produce a single artifact.
pub struct DiffCache {
    blobs: Arc<dyn BlobStore>,
    locks: KeyedLocks<String>,
    settings: DiffSettings,
    computations: AtomicU64,
}

impl DiffCache {
    pub fn new(blobs: Arc<dyn BlobStore>, settings: DiffSettings) -> Self {
        Self {
            blobs,
            locks: KeyedLocks::new(),
            settings,
            computations: AtomicU64::new(0),
        }
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub fn settings(&self) -> &DiffSettings {
        &self.settings
    }

    /// Number of comparisons actually computed since startup.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub async fn compare(&self, request: &CompareRequest) -> AppResult<DiffArtifact> {
        for ignore in &request.ignore_boxes {
            ignore.validate().map_err(AppError::InvalidRequest)?;
        }
        if request.timeout_secs == Some(0) {
            return Err(AppError::InvalidRequest(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let key = match &request.cache_key {
            Some(key) => {
                validate_cache_key(key)?;
                key.clone()
            }
            None => cache_key(&request.image_a, &request.image_b, &request.ignore_boxes),
        };
        let path = artifact_path(&key);

        let _guard = self.locks.acquire(key.clone()).await;

        if request.use_cache && self.blobs.exists(&path).await? {
            debug!(cache_key = %key, "Diff cache hit");
            return Ok(DiffArtifact {
                cache_key: key,
                path,
                cached: true,
                score: None,
            });
        }

        let budget = request
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.settings.timeout);

        let (png, score) = tokio::time::timeout(budget, self.render(request))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Comparison of {} and {} exceeded {:?}",
                    request.image_a, request.image_b, budget
                ))
            })??;

        self.blobs.put(&path, png, Some("image/png")).await?;
        self.computations.fetch_add(1, Ordering::Relaxed);

        info!(
            cache_key = %key,
            mismatch_percent = score.mismatch_percent,
            matches = score.matches,
            "Diff computed"
        );

        Ok(DiffArtifact {
            cache_key: key,
            path,
            cached: false,
            score: Some(score),
        })
    }

    async fn render(&self, request: &CompareRequest) -> AppResult<(Vec<u8>, DiffScore)> {
        let a = self.read_source(&request.image_a).await?;
        let b = self.read_source(&request.image_b).await?;
        let ignore_boxes = request.ignore_boxes.clone();
        let tolerance = self.settings.channel_tolerance;
        let threshold = self.settings.match_threshold_percent;

        tokio::task::spawn_blocking(move || -> AppResult<(Vec<u8>, DiffScore)> {
            let a = pixel_diff::decode(&a)?.to_rgba8();
            let b = pixel_diff::decode(&b)?.to_rgba8();
            let diff = pixel_diff::diff_images(&a, &b, &ignore_boxes, tolerance);
            let png = pixel_diff::encode_png(&diff.image)?;
            Ok((png, diff.score(threshold)))
        })
        .await
        .map_err(|e| AppError::Io(format!("Diff task failed: {}", e)))?
    }

    /// Comparison inputs that cannot be read are I/O failures, not missing resources.
    pub(crate) async fn read_source(&self, key: &str) -> AppResult<Vec<u8>> {
        self.blobs.get(key).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Io(format!("Image {} could not be read", key)),
            other => other,
        })
    }
}
