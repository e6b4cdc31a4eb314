//! Baseline eligibility, conflict detection and platform compatibility.

use crate::error::{AppError, AppResult};
use crate::models::{Baseline, Screenshot};

use super::fingerprint::fingerprint;

/// Fingerprint of a screenshot at its own resolution.
pub fn screenshot_fingerprint(screenshot: &Screenshot) -> Option<String> {
    screenshot
        .platform
        .as_ref()
        .and_then(|p| fingerprint(p, screenshot.dims()))
}

/// Fingerprint of a baseline, recomputed from its platform snapshot so records
/// stored without a fingerprint still compare correctly.
pub fn baseline_fingerprint(baseline: &Baseline) -> Option<String> {
    fingerprint(&baseline.platform, baseline.dims()).or_else(|| baseline.fingerprint.clone())
}

/// A screenshot may become a baseline only with a named platform that is either
/// device- or browser-scoped, and only when it has a fingerprint.
pub fn is_eligible(screenshot: &Screenshot) -> AppResult<()> {
    let platform = screenshot.platform.as_ref().ok_or_else(|| {
        AppError::InvalidRequest(format!("Screenshot {} has no platform", screenshot.id))
    })?;

    if !platform.has_name() {
        return Err(AppError::InvalidRequest(format!(
            "Screenshot {} platform has no platform_name",
            screenshot.id
        )));
    }

    if platform.device_name.is_none() && platform.browser_name.is_none() {
        return Err(AppError::InvalidRequest(format!(
            "Screenshot {} platform needs a device_name or browser_name",
            screenshot.id
        )));
    }

    if screenshot_fingerprint(screenshot).is_none() {
        return Err(AppError::InvalidRequest(format!(
            "Screenshot {} is a browser capture without screen dimensions",
            screenshot.id
        )));
    }

    Ok(())
}

/// Existing baselines for `view` targeting the same platform as `candidate`.
pub fn find_conflicts<'a>(
    view: &str,
    candidate: &Screenshot,
    existing: &'a [Baseline],
) -> Vec<&'a Baseline> {
    let Some(wanted) = screenshot_fingerprint(candidate) else {
        return Vec::new();
    };

    existing
        .iter()
        .filter(|b| b.view == view)
        .filter(|b| baseline_fingerprint(b).as_deref() == Some(wanted.as_str()))
        .collect()
}

/// Whether `screenshot` was captured on the same target as `baseline`.
pub fn platforms_match(baseline: &Baseline, screenshot: &Screenshot) -> bool {
    let Some(platform) = screenshot.platform.as_ref() else {
        return false;
    };

    if baseline.platform.platform_name != platform.platform_name {
        return false;
    }

    if baseline.platform.is_device() {
        return baseline.platform.device_name == platform.device_name;
    }

    if baseline.platform.is_browser() {
        return baseline.platform.browser_name == platform.browser_name
            && baseline.dims().is_some()
            && baseline.dims() == screenshot.dims();
    }

    false
}

/// Check that `screenshot` may replace the image a baseline points at.
pub fn validate_rebind(baseline: &Baseline, screenshot: &Screenshot) -> AppResult<()> {
    if baseline.view != screenshot.view {
        return Err(AppError::InvalidRequest(format!(
            "Screenshot {} is of view '{}' but baseline {} is of view '{}'",
            screenshot.id, screenshot.view, baseline.id, baseline.view
        )));
    }

    if !platforms_match(baseline, screenshot) {
        return Err(AppError::InvalidRequest(format!(
            "Screenshot {} platform does not match baseline {}",
            screenshot.id, baseline.id
        )));
    }

    Ok(())
}
