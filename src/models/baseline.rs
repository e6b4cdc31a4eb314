//! Baseline model and ignore regions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Platform;

/// Rectangle excluded from diff scoring, in source-image pixels.
///
/// `left`/`top` are inclusive, `right`/`bottom` exclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct IgnoreBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl IgnoreBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        IgnoreBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.left > self.right || self.top > self.bottom {
            return Err(format!(
                "ignore box ({}, {}, {}, {}) has inverted edges",
                self.left, self.top, self.right, self.bottom
            ));
        }
        Ok(())
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Accepted reference screenshot for a (view, platform) target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Baseline {
    pub id: Uuid,
    pub screenshot_id: Uuid,
    pub view: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    /// Stored fingerprint. Records created before fingerprints existed leave it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub ignore_boxes: Vec<IgnoreBox>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Baseline {
    pub fn dims(&self) -> Option<(u32, u32)> {
        let width = self.screen_width.or(self.platform.screen_width);
        let height = self.screen_height.or(self.platform.screen_height);
        width.zip(height)
    }
}

/// Request to promote a screenshot to a baseline.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBaselineRequest {
    pub screenshot_id: Uuid,
    #[serde(default)]
    pub ignore_boxes: Vec<IgnoreBox>,
}

/// Request to point a baseline at a newer screenshot.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RebindBaselineRequest {
    pub screenshot_id: Uuid,
}

/// Request to replace a baseline's ignore regions.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateIgnoreBoxesRequest {
    pub ignore_boxes: Vec<IgnoreBox>,
}
