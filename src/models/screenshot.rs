//! Screenshot model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Platform;

/// How a screenshot came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotKind {
    /// Captured by a test run.
    #[default]
    Captured,
    /// Synthesized by folding several captures together.
    Dynamic,
}

impl ScreenshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::Dynamic => "dynamic",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "dynamic" => Self::Dynamic,
            _ => Self::Captured,
        }
    }
}

/// A raster capture of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Screenshot {
    pub id: Uuid,
    pub build_id: Uuid,
    pub view: String,
    pub captured_at: DateTime<Utc>,
    /// Blob-store key of the raster.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Derived platform fingerprint; unset when not eligible as a baseline target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub kind: ScreenshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
}

impl Screenshot {
    /// Raster resolution, falling back to the screen size reported with the platform.
    pub fn dims(&self) -> Option<(u32, u32)> {
        let platform = self.platform.as_ref();
        let width = self.width.or_else(|| platform.and_then(|p| p.screen_width));
        let height = self.height.or_else(|| platform.and_then(|p| p.screen_height));
        width.zip(height)
    }
}

/// Request to register an uploaded screenshot.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterScreenshotRequest {
    pub build_id: Uuid,
    pub view: String,
    /// Blob-store key the raster was uploaded to.
    pub path: String,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}
