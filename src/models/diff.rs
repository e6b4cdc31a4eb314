//! Visual comparison request/response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{IgnoreBox, Screenshot};

/// Two images to compare, addressed by blob-store key.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompareRequest {
    pub image_a: String,
    pub image_b: String,
    #[serde(default)]
    pub ignore_boxes: Vec<IgnoreBox>,
    /// Explicit cache key; derived from the inputs when absent.
    #[serde(default)]
    pub cache_key: Option<String>,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    /// Per-request bound on the comparison, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_use_cache() -> bool {
    true
}

impl CompareRequest {
    pub fn new(image_a: impl Into<String>, image_b: impl Into<String>) -> Self {
        CompareRequest {
            image_a: image_a.into(),
            image_b: image_b.into(),
            ignore_boxes: Vec::new(),
            cache_key: None,
            use_cache: true,
            timeout_secs: None,
        }
    }

    pub fn with_ignore_boxes(mut self, boxes: Vec<IgnoreBox>) -> Self {
        self.ignore_boxes = boxes;
        self
    }

    pub fn bypass_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// Pixel statistics of a fresh comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiffScore {
    pub width: u32,
    pub height: u32,
    /// Pixels outside ignore regions.
    pub compared_pixels: u64,
    pub mismatched_pixels: u64,
    pub mismatch_percent: f64,
    /// Whether the mismatch is within the configured threshold.
    pub matches: bool,
}

/// Location of a diff artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiffArtifact {
    pub cache_key: String,
    pub path: String,
    /// True when an existing artifact was returned without recomputation.
    pub cached: bool,
    /// Present only when the comparison ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<DiffScore>,
}

/// Request to synthesize a dynamic baseline from a screenshot's history.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DynamicBaselineRequest {
    /// Explicit history, in fold order. Defaults to prior captures of the same target.
    #[serde(default)]
    pub history: Option<Vec<Uuid>>,
    #[serde(default)]
    pub ignore_boxes: Vec<IgnoreBox>,
}

/// Synthesized candidate and the captures it was folded from.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DynamicBaselineResponse {
    pub screenshot: Screenshot,
    pub folded: Vec<Uuid>,
}
