//! Domain models for the visual results server.

pub mod baseline;
pub mod build;
pub mod diff;
pub mod execution;
pub mod outcome;
pub mod platform;
pub mod rollup;
pub mod screenshot;

// Re-export commonly used types
pub use baseline::{
    Baseline, CreateBaselineRequest, IgnoreBox, RebindBaselineRequest, UpdateIgnoreBoxesRequest,
};
pub use build::{Build, BuildSummaryResponse, CreateBuildRequest, Suite, SuiteKey, SuiteSummary};
pub use diff::{
    CompareRequest, DiffArtifact, DiffScore, DynamicBaselineRequest, DynamicBaselineResponse,
};
pub use execution::{Action, Execution, ExecutionSummary, NewAction, NewExecution, Step};
pub use outcome::Outcome;
pub use platform::Platform;
pub use rollup::{Histogram, RollupSummary, TimeSpan};
pub use screenshot::{RegisterScreenshotRequest, Screenshot, ScreenshotKind};
