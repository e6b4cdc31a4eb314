//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Visual Results Server",
        version = "0.1.0",
        description = "API server for test execution rollups, screenshot baselines and cached visual diffs"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Build endpoints
        api::builds::create_build,
        api::builds::get_build,
        api::builds::get_build_summary,
        api::builds::record_execution,
        api::builds::list_executions,
        // Screenshot endpoints
        api::screenshots::register_screenshot,
        api::screenshots::get_screenshot,
        api::screenshots::create_dynamic_baseline,
        // Baseline endpoints
        api::baselines::create_baseline,
        api::baselines::list_baselines,
        api::baselines::rebind_baseline,
        api::baselines::update_ignore_boxes,
        // Diff endpoints
        api::diffs::compare,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Rollups
            models::Outcome,
            models::Histogram,
            models::TimeSpan,
            models::RollupSummary,
            // Builds
            models::Build,
            models::Suite,
            models::SuiteKey,
            models::CreateBuildRequest,
            models::BuildSummaryResponse,
            models::SuiteSummary,
            // Executions
            models::Step,
            models::Action,
            models::Execution,
            models::ExecutionSummary,
            models::NewAction,
            models::NewExecution,
            // Screenshots
            models::Platform,
            models::Screenshot,
            models::ScreenshotKind,
            models::RegisterScreenshotRequest,
            // Baselines
            models::IgnoreBox,
            models::Baseline,
            models::CreateBaselineRequest,
            models::RebindBaselineRequest,
            models::UpdateIgnoreBoxesRequest,
            // Diffs
            models::CompareRequest,
            models::DiffScore,
            models::DiffArtifact,
            models::DynamicBaselineRequest,
            models::DynamicBaselineResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Builds", description = "Builds, executions and rollups"),
        (name = "Screenshots", description = "Screenshot registration and dynamic baselines"),
        (name = "Baselines", description = "Baseline promotion and maintenance"),
        (name = "Diffs", description = "Cached visual comparison")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/health",
            "/api/v1/builds/{build_id}/executions",
            "/api/v1/screenshots/{screenshot_id}/dynamic-baseline",
            "/api/v1/baselines/{baseline_id}/ignore-boxes",
            "/api/v1/diffs",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
