//! API endpoint modules.

pub mod baselines;
pub mod builds;
pub mod diffs;
pub mod health;
pub mod openapi;
pub mod screenshots;

pub use baselines::configure_routes as configure_baseline_routes;
pub use builds::configure_routes as configure_build_routes;
pub use diffs::configure_routes as configure_diff_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use screenshots::configure_routes as configure_screenshot_routes;

use actix_web::web;

/// Mount every versioned route on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_build_routes)
        .configure(configure_screenshot_routes)
        .configure(configure_baseline_routes)
        .configure(configure_diff_routes);
}
