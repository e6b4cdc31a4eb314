//! Visual diff API handler.

use actix_web::{HttpResponse, web};

use crate::error::AppResult;
use crate::models::CompareRequest;
use crate::services::DiffCache;

/// Compare two stored images and return the diff artifact.
///
/// Cached artifacts are returned without a score; fresh comparisons include one.
#[utoipa::path(
    post,
    path = "/api/v1/diffs",
    tag = "Diffs",
    request_body = CompareRequest,
    responses(
        (status = 200, description = "Diff artifact", body = crate::models::DiffArtifact),
        (status = 400, description = "Invalid ignore box or cache key", body = crate::error::ErrorResponse),
        (status = 500, description = "Source image unreadable", body = crate::error::ErrorResponse),
        (status = 504, description = "Comparison timed out", body = crate::error::ErrorResponse),
    )
)]
pub async fn compare(
    cache: web::Data<DiffCache>,
    body: web::Json<CompareRequest>,
) -> AppResult<HttpResponse> {
    let artifact = cache.compare(&body).await?;
    Ok(HttpResponse::Ok().json(artifact))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/diffs").route(web::post().to(compare)));
}
