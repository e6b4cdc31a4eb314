//! Screenshot API handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppResult;
use crate::models::{DynamicBaselineRequest, RegisterScreenshotRequest};
use crate::services::{DiffCache, screenshots};

/// Register a screenshot already uploaded to the artifact store.
#[utoipa::path(
    post,
    path = "/api/v1/screenshots",
    tag = "Screenshots",
    request_body = RegisterScreenshotRequest,
    responses(
        (status = 201, description = "Screenshot registered", body = crate::models::Screenshot),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn register_screenshot(
    store: web::Data<dyn Store>,
    body: web::Json<RegisterScreenshotRequest>,
) -> AppResult<HttpResponse> {
    let screenshot = screenshots::register_screenshot(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(screenshot))
}

#[utoipa::path(
    get,
    path = "/api/v1/screenshots/{screenshot_id}",
    tag = "Screenshots",
    params(
        ("screenshot_id" = Uuid, Path, description = "Screenshot UUID")
    ),
    responses(
        (status = 200, description = "Screenshot", body = crate::models::Screenshot),
        (status = 404, description = "Screenshot not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_screenshot(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let screenshot = screenshots::get_screenshot(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(screenshot))
}

/// Fold earlier captures into a screenshot to get a variance-tolerant candidate.
///
/// Without an explicit `history`, the most recent earlier captures of the same
/// view and platform are folded oldest first.
#[utoipa::path(
    post,
    path = "/api/v1/screenshots/{screenshot_id}/dynamic-baseline",
    tag = "Screenshots",
    params(
        ("screenshot_id" = Uuid, Path, description = "Screenshot UUID")
    ),
    request_body = DynamicBaselineRequest,
    responses(
        (status = 201, description = "Dynamic baseline candidate", body = crate::models::DynamicBaselineResponse),
        (status = 404, description = "Screenshot not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Artifact could not be read or written", body = crate::error::ErrorResponse),
        (status = 504, description = "Comparison timed out", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_dynamic_baseline(
    store: web::Data<dyn Store>,
    cache: web::Data<DiffCache>,
    path: web::Path<Uuid>,
    body: Option<web::Json<DynamicBaselineRequest>>,
) -> AppResult<HttpResponse> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let response = screenshots::create_dynamic_baseline(
        store.get_ref(),
        cache.get_ref(),
        path.into_inner(),
        request,
    )
    .await?;
    Ok(HttpResponse::Created().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/screenshots").route(web::post().to(register_screenshot)))
        .service(
            web::resource("/screenshots/{screenshot_id}").route(web::get().to(get_screenshot)),
        )
        .service(
            web::resource("/screenshots/{screenshot_id}/dynamic-baseline")
                .route(web::post().to(create_dynamic_baseline)),
        );
}
