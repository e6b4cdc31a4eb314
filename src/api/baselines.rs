//! Baseline API handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppResult;
use crate::models::{CreateBaselineRequest, RebindBaselineRequest, UpdateIgnoreBoxesRequest};
use crate::services::baselines;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBaselinesQuery {
    /// Only baselines of this view.
    pub view: Option<String>,
}

/// Promote a screenshot to a baseline.
#[utoipa::path(
    post,
    path = "/api/v1/baselines",
    tag = "Baselines",
    request_body = CreateBaselineRequest,
    responses(
        (status = 201, description = "Baseline created", body = crate::models::Baseline),
        (status = 400, description = "Screenshot is not a valid baseline target", body = crate::error::ErrorResponse),
        (status = 404, description = "Screenshot not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A baseline already covers this view and platform", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_baseline(
    store: web::Data<dyn Store>,
    body: web::Json<CreateBaselineRequest>,
) -> AppResult<HttpResponse> {
    let baseline = baselines::create_baseline(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(baseline))
}

#[utoipa::path(
    get,
    path = "/api/v1/baselines",
    tag = "Baselines",
    params(ListBaselinesQuery),
    responses(
        (status = 200, description = "Baselines", body = Vec<crate::models::Baseline>),
    )
)]
pub async fn list_baselines(
    store: web::Data<dyn Store>,
    query: web::Query<ListBaselinesQuery>,
) -> AppResult<HttpResponse> {
    let view = query.view.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let baselines = store.list_baselines(view).await?;
    Ok(HttpResponse::Ok().json(baselines))
}

/// Point a baseline at a newer screenshot of the same view and platform.
#[utoipa::path(
    put,
    path = "/api/v1/baselines/{baseline_id}/screenshot",
    tag = "Baselines",
    params(
        ("baseline_id" = Uuid, Path, description = "Baseline UUID")
    ),
    request_body = RebindBaselineRequest,
    responses(
        (status = 200, description = "Baseline updated", body = crate::models::Baseline),
        (status = 400, description = "View or platform mismatch", body = crate::error::ErrorResponse),
        (status = 404, description = "Baseline or screenshot not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn rebind_baseline(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<RebindBaselineRequest>,
) -> AppResult<HttpResponse> {
    let baseline =
        baselines::rebind_baseline(store.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(baseline))
}

#[utoipa::path(
    put,
    path = "/api/v1/baselines/{baseline_id}/ignore-boxes",
    tag = "Baselines",
    params(
        ("baseline_id" = Uuid, Path, description = "Baseline UUID")
    ),
    request_body = UpdateIgnoreBoxesRequest,
    responses(
        (status = 200, description = "Ignore regions replaced", body = crate::models::Baseline),
        (status = 400, description = "Invalid ignore box", body = crate::error::ErrorResponse),
        (status = 404, description = "Baseline not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_ignore_boxes(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateIgnoreBoxesRequest>,
) -> AppResult<HttpResponse> {
    let baseline =
        baselines::update_ignore_boxes(store.get_ref(), path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(baseline))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/baselines")
            .route(web::get().to(list_baselines))
            .route(web::post().to(create_baseline)),
    )
    .service(
        web::resource("/baselines/{baseline_id}/screenshot").route(web::put().to(rebind_baseline)),
    )
    .service(
        web::resource("/baselines/{baseline_id}/ignore-boxes")
            .route(web::put().to(update_ignore_boxes)),
    );
}
