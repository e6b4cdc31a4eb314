//! Build and execution API handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppResult;
use crate::models::{CreateBuildRequest, NewExecution};
use crate::services::{BuildLocks, builds};

/// Create a build.
#[utoipa::path(
    post,
    path = "/api/v1/builds",
    tag = "Builds",
    request_body = CreateBuildRequest,
    responses(
        (status = 201, description = "Build created", body = crate::models::Build),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_build(
    store: web::Data<dyn Store>,
    body: web::Json<CreateBuildRequest>,
) -> AppResult<HttpResponse> {
    let build = builds::create_build(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(build))
}

/// Get a build with its suites and rollups.
#[utoipa::path(
    get,
    path = "/api/v1/builds/{build_id}",
    tag = "Builds",
    params(
        ("build_id" = Uuid, Path, description = "Build UUID")
    ),
    responses(
        (status = 200, description = "Build", body = crate::models::Build),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_build(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let build = builds::get_build(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(build))
}

/// Rollups of a build and each suite, without execution lists.
#[utoipa::path(
    get,
    path = "/api/v1/builds/{build_id}/summary",
    tag = "Builds",
    params(
        ("build_id" = Uuid, Path, description = "Build UUID")
    ),
    responses(
        (status = 200, description = "Build summary", body = crate::models::BuildSummaryResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_build_summary(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let build = builds::get_build(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(builds::summarize(&build)))
}

/// Record an execution. Re-posting an execution id replaces the earlier report.
#[utoipa::path(
    post,
    path = "/api/v1/builds/{build_id}/executions",
    tag = "Builds",
    params(
        ("build_id" = Uuid, Path, description = "Build UUID")
    ),
    request_body = NewExecution,
    responses(
        (status = 201, description = "Execution recorded", body = crate::models::Execution),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Execution belongs to another build", body = crate::error::ErrorResponse),
    )
)]
pub async fn record_execution(
    store: web::Data<dyn Store>,
    locks: web::Data<BuildLocks>,
    path: web::Path<Uuid>,
    body: web::Json<NewExecution>,
) -> AppResult<HttpResponse> {
    let execution = builds::record_execution(
        store.get_ref(),
        locks.get_ref(),
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(execution))
}

/// List a build's executions.
#[utoipa::path(
    get,
    path = "/api/v1/builds/{build_id}/executions",
    tag = "Builds",
    params(
        ("build_id" = Uuid, Path, description = "Build UUID")
    ),
    responses(
        (status = 200, description = "Executions in report order", body = Vec<crate::models::Execution>),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_executions(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let build = builds::get_build(store.get_ref(), path.into_inner()).await?;
    let executions = store.list_executions(build.id).await?;
    Ok(HttpResponse::Ok().json(executions))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/builds").route(web::post().to(create_build)))
        .service(web::resource("/builds/{build_id}").route(web::get().to(get_build)))
        .service(
            web::resource("/builds/{build_id}/summary").route(web::get().to(get_build_summary)),
        )
        .service(
            web::resource("/builds/{build_id}/executions")
                .route(web::get().to(list_executions))
                .route(web::post().to(record_execution)),
        );
}
