//! Visual Results Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vrs_lib::api::{self, ApiDoc};
use vrs_lib::config::{ArtifactBackend, Config};
use vrs_lib::db::{DbPool, Store};
use vrs_lib::error::AppResult;
use vrs_lib::middleware;
use vrs_lib::services::{BlobStore, BuildLocks, DiffCache, LocalStorage, S3Storage};

async fn open_artifacts(backend: &ArtifactBackend) -> AppResult<Arc<dyn BlobStore>> {
    Ok(match backend {
        ArtifactBackend::Local(dir) => {
            info!("Artifacts stored on local disk at {:?}", dir);
            Arc::new(LocalStorage::new(dir.clone()).await?)
        }
        ArtifactBackend::S3(settings) => {
            info!("Artifacts stored in S3 bucket '{}'", settings.bucket);
            Arc::new(S3Storage::new(settings).await?)
        }
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and S3 credentials must not use development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Visual Results Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("{}", e);
        std::process::exit(1);
    }

    let blobs = match open_artifacts(&config.artifacts).await {
        Ok(blobs) => blobs,
        Err(e) => {
            error!("Failed to initialize artifact storage: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn Store> = Arc::new(pool);
    let store = web::Data::from(store);
    let cache = web::Data::new(DiffCache::new(blobs, config.diff));
    let locks = web::Data::new(BuildLocks::new());

    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // CORS must wrap first
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(store.clone())
            .app_data(cache.clone())
            .app_data(locks.clone())
            .service(web::scope("/api/v1").configure(api::configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
