use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, Error, test, web};
use image::{Rgba, RgbaImage};
use serde_json::{Value, json};
use tempfile::TempDir;

use vrs_lib::api::configure_api;
use vrs_lib::config::DiffSettings;
use vrs_lib::db::{MemoryStore, Store};
use vrs_lib::middleware::RequestLogger;
use vrs_lib::services::pixel_diff::encode_png;
use vrs_lib::services::{BlobStore, BuildLocks, DiffCache, LocalStorage};

pub const GREY: Rgba<u8> = Rgba([120, 120, 120, 255]);

/// Shared state behind one test app.
pub struct TestContext {
    _dir: TempDir,
    pub store: web::Data<dyn Store>,
    pub cache: web::Data<DiffCache>,
    pub locks: web::Data<BuildLocks>,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let settings = DiffSettings {
            thumbnail_width: 4,
            thumbnail_height: 4,
            ..DiffSettings::default()
        };
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

        TestContext {
            _dir: dir,
            store: web::Data::from(store),
            cache: web::Data::new(DiffCache::new(blobs, settings)),
            locks: web::Data::new(BuildLocks::new()),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
        test::init_service(
            App::new()
                .wrap(RequestLogger)
                .app_data(self.store.clone())
                .app_data(self.cache.clone())
                .app_data(self.locks.clone())
                .service(web::scope("/api/v1").configure(configure_api)),
        )
        .await
    }

    pub async fn put_image(&self, key: &str, image: &RgbaImage) {
        self.cache
            .blobs()
            .put(key, encode_png(image).unwrap(), Some("image/png"))
            .await
            .unwrap();
    }
}

pub async fn post_json<S, B>(app: &S, uri: &str, body: Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    send(app, test::TestRequest::post().uri(uri).set_json(body).to_request()).await
}

pub async fn put_json<S, B>(app: &S, uri: &str, body: Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    send(app, test::TestRequest::put().uri(uri).set_json(body).to_request()).await
}

pub async fn get_json<S, B>(app: &S, uri: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    send(app, test::TestRequest::get().uri(uri).to_request()).await
}

async fn send<S, B>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

pub async fn create_build<S, B>(app: &S, name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, build) = post_json(app, "/api/v1/builds", json!({ "name": name })).await;
    assert_eq!(status, 201);
    build["id"].as_str().unwrap().to_string()
}

pub async fn register_screenshot<S, B>(
    app: &S,
    build_id: &str,
    view: &str,
    path: &str,
    platform: Value,
    captured_at: &str,
) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, screenshot) = post_json(
        app,
        "/api/v1/screenshots",
        json!({
            "build_id": build_id,
            "view": view,
            "path": path,
            "platform": platform,
            "captured_at": captured_at,
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", screenshot);
    screenshot
}
