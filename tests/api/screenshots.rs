use image::{Rgba, RgbaImage};
use serde_json::json;
use uuid::Uuid;

use crate::common::{GREY, TestContext, create_build, get_json, post_json, register_screenshot};

fn iphone() -> serde_json::Value {
    json!({ "platform_name": "iOS", "device_name": "iPhone12" })
}

#[actix_rt::test]
async fn test_register_and_fetch_screenshot() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;

    let shot = register_screenshot(&app, &build_id, "home", "screens/a.png", iphone(), "2026-10-18T10:00:00Z").await;
    assert_eq!(shot["fingerprint"], "ios_iphone12");
    assert_eq!(shot["kind"], "captured");

    let (status, fetched) = get_json(&app, &format!("/api/v1/screenshots/{}", shot["id"].as_str().unwrap())).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, shot);

    let (status, _) = get_json(&app, &format!("/api/v1/screenshots/{}", Uuid::now_v7())).await;
    assert_eq!(status, 404);

    let (status, _) = post_json(
        &app,
        "/api/v1/screenshots",
        json!({ "build_id": Uuid::now_v7(), "view": "home", "path": "screens/a.png" }),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_dynamic_baseline_folds_prior_captures_and_can_be_promoted() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;

    let current = RgbaImage::from_pixel(8, 8, GREY);
    let mut older = current.clone();
    older.put_pixel(2, 2, Rgba([0, 0, 0, 255]));
    ctx.put_image("screens/older.png", &older).await;
    ctx.put_image("screens/current.png", &current).await;

    let prior = register_screenshot(&app, &build_id, "home", "screens/older.png", iphone(), "2026-10-18T09:00:00Z").await;
    let target = register_screenshot(&app, &build_id, "home", "screens/current.png", iphone(), "2026-10-18T10:00:00Z").await;

    let (status, response) = post_json(
        &app,
        &format!("/api/v1/screenshots/{}/dynamic-baseline", target["id"].as_str().unwrap()),
        json!({}),
    )
    .await;
    assert_eq!(status, 201, "{}", response);
    assert_eq!(response["folded"], json!([prior["id"]]));

    let dynamic = &response["screenshot"];
    assert_eq!(dynamic["kind"], "dynamic");
    assert_eq!(dynamic["width"], 8);
    assert!(dynamic["path"].as_str().unwrap().starts_with("diffs/"));
    assert!(dynamic["thumbnail_path"].as_str().unwrap().starts_with("thumbnails/"));

    let (status, baseline) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": dynamic["id"] }),
    )
    .await;
    assert_eq!(status, 201, "{}", baseline);
    assert_eq!(baseline["screenshot_id"], dynamic["id"]);
}

#[actix_rt::test]
async fn test_dynamic_baseline_for_unknown_screenshot() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let (status, _) = post_json(
        &app,
        &format!("/api/v1/screenshots/{}/dynamic-baseline", Uuid::now_v7()),
        json!({}),
    )
    .await;
    assert_eq!(status, 404);
}
