use serde_json::json;
use uuid::Uuid;

use crate::common::{TestContext, create_build, get_json, post_json, put_json, register_screenshot};

fn iphone() -> serde_json::Value {
    json!({ "platform_name": "iOS", "device_name": "iPhone12" })
}

fn pixel() -> serde_json::Value {
    json!({ "platform_name": "Android", "device_name": "Pixel7" })
}

#[actix_rt::test]
async fn test_second_home_baseline_for_same_device_conflicts() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;

    let first = register_screenshot(&app, &build_id, "home", "screens/home-1.png", iphone(), "2026-10-18T10:00:00Z").await;
    let second = register_screenshot(&app, &build_id, "home", "screens/home-2.png", iphone(), "2026-10-18T10:05:00Z").await;
    let android = register_screenshot(&app, &build_id, "home", "screens/home-3.png", pixel(), "2026-10-18T10:05:00Z").await;

    let (status, baseline) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": first["id"] }),
    )
    .await;
    assert_eq!(status, 201, "{}", baseline);
    assert_eq!(baseline["fingerprint"], "ios_iphone12");

    let (status, body) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": second["id"] }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "CONFLICT");

    let (status, _) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": android["id"] }),
    )
    .await;
    assert_eq!(status, 201);

    let (status, listed) = get_json(&app, "/api/v1/baselines?view=home").await;
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().unwrap().len(), 2);
    let (_, listed) = get_json(&app, "/api/v1/baselines?view=cart").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_rebind_requires_same_view_and_platform() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;

    let original = register_screenshot(&app, &build_id, "home", "screens/a.png", iphone(), "2026-10-18T10:00:00Z").await;
    let newer = register_screenshot(&app, &build_id, "home", "screens/b.png", iphone(), "2026-10-18T11:00:00Z").await;
    let other_device = register_screenshot(&app, &build_id, "home", "screens/c.png", pixel(), "2026-10-18T11:00:00Z").await;
    let other_view = register_screenshot(&app, &build_id, "cart", "screens/d.png", iphone(), "2026-10-18T11:00:00Z").await;

    let (_, baseline) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": original["id"] }),
    )
    .await;
    let uri = format!("/api/v1/baselines/{}/screenshot", baseline["id"].as_str().unwrap());

    for rejected in [&other_device, &other_view] {
        let (status, body) = put_json(&app, &uri, json!({ "screenshot_id": rejected["id"] })).await;
        assert_eq!(status, 400, "{}", body);
    }

    let (status, rebound) = put_json(&app, &uri, json!({ "screenshot_id": newer["id"] })).await;
    assert_eq!(status, 200);
    assert_eq!(rebound["screenshot_id"], newer["id"]);

    let (status, _) = put_json(
        &app,
        &format!("/api/v1/baselines/{}/screenshot", Uuid::now_v7()),
        json!({ "screenshot_id": newer["id"] }),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_ignore_boxes_are_validated_and_replaced() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;
    let shot = register_screenshot(&app, &build_id, "home", "screens/a.png", iphone(), "2026-10-18T10:00:00Z").await;

    let (_, baseline) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": shot["id"] }),
    )
    .await;
    let uri = format!("/api/v1/baselines/{}/ignore-boxes", baseline["id"].as_str().unwrap());

    let (status, _) = put_json(
        &app,
        &uri,
        json!({ "ignore_boxes": [{ "left": 10, "top": 0, "right": 5, "bottom": 5 }] }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, updated) = put_json(
        &app,
        &uri,
        json!({ "ignore_boxes": [{ "left": 0, "top": 0, "right": 100, "bottom": 40 }] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["ignore_boxes"][0]["bottom"], 40);
}

#[actix_rt::test]
async fn test_screenshot_without_platform_cannot_become_baseline() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;
    let shot = register_screenshot(&app, &build_id, "home", "screens/a.png", serde_json::Value::Null, "2026-10-18T10:00:00Z").await;

    let (status, _) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": shot["id"] }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = post_json(
        &app,
        "/api/v1/baselines",
        json!({ "screenshot_id": Uuid::now_v7() }),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_browser_capture_needs_dimensions_to_become_baseline() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;
    let chrome = json!({ "platform_name": "Windows", "browser_name": "Chrome" });

    for path in ["screens/a.png", "screens/b.png"] {
        let shot = register_screenshot(&app, &build_id, "home", path, chrome.clone(), "2026-10-18T10:00:00Z").await;
        assert!(shot["fingerprint"].is_null());

        let (status, body) = post_json(
            &app,
            "/api/v1/baselines",
            json!({ "screenshot_id": shot["id"] }),
        )
        .await;
        assert_eq!(status, 400, "{}", body);
    }

    let (_, listed) = get_json(&app, "/api/v1/baselines?view=home").await;
    assert!(listed.as_array().unwrap().is_empty());
}
