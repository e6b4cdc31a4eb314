use image::{Rgba, RgbaImage};
use serde_json::json;

use crate::common::{GREY, TestContext, post_json};

#[actix_rt::test]
async fn test_second_compare_is_served_from_cache() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let base = RgbaImage::from_pixel(10, 10, GREY);
    let mut changed = base.clone();
    changed.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
    ctx.put_image("screens/a.png", &base).await;
    ctx.put_image("screens/b.png", &changed).await;

    let request = json!({ "image_a": "screens/a.png", "image_b": "screens/b.png" });

    let (status, first) = post_json(&app, "/api/v1/diffs", request.clone()).await;
    assert_eq!(status, 200, "{}", first);
    assert_eq!(first["cached"], false);
    assert_eq!(first["score"]["mismatched_pixels"], 1);
    assert_eq!(first["score"]["compared_pixels"], 100);

    let (status, second) = post_json(&app, "/api/v1/diffs", request).await;
    assert_eq!(status, 200);
    assert_eq!(second["cached"], true);
    assert_eq!(second["path"], first["path"]);
    assert!(second.get("score").is_none());
    assert_eq!(ctx.cache.computations(), 1);

    let (_, bypass) = post_json(
        &app,
        "/api/v1/diffs",
        json!({ "image_a": "screens/a.png", "image_b": "screens/b.png", "use_cache": false }),
    )
    .await;
    assert_eq!(bypass["cached"], false);
    assert_eq!(ctx.cache.computations(), 2);
}

#[actix_rt::test]
async fn test_ignored_region_is_not_scored() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let base = RgbaImage::from_pixel(10, 10, GREY);
    let mut changed = base.clone();
    changed.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
    ctx.put_image("screens/a.png", &base).await;
    ctx.put_image("screens/b.png", &changed).await;

    let (status, diff) = post_json(
        &app,
        "/api/v1/diffs",
        json!({
            "image_a": "screens/a.png",
            "image_b": "screens/b.png",
            "ignore_boxes": [{ "left": 0, "top": 0, "right": 2, "bottom": 2 }]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(diff["score"]["mismatched_pixels"], 0);
    assert_eq!(diff["score"]["compared_pixels"], 96);
    assert_eq!(diff["score"]["matches"], true);
}

#[actix_rt::test]
async fn test_compare_errors() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    ctx.put_image("screens/a.png", &RgbaImage::from_pixel(2, 2, GREY)).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/diffs",
        json!({ "image_a": "screens/a.png", "image_b": "screens/missing.png" }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "IO_FAILURE");

    let (status, _) = post_json(
        &app,
        "/api/v1/diffs",
        json!({ "image_a": "screens/a.png", "image_b": "screens/a.png", "cache_key": "../escape" }),
    )
    .await;
    assert_eq!(status, 400);
}
