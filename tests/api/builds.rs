use serde_json::json;
use uuid::Uuid;

use crate::common::{TestContext, create_build, get_json, post_json};

fn step(name: &str, status: &str, at: &str) -> serde_json::Value {
    json!({ "name": name, "status": status, "timestamp": at })
}

#[actix_rt::test]
async fn test_login_suite_rolls_up_to_fail() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;
    let uri = format!("/api/v1/builds/{}/executions", build_id);

    let (status, passed) = post_json(
        &app,
        &uri,
        json!({
            "title": "logs in with valid password",
            "suite_name": "Login",
            "actions": [{
                "name": "submit",
                "steps": [
                    step("type password", "PASS", "2026-10-18T10:00:00Z"),
                    step("press enter", "PASS", "2026-10-18T10:00:05Z"),
                ]
            }]
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", passed);
    assert_eq!(passed["status"], "PASS");

    let (status, failed) = post_json(
        &app,
        &uri,
        json!({
            "title": "rejects wrong password",
            "suite_name": "login",
            "actions": [{
                "name": "submit",
                "steps": [
                    step("type password", "PASS", "2026-10-18T10:01:00Z"),
                    step("see error", "FAIL", "2026-10-18T10:01:09Z"),
                ]
            }]
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", failed);
    assert_eq!(failed["status"], "FAIL");

    let (status, summary) = get_json(&app, &format!("/api/v1/builds/{}/summary", build_id)).await;
    assert_eq!(status, 200);
    assert_eq!(summary["rollup"]["status"], "FAIL");
    assert_eq!(summary["rollup"]["histogram"]["PASS"], 1);
    assert_eq!(summary["rollup"]["histogram"]["FAIL"], 1);
    assert_eq!(summary["rollup"]["start"], "2026-10-18T10:00:00Z");
    assert_eq!(summary["rollup"]["end"], "2026-10-18T10:01:09Z");

    let suites = summary["suites"].as_array().unwrap();
    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0]["name"], "Login");
    assert_eq!(suites[0]["rollup"]["status"], "FAIL");

    let (status, executions) = get_json(&app, &uri).await;
    assert_eq!(status, 200);
    assert_eq!(executions.as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_resubmitted_execution_replaces_earlier_report() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    let build_id = create_build(&app, "nightly").await;
    let uri = format!("/api/v1/builds/{}/executions", build_id);
    let id = Uuid::now_v7();

    for status in ["FAIL", "PASS"] {
        let (code, _) = post_json(
            &app,
            &uri,
            json!({
                "id": id,
                "title": "checkout",
                "suite_name": "cart",
                "actions": [{
                    "name": "pay",
                    "steps": [step("confirm", status, "2026-10-18T11:00:00Z")]
                }]
            }),
        )
        .await;
        assert_eq!(code, 201);
    }

    let (_, build) = get_json(&app, &format!("/api/v1/builds/{}", build_id)).await;
    assert_eq!(build["status"], "PASS");
    assert_eq!(build["histogram"]["PASS"], 1);
    assert_eq!(build["histogram"]["FAIL"], 0);
    assert_eq!(build["suites"][0]["executions"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_build_errors() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let missing = Uuid::now_v7();
    let (status, body) = get_json(&app, &format!("/api/v1/builds/{}", missing)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = post_json(
        &app,
        &format!("/api/v1/builds/{}/executions", missing),
        json!({ "title": "t", "suite_name": "s" }),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = post_json(&app, "/api/v1/builds", json!({ "name": "  " })).await;
    assert_eq!(status, 400);

    let build_id = create_build(&app, "nightly").await;
    let (status, _) = post_json(
        &app,
        &format!("/api/v1/builds/{}/executions", build_id),
        json!({ "title": "t", "suite_name": "" }),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let (status, body) = get_json(&app, "/api/v1/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = get_json(&app, "/api/v1/ready").await;
    assert_eq!(status, 200);
    assert_eq!(body["store"], "reachable");
}
