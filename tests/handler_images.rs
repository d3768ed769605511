mod common;

use axum_test::TestServer;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use std::sync::Arc;
use tiny_site::api::middleware::rate_limit::IMAGE_BURST;

async fn setup_with(optimizer: Arc<common::StubOptimizer>) -> (TestServer, common::TestApp) {
    let app = common::create_test_app_with_optimizer(optimizer);
    let server = TestServer::new(app.router.clone()).unwrap();

    server
        .post("/zones")
        .json(&json!({ "name": "banners", "owner": "tree" }))
        .await
        .assert_status_success();

    (server, app)
}

async fn setup() -> (TestServer, common::TestApp) {
    setup_with(Arc::new(common::StubOptimizer::default())).await
}

async fn upload(server: &TestServer, name: &str, data: &[u8], max_age: &str) {
    server
        .post("/files")
        .json(&json!({
            "name": name,
            "zone": 1,
            "maxAge": max_age,
            "creator": "tree",
            "data": STANDARD.encode(data),
        }))
        .await
        .assert_status_success();
}

#[tokio::test]
async fn test_image_config() {
    let (server, _app) = setup().await;

    let response = server.get("/images/v1/config").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["url"],
        "https://img.example.com/images/v1/:file"
    );
}

#[tokio::test]
async fn test_original_is_served_without_optimizer() {
    let (server, app) = setup().await;
    let png = common::png(64, 48);
    upload(&server, "logo", &png, "2h").await;
    let calls_after_upload = app.optimizer.calls();

    let response = server.get("/images/v1/logo.png").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().to_vec(), png);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("cache-control"), "public, max-age=7200");
    assert_eq!(app.optimizer.calls(), calls_after_upload);
}

#[tokio::test]
async fn test_variant_is_optimized_once_then_cached() {
    let (server, app) = setup().await;
    upload(&server, "logo", &common::png(640, 480), "1h").await;
    let calls_after_upload = app.optimizer.calls();

    let first = server.get("/images/v1/logo-80-200-0.webp").await;
    first.assert_status_ok();
    assert_eq!(first.header("content-type"), "image/webp");
    assert_eq!(
        first.as_bytes().to_vec(),
        common::StubOptimizer::OUTPUT.to_vec()
    );

    let second = server.get("/images/v1/logo-80-200-0.webp").await;
    second.assert_status_ok();

    assert_eq!(app.optimizer.calls(), calls_after_upload + 1);
    assert!(
        app.kv
            .keys()
            .contains(&"optim:0:logo-80-200-0.webp".to_string())
    );
}

#[tokio::test]
async fn test_etag_and_if_none_match() {
    let (server, _app) = setup().await;
    upload(&server, "logo", &common::png(10, 10), "1h").await;

    let response = server.get("/images/v1/logo.png").await;
    let etag = response.header("etag").to_str().unwrap().to_string();
    assert!(etag.starts_with('"') && etag.ends_with('"'));

    let response = server
        .get("/images/v1/logo.png")
        .add_header("If-None-Match", etag.as_str())
        .await;
    assert_eq!(response.status_code(), 304);
    assert!(response.as_bytes().is_empty());
    assert_eq!(response.header("etag"), etag.as_str());
}

#[tokio::test]
async fn test_optim_json() {
    let (server, _app) = setup().await;
    upload(&server, "photo", &common::jpeg(800, 600), "30m").await;

    let response = server.get("/images/v1/optim/photo-0-100-0.webp").await;
    response.assert_status_ok();

    let image = response.json::<Value>();
    assert_eq!(image["name"], "photo");
    assert_eq!(image["type"], "webp");
    assert_eq!(image["width"], 100);
    assert_eq!(image["maxAge"], "30m");
    assert_eq!(
        image["data"],
        STANDARD.encode(common::StubOptimizer::OUTPUT)
    );
}

#[tokio::test]
async fn test_image_errors() {
    let (server, _app) = setup().await;

    let response = server.get("/images/v1/logo.gif").await;
    assert_eq!(response.status_code(), 400);

    let response = server.get("/images/v1/logo-1-2.png").await;
    assert_eq!(response.status_code(), 400);

    let response = server.get("/images/v1/missing.png").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_changed_file_is_not_served_from_cache() {
    let (server, app) = setup().await;
    upload(&server, "logo", &common::png(640, 480), "1h").await;
    let calls_after_upload = app.optimizer.calls();

    let response = server.get("/images/v1/logo-80-200-0.webp").await;
    assert_eq!(response.header("cache-control"), "public, max-age=3600");

    server
        .patch("/files/1")
        .json(&json!({ "maxAge": "2h" }))
        .await
        .assert_status_ok();

    let response = server.get("/images/v1/logo-80-200-0.webp").await;
    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "public, max-age=7200");
    assert_eq!(app.optimizer.calls(), calls_after_upload + 2);

    assert_eq!(server.delete("/files/1").await.status_code(), 204);

    let response = server.get("/images/v1/logo-80-200-0.webp").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_image_routes_are_rate_limited_per_client() {
    let (server, _app) = setup().await;

    let mut limited = false;
    for _ in 0..IMAGE_BURST * 2 {
        if server.get("/images/v1/config").await.status_code() == 429 {
            limited = true;
            break;
        }
    }
    assert!(limited, "image routes never answered 429");

    for _ in 0..IMAGE_BURST + 10 {
        server.get("/zones").await.assert_status_ok();
    }
}
