mod common;

use axum::http::StatusCode;
use serde_json::Value;

use common::{TestApp, TestAppBuilder, test_app};

#[tokio::test]
async fn test_health_check_healthy() {
    let app = test_app().await;
    let server = app.api_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "nanhi-link");
    assert!(json["version"].is_string());
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_check_needs_no_api_key() {
    let app = test_app().await;

    app.api_server().get("/health").await.assert_status_ok();
    app.redirect_server().get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_health_check_database_down() {
    let app = TestAppBuilder::default().unhealthy_database().build().await;

    let response = app.api_server().get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_health_check_closed_queue() {
    let TestApp { state, click_rx, .. } = test_app().await;
    drop(click_rx);

    let server = axum_test::TestServer::new(nanhi_link::routes::api_router(state)).unwrap();
    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["checks"]["click_queue"]["status"],
        "error"
    );
}
