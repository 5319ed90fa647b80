mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{Value, json};

use common::{TestApp, test_app};
use nanhi_link::domain::entities::{GeoLocation, NewClick};
use nanhi_link::domain::repositories::ClickRepository;

fn authed(server: &TestServer, app: &TestApp, method: &str, path: &str) -> TestRequest {
    let request = match method {
        "POST" => server.post(path),
        "PUT" => server.put(path),
        "DELETE" => server.delete(path),
        _ => server.get(path),
    };
    request.add_header(
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_str(&app.api_key).unwrap(),
    )
}

async fn create(server: &TestServer, app: &TestApp, body: Value) -> Value {
    let response = authed(server, app, "POST", "/api/links").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_missing_api_key() {
    let app = test_app().await;
    let server = app.api_server();

    let response = server.get("/api/links").await;

    response.assert_status_unauthorized();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "MISSING_API_KEY");
}

#[tokio::test]
async fn test_invalid_api_key() {
    let app = test_app().await;
    let server = app.api_server();

    let response = server
        .get("/api/links")
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("nl_not-a-real-key"),
        )
        .await;

    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["error"]["code"], "INVALID_API_KEY");
}

#[tokio::test]
async fn test_api_key_in_query() {
    let app = test_app().await;
    let server = app.api_server();

    let response = server
        .get("/api/links")
        .add_query_param("api_key", &app.api_key)
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_link_generates_code() {
    let app = test_app().await;
    let server = app.api_server();

    let json = create(
        &server,
        &app,
        json!({ "destination_url": "https://example.com/launch" }),
    )
    .await;

    let code = json["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert_eq!(
        json["short_url"],
        format!("{}/{}", common::BASE_URL, code)
    );
    assert_eq!(json["destination_url"], "https://example.com/launch");
    assert_eq!(json["redirect_type"], 302);
    assert_eq!(json["password_protected"], false);
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_link_with_options() {
    let app = test_app().await;
    let server = app.api_server();

    let json = create(
        &server,
        &app,
        json!({
            "destination_url": "https://example.com",
            "short_code": "spring-sale",
            "password": "hunter2",
            "redirect_type": 301,
            "click_limit": 50,
            "utm": { "source": "newsletter" }
        }),
    )
    .await;

    assert_eq!(json["short_code"], "spring-sale");
    assert_eq!(json["password_protected"], true);
    assert_eq!(json["redirect_type"], 301);
    assert_eq!(json["click_limit"], 50);
    assert_eq!(json["utm"]["source"], "newsletter");
}

#[tokio::test]
async fn test_create_link_duplicate_code() {
    let app = test_app().await;
    let server = app.api_server();
    let body = json!({ "destination_url": "https://example.com", "short_code": "taken" });

    create(&server, &app, body.clone()).await;
    let response = authed(&server, &app, "POST", "/api/links").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "SHORT_CODE_TAKEN");
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "POST", "/api/links")
        .json(&json!({ "destination_url": "javascript:alert(1)" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "INVALID_URL");
}

#[tokio::test]
async fn test_create_link_invalid_short_code() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "POST", "/api/links")
        .json(&json!({ "destination_url": "https://example.com", "short_code": "a b" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "INVALID_SHORT_CODE"
    );
}

#[tokio::test]
async fn test_create_link_unknown_project() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "POST", "/api/links")
        .json(&json!({ "destination_url": "https://example.com", "project_id": 999 }))
        .await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "PROJECT_NOT_FOUND"
    );
}

#[tokio::test]
async fn test_list_links_paginated_and_searchable() {
    let app = test_app().await;
    let server = app.api_server();

    for i in 0..3 {
        create(
            &server,
            &app,
            json!({ "destination_url": format!("https://example.com/{i}"), "title": format!("Campaign {i}") }),
        )
        .await;
    }
    create(
        &server,
        &app,
        json!({ "destination_url": "https://other.example/", "title": "Launch" }),
    )
    .await;

    let response = authed(&server, &app, "GET", "/api/links")
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["total"], 4);
    assert_eq!(json["pagination"]["total_pages"], 2);

    let response = authed(&server, &app, "GET", "/api/links")
        .add_query_param("search", "LAUNCH")
        .await;
    let json = response.json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Launch");
}

#[tokio::test]
async fn test_list_links_rejects_bad_limit() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "GET", "/api/links")
        .add_query_param("limit", 101)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_get_update_delete_link() {
    let app = test_app().await;
    let server = app.api_server();

    let created = create(
        &server,
        &app,
        json!({
            "destination_url": "https://example.com",
            "password": "hunter2",
            "expires_at": "2099-01-01T00:00:00Z"
        }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let path = format!("/api/links/{id}");

    let response = authed(&server, &app, "GET", &path).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], id);

    let response = authed(&server, &app, "PUT", &path)
        .json(&json!({ "title": "Renamed", "password": "", "expires_at": null }))
        .await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["password_protected"], false);
    assert!(json["expires_at"].is_null());
    assert_eq!(json["destination_url"], "https://example.com/");

    authed(&server, &app, "DELETE", &path)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    authed(&server, &app, "GET", &path)
        .await
        .assert_status_not_found();

    let deleted = app.links.get(id).unwrap();
    assert!(deleted.deleted_at.is_some());
    assert!(!deleted.is_active);
}

#[tokio::test]
async fn test_other_owner_cannot_see_link() {
    let app = test_app().await;
    let other = app
        .state
        .auth_service
        .create_key(uuid::Uuid::new_v4(), "other")
        .await
        .unwrap()
        .1;
    let server = app.api_server();

    let created = create(&server, &app, json!({ "destination_url": "https://example.com" })).await;
    let path = format!("/api/links/{}", created["id"]);

    let response = server
        .get(&path)
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(&other).unwrap(),
        )
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_bulk_create_mixed_results() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "POST", "/api/links/bulk")
        .json(&json!({
            "links": [
                { "destination_url": "https://example.com/a" },
                { "destination_url": "ftp://example.com/b" },
                { "destination_url": "https://example.com/c", "click_limit": 0 },
                { "destination_url": "https://example.com/d", "short_code": "bulk-d" }
            ]
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["summary"]["total"], 4);
    assert_eq!(json["summary"]["successful"], 2);
    assert_eq!(json["summary"]["failed"], 2);

    let items = json["items"].as_array().unwrap();
    assert!(items[0]["link"]["short_code"].is_string());
    assert_eq!(items[1]["error"]["code"], "INVALID_URL");
    assert_eq!(items[2]["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(items[3]["link"]["short_code"], "bulk-d");
}

#[tokio::test]
async fn test_bulk_create_too_many() {
    let app = test_app().await;
    let server = app.api_server();

    let links: Vec<Value> = (0..101)
        .map(|i| json!({ "destination_url": format!("https://example.com/{i}") }))
        .collect();

    let response = authed(&server, &app, "POST", "/api/links/bulk")
        .json(&json!({ "links": links }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_projects_and_stats() {
    let app = test_app().await;
    let server = app.api_server();

    let response = authed(&server, &app, "POST", "/api/projects")
        .json(&json!({ "name": "  Spring  ", "description": "" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let project = response.json::<Value>();
    assert_eq!(project["name"], "Spring");
    assert!(project["description"].is_null());

    create(
        &server,
        &app,
        json!({ "destination_url": "https://example.com", "project_id": project["id"] }),
    )
    .await;

    let response = authed(&server, &app, "GET", "/api/projects").await;
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    let response = authed(&server, &app, "GET", "/api/links")
        .add_query_param("project_id", project["id"].as_i64().unwrap())
        .await;
    assert_eq!(response.json::<Value>()["pagination"]["total"], 1);

    let response = authed(&server, &app, "GET", "/api/stats").await;
    response.assert_status_ok();
    let stats = response.json::<Value>();
    assert_eq!(stats["total_links"], 1);
    assert_eq!(stats["active_links"], 1);
}

#[tokio::test]
async fn test_link_analytics() {
    let app = test_app().await;
    let server = app.api_server();

    let created = create(&server, &app, json!({ "destination_url": "https://example.com" })).await;
    let id = created["id"].as_i64().unwrap();

    for ip in ["198.51.100.23", "198.51.100.23", "198.51.100.24"] {
        app.clicks
            .record_click(NewClick {
                link_id: id,
                clicked_at: chrono::Utc::now(),
                ip: Some(ip.to_string()),
                user_agent: None,
                referer: None,
                device: "Desktop".to_string(),
                browser: "Firefox".to_string(),
                os: "Linux".to_string(),
                location: GeoLocation::unknown(),
            })
            .await
            .unwrap();
    }

    let response = authed(&server, &app, "GET", &format!("/api/links/{id}/analytics"))
        .add_query_param("period", "24h")
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["period"], "24h");
    assert_eq!(json["total_clicks"], 3);
    assert_eq!(json["unique_visitors"], 2);

    let recent = json["recent_clicks"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    for click in recent {
        let ip = click["ip"].as_str().unwrap();
        assert!(ip.ends_with(".xxx"), "ip not masked: {ip}");
    }

    let response = authed(&server, &app, "GET", &format!("/api/links/{id}/analytics"))
        .add_query_param("period", "1y")
        .await;
    response.assert_status_bad_request();
}
