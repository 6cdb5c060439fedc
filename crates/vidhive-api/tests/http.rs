//! End-to-end tests through the full router: envelope shapes, identifier
//! validation, session flow, like toggling, ownership collapse.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use vidhive_api::router::build_router;
use vidhive_api::state::AppStateInner;
use vidhive_db::Database;

const BOUNDARY: &str = "vidhive-test-boundary";

fn test_app() -> (Router, TempDir) {
    let media = tempfile::tempdir().unwrap();
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        access_secret: "test-access-secret".into(),
        refresh_secret: "test-refresh-secret".into(),
        media_root: media.path().to_path_buf(),
    });
    (build_router(state), media)
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{name}.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn register(app: &Router, username: &str) -> Value {
    let full_name = format!("{username} Example");
    let email = format!("{username}@example.com");
    let body = multipart_body(
        &[
            ("fullName", full_name.as_str()),
            ("email", email.as_str()),
            ("userName", username),
            ("password", "hunter2hunter2"),
        ],
        &[("avatar", &b"fake-png-bytes"[..])],
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/register")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

/// Login and return the accessToken cookie value.
async fn login(app: &Router, username: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(
            "{{\"userName\":\"{username}\",\"password\":\"hunter2hunter2\"}}"
        )))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2, "expected both session cookies");

    cookies
        .iter()
        .find_map(|c| c.strip_prefix("accessToken="))
        .map(|rest| rest.split(';').next().unwrap().to_string())
        .expect("accessToken cookie missing")
}

async fn publish_video(app: &Router, token: &str, title: &str) -> Value {
    let body = multipart_body(
        &[("title", title), ("description", "a test upload")],
        &[
            ("video", &b"fake-video-bytes"[..]),
            ("thumbnail", &b"fake-thumb-bytes"[..]),
        ],
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/videos")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "publish failed: {body}");
    body
}

#[tokio::test]
async fn healthcheck_wears_the_success_envelope() {
    let (app, _media) = test_app();
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/v1/healthcheck")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["message"], "Health check passed");
}

#[tokio::test]
async fn invalid_identifiers_fail_before_the_store() {
    let (app, _media) = test_app();

    for uri in [
        "/api/v1/videos/not-a-valid-id",
        "/api/v1/videos/aabbccddeeff00112233445", // 23 hex chars
        "/api/v1/comments/zz",
        "/api/v1/videos?userId=bogus",
    ] {
        let (status, body) = send(
            &app,
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}: {body}");
        assert_eq!(body["status"], "error");
        assert_eq!(body["statusCode"], 400);
    }
}

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() {
    let (app, _media) = test_app();
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/v1/users/current-user")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No login user found");
}

#[tokio::test]
async fn register_login_publish_like_unlike_scenario() {
    let (app, _media) = test_app();

    // register: sanitized user document, no credential fields
    let registered = register(&app, "alice").await;
    assert_eq!(registered["status"], "success");
    let data = registered["data"].as_object().unwrap();
    assert!(data.contains_key("userName"));
    assert!(!data.contains_key("password"));
    assert!(!data.contains_key("refreshToken"));

    // login: both session cookies issued
    let token = login(&app, "alice").await;

    // publish a video
    let published = publish_video(&app, &token, "My First Video").await;
    let video_id = published["data"]["id"].as_str().unwrap().to_string();
    assert!(published["data"]["videoFile"]
        .as_str()
        .unwrap()
        .starts_with("/media/"));

    // like it: 201 "Video liked"
    let like_uri = format!("/api/v1/likes/toggle/v/{video_id}");
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(like_uri.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Video liked");
    assert_eq!(body["data"]["targetKind"], "video");

    // like again: 200 "Like removed"
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(like_uri.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Like removed");
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn non_owner_mutations_are_indistinguishable_from_missing() {
    let (app, _media) = test_app();

    register(&app, "owner").await;
    let owner_token = login(&app, "owner").await;
    register(&app, "intruder").await;
    let intruder_token = login(&app, "intruder").await;

    let published = publish_video(&app, &owner_token, "Owned Video").await;
    let video_id = published["data"]["id"].as_str().unwrap().to_string();

    let patch = |uri: String, token: String| {
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                "{\"title\":\"t\",\"description\":\"d\",\"thumbnail\":\"/media/x\"}",
            ))
            .unwrap()
    };

    let (status, not_owned) = send(
        &app,
        patch(format!("/api/v1/videos/{video_id}"), intruder_token.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, missing) = send(
        &app,
        patch(
            "/api/v1/videos/aabbccddeeff001122334455".to_string(),
            intruder_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // identical envelopes: existence of someone else's video is not leaked
    assert_eq!(not_owned, missing);

    // the owner's own update still goes through
    let (status, body) = send(
        &app,
        patch(format!("/api/v1/videos/{video_id}"), owner_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "owner update failed: {body}");
    assert_eq!(body["data"]["title"], "t");
}

#[tokio::test]
async fn watch_history_fills_for_token_bearing_viewers() {
    let (app, _media) = test_app();

    register(&app, "alice").await;
    let token = login(&app, "alice").await;
    let published = publish_video(&app, &token, "Watched Video").await;
    let video_id = published["data"]["id"].as_str().unwrap().to_string();

    // anonymous fetch: counts a view, records nothing
    let (status, _) = send(
        &app,
        Request::builder()
            .uri(format!("/api/v1/videos/{video_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // authenticated fetch lands in the history
    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/v1/videos/{video_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 2);

    let (status, history) = send(
        &app,
        Request::builder()
            .uri("/api/v1/users/watch-history")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = history["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Watched Video");
    assert_eq!(entries[0]["owner"]["userName"], "alice");
    assert!(entries[0].get("password").is_none());
}
