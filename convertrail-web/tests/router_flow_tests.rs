//! End-to-end browser flows through the router, driven with
//! `tower::ServiceExt::oneshot`; no socket is bound.
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use convertrail_web::game::Rules;
use convertrail_web::{AppState, CookieSigner, SessionStore, create_router};

fn app_state() -> AppState {
    AppState::new(
        Rules::standard(),
        SessionStore::new(Duration::from_secs(600), 1_000),
        CookieSigner::new(b"router-test-secret").unwrap(),
    )
}

fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Start a game and return the `name=value` cookie pair.
async fn start(state: &AppState) -> String {
    let response = app(state)
        .oneshot(post_form("/start_game", None, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/game");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_session_count() {
    let state = app_state();
    start(&state).await;
    let response = app(&state).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn home_page_renders() {
    let state = app_state();
    let response = app(&state).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Start Game"), "{html}");
}

#[tokio::test]
async fn pages_without_session_redirect_home() {
    let state = app_state();
    for uri in ["/game", "/run_test", "/results/0"] {
        let response = app(&state).oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }
    let response = app(&state)
        .oneshot(post_form("/run_test", None, "element=image&variant=image2&days=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_no_session() {
    let state = app_state();
    let cookie = start(&state).await;
    let forged = format!("{}00", cookie);
    let response = app(&state).oneshot(get("/game", Some(&forged))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn full_flow_start_test_results_implement() {
    let state = app_state();
    let cookie = start(&state).await;

    let response = app(&state).oneshot(get("/game", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Day 0 of 30"), "{html}");
    assert!(html.contains("$1000"), "{html}");

    let response = app(&state).oneshot(get("/run_test", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response.into_body()).await.contains("button_color"));

    let response = app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=button_color&variant=red&days=5",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/results/0");

    let response = app(&state).oneshot(get("/results/0", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("<svg"), "{html}");
    assert!(html.contains("button_color"), "{html}");

    let response = app(&state)
        .oneshot(post_form("/implement_change", Some(&cookie), "test_id=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/game");

    let response = app(&state).oneshot(get("/api/state", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["day"], 5);
    assert_eq!(json["budget"], 0);
    assert_eq!(json["implemented_changes"]["button_color"], "red");
    let rate = json["conversion_rate"].as_f64().unwrap();
    assert!((rate - 0.06).abs() < 1e-12, "rate {rate}");
}

#[tokio::test]
async fn insufficient_resources_render_error_pages() {
    let state = app_state();
    let cookie = start(&state).await;

    let response = app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=headline&variant=Limited+Offer&days=11",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Insufficient budget or time."), "{html}");

    app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=headline&variant=Limited+Offer&days=6",
        ))
        .await
        .unwrap();
    let response = app(&state)
        .oneshot(post_form("/implement_change", Some(&cookie), "test_id=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Insufficient budget to implement change."), "{html}");
}

#[tokio::test]
async fn oversized_duration_is_out_of_time() {
    let state = app_state();
    let cookie = start(&state).await;
    let response = app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=image&variant=image2&days=4294967296",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Insufficient budget or time."), "{html}");
}

#[tokio::test]
async fn cookieless_starts_stay_within_session_capacity() {
    let state = AppState::new(
        Rules::standard(),
        SessionStore::new(Duration::from_secs(600), 3),
        CookieSigner::new(b"router-test-secret").unwrap(),
    );
    for _ in 0..10 {
        start(&state).await;
    }
    assert!(state.sessions.len() <= 3, "{} sessions", state.sessions.len());
}

#[tokio::test]
async fn bad_input_and_unknown_tests() {
    let state = app_state();
    let cookie = start(&state).await;

    let response = app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=image&variant=image2&days=soon",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=footer&variant=image2&days=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for uri in ["/results/5", "/results/abc", "/nowhere"] {
        let response = app(&state).oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn api_state_without_session_is_unauthorized() {
    let state = app_state();
    let response = app(&state).oneshot(get("/api/state", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json: serde_json::Value =
        serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["code"], "SESSION_NOT_STARTED");
}

#[tokio::test]
async fn restart_keeps_cookie_and_resets_state() {
    let state = app_state();
    let cookie = start(&state).await;
    app(&state)
        .oneshot(post_form(
            "/run_test",
            Some(&cookie),
            "element=image&variant=image3&days=2",
        ))
        .await
        .unwrap();

    let response = app(&state)
        .oneshot(post_form("/start_game", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(state.sessions.len(), 1);

    let response = app(&state).oneshot(get("/api/state", Some(&cookie))).await.unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["day"], 0);
    assert_eq!(json["tests_run"], 0);
}
