//! Router surface test: the health endpoint answers without touching the
//! database (the pool is lazy and never connects).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use bk_server::api::{create_router, AppState};
use bk_server::config::Config;

fn test_state() -> AppState {
    let config = Config::default_for_test();
    let pool = sqlx::PgPool::connect_lazy(&config.database_url).expect("lazy pool");
    AppState::new(pool, config)
}

#[tokio::test]
async fn test_health_check_reports_ok() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_rejects_missing_token() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::get("/api/me/navigation")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_garbage_token() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::get("/api/me/roles")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
