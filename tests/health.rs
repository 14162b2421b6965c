//! # 헬스체크와 정렬 설정 엔드포인트 테스트

mod common;

use axum::http::StatusCode;
use common::{build_test_app, expect_json, get, put_json, TestClock, START_MS};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test]
async fn test_health_reports_database_ok(pool: SqlitePool) {
    let app = build_test_app(pool, TestClock::new(START_MS));
    let json = expect_json(get(&app, "/api/v1/health").await, StatusCode::OK).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "ok");
}

#[sqlx::test]
async fn test_sort_preference_defaults_and_persists(pool: SqlitePool) {
    let app = build_test_app(pool, TestClock::new(START_MS));

    let json = expect_json(get(&app, "/api/v1/preferences/sort").await, StatusCode::OK).await;
    assert_eq!(json["sort"], "NAME");

    let json = expect_json(
        put_json(&app, "/api/v1/preferences/sort", json!({ "sort": "DATE_COMPLETED" })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["sort"], "DATE_COMPLETED");

    let json = expect_json(get(&app, "/api/v1/preferences/sort").await, StatusCode::OK).await;
    assert_eq!(json["sort"], "DATE_COMPLETED");

    let json = expect_json(
        put_json(&app, "/api/v1/preferences/sort", json!({ "sort": "RANDOM" })).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"]["code"], "validation_error");
}
