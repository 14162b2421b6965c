//! # 통합 테스트 공용 도우미
//!
//! 서버를 띄우지 않고 `routes::app`으로 만든 `Router`에 요청을 직접 보냅니다.
//! 시계는 `TestClock`으로 고정되어 있어 경과 시간을 정확히 검증할 수 있습니다.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use puzzle_timer::routes;
use puzzle_timer::services::clock::Clock;
use puzzle_timer::state::AppState;

pub const START_MS: i64 = 1_700_000_000_000;

/// 테스트가 `advance`를 호출할 때만 움직이는 시계
#[derive(Debug)]
pub struct TestClock(AtomicI64);

impl TestClock {
    pub fn new(start: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(start)))
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// 주어진 풀과 시계로 전체 애플리케이션 라우터를 만듭니다.
pub fn build_test_app(pool: SqlitePool, clock: Arc<TestClock>) -> Router {
    let state = AppState::new(pool, clock, Duration::from_millis(5));
    routes::app(state)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 응답 상태 코드를 확인하고 JSON 본문을 돌려줍니다.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// API로 퍼즐을 만들고 id를 돌려줍니다.
pub async fn create_puzzle(app: &Router, name: &str, pieces: i64) -> i64 {
    let response = post_json(
        app,
        "/api/v1/puzzles",
        serde_json::json!({ "name": name, "piece_count": pieces }),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    json["puzzle"]["id"].as_i64().unwrap()
}

/// 세션을 시작하고 시계를 `elapsed` ms 진행시킨 뒤 완료합니다. 세션 id를 돌려줍니다.
///
/// 세션 시작과 동시에 타이머가 등록되므로 중간의 로드 요청은 같은 타이머를 돌려줄 뿐입니다.
pub async fn complete_run(app: &Router, clock: &TestClock, puzzle_id: i64, elapsed: i64) -> i64 {
    let response = post(app, &format!("/api/v1/puzzles/{puzzle_id}/sessions")).await;
    let session = expect_json(response, StatusCode::OK).await;
    let session_id = session["id"].as_i64().unwrap();

    post(app, &format!("/api/v1/sessions/{session_id}/timer")).await;
    clock.advance(elapsed);
    let response = post(app, &format!("/api/v1/sessions/{session_id}/timer/finish")).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_id
}
