//! # 세션 타이머 엔드포인트 통합 테스트
//!
//! 앱은 `TestClock` 위에서 돌기 때문에 경과 시간 값이 정확히 맞아떨어집니다.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, complete_run, create_puzzle, delete, expect_json, get, post, post_json,
    TestClock, START_MS,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

async fn start(app: &axum::Router, puzzle_id: i64) -> i64 {
    let session = expect_json(
        post(app, &format!("/api/v1/puzzles/{puzzle_id}/sessions")).await,
        StatusCode::OK,
    )
    .await;
    session["id"].as_i64().unwrap()
}

async fn timer_call(app: &axum::Router, session_id: i64, action: &str) -> Value {
    let uri = if action.is_empty() {
        format!("/api/v1/sessions/{session_id}/timer")
    } else {
        format!("/api/v1/sessions/{session_id}/timer/{action}")
    };
    expect_json(post(app, &uri).await, StatusCode::OK).await
}

#[sqlx::test]
async fn test_pause_resume_finish_persists_active_time_only(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Lighthouse", 1000).await;
    let session_id = start(&app, puzzle_id).await;

    let loaded = timer_call(&app, session_id, "").await;
    assert_eq!(loaded["status"], "running");
    assert_eq!(loaded["puzzle_name"], "Lighthouse");
    assert_eq!(loaded["piece_count"], 1000);

    clock.advance(12_000);
    let paused = timer_call(&app, session_id, "pause").await;
    assert_eq!(paused["status"], "paused");
    assert_eq!(paused["elapsed_time_ms"], 12_000);

    // 일시정지 동안 흐른 시간은 포함되지 않습니다.
    clock.advance(600_000);
    let resumed = timer_call(&app, session_id, "resume").await;
    assert_eq!(resumed["status"], "running");
    assert_eq!(resumed["elapsed_time_ms"], 12_000);

    clock.advance(33_000);
    let polled = expect_json(
        get(&app, &format!("/api/v1/sessions/{session_id}/timer")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(polled["elapsed_time_ms"], 45_000);

    let finished = timer_call(&app, session_id, "finish").await;
    assert_eq!(finished["puzzle_id"].as_i64(), Some(puzzle_id));
    assert_eq!(finished["timer"]["status"], "finished");
    assert_eq!(finished["timer"]["elapsed_time_ms"], 45_000);

    let details = expect_json(
        get(&app, &format!("/api/v1/puzzles/{puzzle_id}")).await,
        StatusCode::OK,
    )
    .await;
    let session = &details["sessions"][0];
    assert_eq!(session["elapsed_time_ms"], 45_000);
    assert_eq!(session["completed"], true);
    assert!(session["paused_at"].is_null());
    assert_eq!(session["end_time"], START_MS + 12_000 + 600_000 + 33_000);

    let puzzle = &details["puzzle"];
    assert_eq!(puzzle["total_completions"], 1);
    assert_eq!(puzzle["best_time_ms"], 45_000);
    assert_eq!(puzzle["average_time_ms"], 45_000);
    assert_eq!(puzzle["first_completed"], puzzle["last_completed"]);
}

#[sqlx::test]
async fn test_timer_runs_from_session_start_and_reload_keeps_time(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Clock Tower", 1000).await;
    let session_id = start(&app, puzzle_id).await;

    // 타이머 요청 없이도 세션 시작 시각부터 시간이 흐릅니다.
    clock.advance(60_000);
    let polled = expect_json(
        get(&app, &format!("/api/v1/sessions/{session_id}/timer")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(polled["status"], "running");
    assert_eq!(polled["elapsed_time_ms"], 60_000);

    // 실행 중인 타이머를 다시 로드해도 흐른 시간이 사라지지 않습니다.
    clock.advance(30_000);
    let reloaded = timer_call(&app, session_id, "").await;
    assert_eq!(reloaded["status"], "running");
    assert_eq!(reloaded["elapsed_time_ms"], 90_000);

    clock.advance(10_000);
    let finished = timer_call(&app, session_id, "finish").await;
    assert_eq!(finished["timer"]["elapsed_time_ms"], 100_000);
}

#[sqlx::test]
async fn test_create_puzzle_with_start_timer_starts_counting(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());

    let created = expect_json(
        post_json(
            &app,
            "/api/v1/puzzles",
            json!({ "name": "Quick Start", "piece_count": 300, "start_timer": true }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let session_id = created["session"]["id"].as_i64().unwrap();

    clock.advance(45_000);
    let loaded = timer_call(&app, session_id, "").await;
    assert_eq!(loaded["status"], "running");
    assert_eq!(loaded["puzzle_name"], "Quick Start");
    assert_eq!(loaded["elapsed_time_ms"], 45_000);
}

#[sqlx::test]
async fn test_finished_session_timer_can_be_viewed_repeatedly(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Viewed", 100).await;
    let session_id = complete_run(&app, &clock, puzzle_id, 12_000).await;

    for _ in 0..3 {
        clock.advance(5_000);
        let viewed = expect_json(
            get(&app, &format!("/api/v1/sessions/{session_id}/timer")).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(viewed["status"], "finished");
        assert_eq!(viewed["elapsed_time_ms"], 12_000);
    }

    // 완료된 세션에 대한 전이 요청은 통계를 바꾸지 않습니다.
    let again = timer_call(&app, session_id, "finish").await;
    assert!(again["puzzle_id"].is_null());
    let details = expect_json(
        get(&app, &format!("/api/v1/puzzles/{puzzle_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(details["puzzle"]["total_completions"], 1);
}

#[sqlx::test]
async fn test_finish_twice_counts_once(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Twice", 200).await;
    let session_id = start(&app, puzzle_id).await;

    timer_call(&app, session_id, "").await;
    clock.advance(8_000);
    let first = timer_call(&app, session_id, "finish").await;
    assert_eq!(first["puzzle_id"].as_i64(), Some(puzzle_id));

    clock.advance(8_000);
    let second = timer_call(&app, session_id, "finish").await;
    assert!(second["puzzle_id"].is_null());
    assert_eq!(second["timer"]["status"], "finished");
    assert_eq!(second["timer"]["elapsed_time_ms"], 8_000);

    let details = expect_json(
        get(&app, &format!("/api/v1/puzzles/{puzzle_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(details["puzzle"]["total_completions"], 1);
}

#[sqlx::test]
async fn test_invalid_transitions_are_no_ops(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Guards", 200).await;
    let session_id = start(&app, puzzle_id).await;
    timer_call(&app, session_id, "").await;

    clock.advance(1_000);
    let resumed = timer_call(&app, session_id, "resume").await;
    assert_eq!(resumed["status"], "running");
    assert_eq!(resumed["elapsed_time_ms"], 1_000);

    timer_call(&app, session_id, "pause").await;
    clock.advance(1_000);
    let paused_again = timer_call(&app, session_id, "pause").await;
    assert_eq!(paused_again["status"], "paused");
    assert_eq!(paused_again["elapsed_time_ms"], 1_000);
}

#[sqlx::test]
async fn test_finish_from_paused_keeps_paused_elapsed(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Paused Finish", 200).await;
    let session_id = start(&app, puzzle_id).await;
    timer_call(&app, session_id, "").await;

    clock.advance(20_000);
    timer_call(&app, session_id, "pause").await;
    clock.advance(100_000);
    let finished = timer_call(&app, session_id, "finish").await;
    assert_eq!(finished["timer"]["elapsed_time_ms"], 20_000);
}

#[sqlx::test]
async fn test_resume_conflicts_with_other_running_session(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let a = create_puzzle(&app, "A", 100).await;
    let b = create_puzzle(&app, "B", 100).await;

    let paused = start(&app, a).await;
    timer_call(&app, paused, "").await;
    clock.advance(2_000);
    timer_call(&app, paused, "pause").await;

    // 일시정지된 세션은 새 세션 시작을 막지 않습니다.
    let running = start(&app, b).await;

    let response = post(&app, &format!("/api/v1/sessions/{paused}/timer/resume")).await;
    let json = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(json["error"]["code"], "conflict");

    let still_paused = expect_json(
        get(&app, &format!("/api/v1/sessions/{paused}/timer")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(still_paused["status"], "paused");

    let active = expect_json(get(&app, "/api/v1/sessions/active").await, StatusCode::OK).await;
    assert_eq!(active["session"]["id"].as_i64(), Some(running));
}

#[sqlx::test]
async fn test_reload_of_paused_session_restores_elapsed(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Reload", 100).await;
    let session_id = start(&app, puzzle_id).await;
    timer_call(&app, session_id, "").await;
    clock.advance(7_500);
    timer_call(&app, session_id, "pause").await;

    clock.advance(3_600_000);
    let reloaded = timer_call(&app, session_id, "").await;
    assert_eq!(reloaded["status"], "paused");
    assert_eq!(reloaded["elapsed_time_ms"], 7_500);
}

#[sqlx::test]
async fn test_abandon_deletes_session_without_touching_stats(pool: SqlitePool) {
    let clock = TestClock::new(START_MS);
    let app = build_test_app(pool, clock.clone());
    let puzzle_id = create_puzzle(&app, "Abandoned", 100).await;
    let session_id = start(&app, puzzle_id).await;
    timer_call(&app, session_id, "").await;
    clock.advance(4_000);

    let response = delete(&app, &format!("/api/v1/sessions/{session_id}/timer")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let details = expect_json(
        get(&app, &format!("/api/v1/puzzles/{puzzle_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert!(details["sessions"].as_array().unwrap().is_empty());
    assert_eq!(details["puzzle"]["total_completions"], 0);

    let response = delete(&app, &format!("/api/v1/sessions/{session_id}/timer")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 진행 중인 세션이 없으므로 새 세션을 시작할 수 있습니다.
    start(&app, puzzle_id).await;
}

#[sqlx::test]
async fn test_timer_for_missing_session_is_not_found(pool: SqlitePool) {
    let app = build_test_app(pool, TestClock::new(START_MS));
    for action in ["pause", "resume", "finish"] {
        let response = post(&app, &format!("/api/v1/sessions/9999/timer/{action}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{action}");
    }
    assert_eq!(
        get(&app, "/api/v1/sessions/9999/timer").await.status(),
        StatusCode::NOT_FOUND
    );
}
