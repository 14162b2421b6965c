//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이들을 하나로 묶는 `api_router`를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `home`: 홈 화면 (일시정지 세션, 최근 완성 퍼즐)
//! - `preferences`: 정렬 설정
//! - `puzzles`: 퍼즐 목록/검색/상세/생성/수정/삭제/되돌리기
//! - `sessions`: 세션 목록/시작/삭제/되돌리기
//! - `timer`: 세션 타이머 (일시정지, 재개, 완료, 포기)

pub mod health;
pub mod home;
pub mod preferences;
pub mod puzzles;
pub mod sessions;
pub mod timer;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// `/api/v1` 아래에 붙는 라우트 전체
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/home", get(home::get_home))
        .route(
            "/puzzles",
            get(puzzles::list_puzzles).post(puzzles::create_puzzle),
        )
        .route("/puzzles/restore", post(puzzles::restore_puzzle))
        .route(
            "/puzzles/{id}",
            get(puzzles::get_puzzle_details)
                .patch(puzzles::update_puzzle)
                .delete(puzzles::delete_puzzle),
        )
        .route(
            "/puzzles/{id}/sessions",
            get(sessions::list_puzzle_sessions).post(sessions::start_puzzle_session),
        )
        .route("/sessions/active", get(sessions::get_active_session))
        .route("/sessions/restore", post(sessions::restore_session))
        .route(
            "/sessions/{id}",
            delete(sessions::delete_session),
        )
        .route(
            "/sessions/{id}/timer",
            get(timer::get_timer)
                .post(timer::load_timer)
                .delete(timer::abandon_timer),
        )
        .route("/sessions/{id}/timer/pause", post(timer::pause_timer))
        .route("/sessions/{id}/timer/resume", post(timer::resume_timer))
        .route("/sessions/{id}/timer/finish", post(timer::finish_timer))
        .route(
            "/preferences/sort",
            get(preferences::get_sort_preference).put(preferences::update_sort_preference),
        )
        .with_state(state)
}

/// API 라우터에 CORS와 요청 로깅 미들웨어를 씌운 애플리케이션
///
/// 통합 테스트도 이 함수로 만든 `Router`를 서버 없이 직접 호출합니다.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
