//! # 타이머 라우트 핸들러
//!
//! 세션 타이머 상태 기계(`services::timer`)를 HTTP로 노출합니다.
//!
//! | 메서드 | 경로 | 핸들러 |
//! |--------|------|--------|
//! | POST | /api/v1/sessions/{id}/timer | `load_timer` |
//! | GET | /api/v1/sessions/{id}/timer | `get_timer` |
//! | POST | /api/v1/sessions/{id}/timer/pause | `pause_timer` |
//! | POST | /api/v1/sessions/{id}/timer/resume | `resume_timer` |
//! | POST | /api/v1/sessions/{id}/timer/finish | `finish_timer` |
//! | DELETE | /api/v1/sessions/{id}/timer | `abandon_timer` |
//!
//! 허용되지 않은 전이(예: 일시정지 상태에서 pause)는 에러 없이 현재 상태를 그대로 돌려줍니다.
//! 세션이 없을 때만 404입니다.

use crate::{
    error::AppError,
    services::timer::{FinishOutcome, TimerSnapshot},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// 타이머 화면에 들어갈 때 호출합니다. 이미 돌고 있는 타이머가 있으면 그 상태를 그대로 돌려줍니다.
pub async fn load_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>, AppError> {
    let snapshot = state.timers.load(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(snapshot))
}

/// 현재 경과 시간과 상태. 폴링용입니다.
pub async fn get_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>, AppError> {
    let snapshot = state.timers.snapshot(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(snapshot))
}

pub async fn pause_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>, AppError> {
    let snapshot = state.timers.pause(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(snapshot))
}

/// 다른 세션이 진행 중이면 409 Conflict
pub async fn resume_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>, AppError> {
    let snapshot = state.timers.resume(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(snapshot))
}

/// 세션을 완료합니다. 응답의 `puzzle_id`로 상세 화면으로 이동할 수 있습니다.
pub async fn finish_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FinishOutcome>, AppError> {
    let outcome = state.timers.finish(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(outcome))
}

/// 저장하지 않고 세션을 버립니다. 성공 시 204 No Content.
pub async fn abandon_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.timers.abandon(id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
