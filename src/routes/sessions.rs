//! # 세션 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/puzzles/{id}/sessions | `list_puzzle_sessions` | 퍼즐의 세션 목록 |
//! | POST | /api/v1/puzzles/{id}/sessions | `start_puzzle_session` | 새 세션 시작 |
//! | GET | /api/v1/sessions/active | `get_active_session` | 끝나지 않은 세션 |
//! | DELETE | /api/v1/sessions/{id} | `delete_session` | 세션 삭제 + 통계 재계산 |
//! | POST | /api/v1/sessions/restore | `restore_session` | 삭제한 세션 되돌리기 + 통계 재계산 |

use crate::{db, error::AppError, models::*, services::history, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// `GET /puzzles/{id}/sessions` → `{ "sessions": [...] }`
pub async fn list_puzzle_sessions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    // 존재하지 않는 퍼즐이면 빈 배열 대신 404
    let _ = db::get_puzzle(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let sessions = db::list_sessions_for_puzzle(&state.pool, id).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// `POST /puzzles/{id}/sessions`: 새 세션을 시작하고 타이머를 바로 돌립니다.
///
/// 다른 세션이 진행 중이면 409 Conflict.
pub async fn start_puzzle_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PuzzleSession>, AppError> {
    let session = state
        .timers
        .start(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session))
}

/// `GET /sessions/active` → `{ "session": {...} | null }`
///
/// 진행 중인 세션이 없다는 것도 정상 결과이므로 404가 아니라 null을 돌려줍니다.
pub async fn get_active_session(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let session = db::get_active_session(&state.pool).await?;
    Ok(Json(json!({ "session": session })))
}

/// `DELETE /sessions/{id}`: 세션을 삭제하고 퍼즐 통계를 다시 계산합니다.
///
/// 삭제된 세션을 그대로 돌려주므로 클라이언트가 되돌리기에 쓸 수 있습니다.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PuzzleSession>, AppError> {
    let session = history::delete_session(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    state.timers.forget(id).await;
    Ok(Json(session))
}

/// `POST /sessions/restore`: 삭제 응답으로 받았던 세션을 다시 넣고 통계를 다시 계산합니다.
///
/// 퍼즐이 이미 없어졌거나 같은 id의 세션이 남아 있으면 404.
/// 진행 중이던 세션을 되살리는데 다른 세션이 진행 중이면 409.
pub async fn restore_session(
    State(state): State<AppState>,
    Json(session): Json<PuzzleSession>,
) -> Result<Json<PuzzleSession>, AppError> {
    let restored = history::restore_session(&state.pool, &session)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(restored))
}
