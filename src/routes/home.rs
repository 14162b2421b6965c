//! # 홈 화면 핸들러
//!
//! - `GET /api/v1/home` → `{ "paused": {session, puzzle} | null, "last_completed": {...} | null }`
//!
//! 앱을 열었을 때 이어서 할 수 있는 일시정지 세션과, 가장 최근에 완성한 퍼즐을 보여줍니다.

use crate::{db, error::AppError, models::PausedSessionInfo, state::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn get_home(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let paused = match db::get_most_recent_paused_session(&state.pool).await? {
        Some(session) => db::get_puzzle(&state.pool, session.puzzle_id)
            .await?
            .map(|puzzle| PausedSessionInfo { session, puzzle }),
        None => None,
    };
    let last_completed = db::get_last_completed_puzzle(&state.pool).await?;

    Ok(Json(json!({
        "paused": paused,
        "last_completed": last_completed,
    })))
}
