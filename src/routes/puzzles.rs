//! # 퍼즐 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/puzzles?q=&sort= | `list_puzzles` | 퍼즐 목록 (검색, 정렬) |
//! | POST | /api/v1/puzzles | `create_puzzle` | 새 퍼즐 (선택적으로 바로 세션 시작) |
//! | POST | /api/v1/puzzles/restore | `restore_puzzle` | 삭제한 퍼즐 되돌리기 |
//! | GET | /api/v1/puzzles/{id} | `get_puzzle_details` | 퍼즐 + 세션 기록 |
//! | PATCH | /api/v1/puzzles/{id} | `update_puzzle` | 이름/조각 수/이미지/브랜드 수정 |
//! | DELETE | /api/v1/puzzles/{id} | `delete_puzzle` | 퍼즐과 세션 모두 삭제 |

use crate::{db, error::AppError, models::*, state::AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ListPuzzlesQuery {
    /// 이름 검색어 (부분 일치, 대소문자 무시)
    pub q: Option<String>,
    /// `NAME` 또는 `DATE_COMPLETED`. 없으면 저장된 사용자 설정을 씁니다.
    pub sort: Option<String>,
}

/// `GET /puzzles` → `{ "sort": "...", "puzzles": [...] }`
pub async fn list_puzzles(
    State(state): State<AppState>,
    Query(query): Query<ListPuzzlesQuery>,
) -> Result<Json<Value>, AppError> {
    // 잘못된 정렬 값은 DB 조회 전에 400으로 거부합니다.
    let sort = match query.sort.as_deref() {
        Some(raw) => raw.parse::<SortOrder>()?,
        None => db::get_sort_order(&state.pool).await?,
    };

    let mut puzzles = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => db::search_puzzles(&state.pool, q).await?,
        _ => db::list_puzzles(&state.pool).await?,
    };

    // DB는 이미 마지막 완료일 내림차순으로 돌려주므로 이름순일 때만 다시 정렬합니다.
    if sort == SortOrder::Name {
        puzzles.sort_by_cached_key(|p| p.name.to_lowercase());
    }

    Ok(Json(json!({ "sort": sort, "puzzles": puzzles })))
}

/// `POST /puzzles`: 새 퍼즐을 만듭니다.
///
/// `start_timer: true`면 곧바로 세션을 시작하고 `session`에 담아 돌려줍니다.
/// 이때 다른 세션이 진행 중이면 퍼즐을 만들기 전에 409로 거부합니다.
pub async fn create_puzzle(
    State(state): State<AppState>,
    Json(req): Json<CreatePuzzleRequest>,
) -> Result<Json<Value>, AppError> {
    let draft = req.validate()?;

    if req.start_timer {
        if let Some(running) = db::get_running_session(&state.pool).await? {
            return Err(AppError::Conflict(format!(
                "Session {} is already running",
                running.id
            )));
        }
    }

    let puzzle = db::create_puzzle(&state.pool, &draft).await?;
    tracing::info!(puzzle_id = puzzle.id, name = %puzzle.name, "Puzzle created");

    let session = if req.start_timer {
        state.timers.start(puzzle.id).await?
    } else {
        None
    };

    Ok(Json(json!({ "puzzle": puzzle, "session": session })))
}

/// `GET /puzzles/{id}`: 상세 화면: 퍼즐과 세션 목록(최신순)
pub async fn get_puzzle_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let puzzle = db::get_puzzle(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let sessions = db::list_sessions_for_puzzle(&state.pool, id).await?;

    Ok(Json(json!({ "puzzle": puzzle, "sessions": sessions })))
}

/// `PATCH /puzzles/{id}`: 퍼즐 정보를 수정합니다. 검증에 실패하면 아무것도 바뀌지 않습니다.
pub async fn update_puzzle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePuzzleRequest>,
) -> Result<Json<Puzzle>, AppError> {
    let current = db::get_puzzle(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let draft = req.apply_to(&current)?;

    let puzzle = db::update_puzzle(&state.pool, id, &draft)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(puzzle))
}

/// `DELETE /puzzles/{id}`: 퍼즐을 삭제하고, 되돌리기에 쓸 수 있도록 삭제된 행을 반환합니다.
///
/// 세션은 외래키 CASCADE로 함께 삭제되므로, 로드되어 있던 타이머도 버립니다.
pub async fn delete_puzzle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Puzzle>, AppError> {
    let puzzle = db::get_puzzle(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let sessions = db::list_sessions_for_puzzle(&state.pool, id).await?;

    if !db::delete_puzzle(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    for session in &sessions {
        state.timers.forget(session.id).await;
    }

    tracing::info!(puzzle_id = id, sessions = sessions.len(), "Puzzle deleted");
    Ok(Json(puzzle))
}

/// `POST /puzzles/restore`: 삭제 응답으로 받았던 퍼즐을 그대로 다시 넣습니다.
///
/// 이름/조각 수가 잘못되었거나 통계 값끼리 모순되면 400.
pub async fn restore_puzzle(
    State(state): State<AppState>,
    Json(puzzle): Json<Puzzle>,
) -> Result<Json<Puzzle>, AppError> {
    puzzle.validate_restore()?;

    let restored = db::restore_puzzle(&state.pool, &puzzle)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Puzzle {} already exists", puzzle.id)))?;

    tracing::info!(puzzle_id = restored.id, "Puzzle restored");
    Ok(Json(restored))
}
