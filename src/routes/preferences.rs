//! # 사용자 설정 핸들러
//!
//! | 메서드 | 경로 | 핸들러 |
//! |--------|------|--------|
//! | GET | /api/v1/preferences/sort | `get_sort_preference` |
//! | PUT | /api/v1/preferences/sort | `update_sort_preference` |

use crate::{db, error::AppError, models::{SortOrder, SortPreference}, state::AppState};
use axum::{extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateSortRequest {
    pub sort: String,
}

/// 저장된 퍼즐 목록 정렬 방식. 저장된 값이 없으면 `NAME`.
pub async fn get_sort_preference(
    State(state): State<AppState>,
) -> Result<Json<SortPreference>, AppError> {
    let sort = db::get_sort_order(&state.pool).await?;
    Ok(Json(SortPreference { sort }))
}

/// `{ "sort": "DATE_COMPLETED" }` 형태로 받습니다. 알 수 없는 값은 400.
pub async fn update_sort_preference(
    State(state): State<AppState>,
    Json(req): Json<UpdateSortRequest>,
) -> Result<Json<SortPreference>, AppError> {
    let sort: SortOrder = req.sort.parse()?;
    db::save_sort_order(&state.pool, sort).await?;
    tracing::debug!(sort = sort.as_str(), "Sort preference saved");
    Ok(Json(SortPreference { sort }))
}
