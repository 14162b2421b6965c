//! # 퍼즐 데이터베이스 쿼리 모듈
//!
//! `puzzles` 테이블에 대한 조회/생성/수정/삭제 쿼리 함수들입니다.
//! 대부분의 함수는 `&SqlitePool`을 빌려 비동기로 실행되며, 실패 시 `AppError`를 반환합니다.
//! 통계 갱신 경로에서 쓰는 `get_puzzle`/`update_puzzle_stats`는 트랜잭션 안에서도
//! 호출할 수 있도록 `SqliteExecutor`를 받습니다.
//!
//! 존재하지 않는 id에 대한 작업은 에러가 아니라 `None`/`false`로 돌려줍니다.
//! 404로 바꿀지는 호출하는 쪽(라우트)이 결정합니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::stats::PuzzleStats;
use sqlx::{SqliteExecutor, SqlitePool};

/// 모든 퍼즐을 마지막 완료일 내림차순으로 조회합니다.
///
/// SQLite에서 NULL은 가장 작은 값이므로, 한 번도 완료하지 않은 퍼즐은 자연스럽게 맨 뒤로 갑니다.
pub async fn list_puzzles(pool: &SqlitePool) -> Result<Vec<Puzzle>, AppError> {
    let puzzles = sqlx::query_as::<_, Puzzle>(
        r#"
        SELECT id, name, piece_count, image_uri, brand, first_completed, last_completed,
               total_completions, best_time_ms, average_time_ms, total_time_ms
        FROM puzzles
        ORDER BY last_completed DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(puzzles)
}

/// ID로 퍼즐 하나를 조회합니다.
///
/// - `Ok(Some(Puzzle))`: 퍼즐을 찾은 경우
/// - `Ok(None)`: 해당 ID의 퍼즐이 없는 경우
pub async fn get_puzzle<'e, E>(executor: E, id: i64) -> Result<Option<Puzzle>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let puzzle = sqlx::query_as::<_, Puzzle>(
        r#"
        SELECT id, name, piece_count, image_uri, brand, first_completed, last_completed,
               total_completions, best_time_ms, average_time_ms, total_time_ms
        FROM puzzles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(puzzle)
}

/// 가장 최근에 완료된 퍼즐을 조회합니다. 완료된 퍼즐이 하나도 없으면 `None`.
pub async fn get_last_completed_puzzle(pool: &SqlitePool) -> Result<Option<Puzzle>, AppError> {
    let puzzle = sqlx::query_as::<_, Puzzle>(
        r#"
        SELECT id, name, piece_count, image_uri, brand, first_completed, last_completed,
               total_completions, best_time_ms, average_time_ms, total_time_ms
        FROM puzzles
        WHERE last_completed IS NOT NULL
        ORDER BY last_completed DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(puzzle)
}

/// 이름에 검색어가 포함된 퍼즐을 찾습니다 (대소문자 무시).
///
/// SQLite의 `LIKE`는 ASCII 범위에서 대소문자를 구분하지 않습니다.
/// 사용자가 입력한 `%`, `_`는 와일드카드가 아니라 글자 그대로 매칭되도록 이스케이프합니다.
pub async fn search_puzzles(pool: &SqlitePool, query: &str) -> Result<Vec<Puzzle>, AppError> {
    let pattern = format!("%{}%", escape_like(query.trim()));

    let puzzles = sqlx::query_as::<_, Puzzle>(
        r#"
        SELECT id, name, piece_count, image_uri, brand, first_completed, last_completed,
               total_completions, best_time_ms, average_time_ms, total_time_ms
        FROM puzzles
        WHERE name LIKE ? ESCAPE '\'
        ORDER BY last_completed DESC, id DESC
        "#,
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(puzzles)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 검증된 입력으로 새 퍼즐을 만들고, 생성된 행을 반환합니다.
/// 통계 컬럼은 DEFAULT(0/NULL)로 시작합니다.
pub async fn create_puzzle(pool: &SqlitePool, draft: &PuzzleDraft) -> Result<Puzzle, AppError> {
    let id = sqlx::query(
        r#"
        INSERT INTO puzzles (name, piece_count, image_uri, brand)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&draft.name)
    .bind(draft.piece_count)
    .bind(&draft.image_uri)
    .bind(&draft.brand)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_puzzle(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created puzzle".to_string()))
}

/// 퍼즐의 이름/조각 수/이미지/브랜드를 수정합니다. 통계 컬럼은 건드리지 않습니다.
pub async fn update_puzzle(
    pool: &SqlitePool,
    id: i64,
    draft: &PuzzleDraft,
) -> Result<Option<Puzzle>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE puzzles
        SET name = ?, piece_count = ?, image_uri = ?, brand = ?
        WHERE id = ?
        "#,
    )
    .bind(&draft.name)
    .bind(draft.piece_count)
    .bind(&draft.image_uri)
    .bind(&draft.brand)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_puzzle(pool, id).await
}

/// 통계 컬럼 전체를 주어진 값으로 덮어씁니다.
///
/// 반환값은 갱신된 행이 있었는지 여부입니다.
pub async fn update_puzzle_stats<'e, E>(
    executor: E,
    id: i64,
    stats: &PuzzleStats,
) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE puzzles
        SET first_completed = ?, last_completed = ?, total_completions = ?,
            best_time_ms = ?, average_time_ms = ?, total_time_ms = ?
        WHERE id = ?
        "#,
    )
    .bind(stats.first_completed)
    .bind(stats.last_completed)
    .bind(stats.total_completions)
    .bind(stats.best_time_ms)
    .bind(stats.average_time_ms)
    .bind(stats.total_time_ms)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 퍼즐을 삭제합니다. 외래키 `ON DELETE CASCADE`로 세션도 모두 삭제됩니다.
pub async fn delete_puzzle(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM puzzles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 삭제했던 퍼즐을 원래 id 그대로 다시 넣습니다 (되돌리기).
///
/// 같은 id의 퍼즐이 이미 있으면 아무것도 하지 않고 `None`을 반환합니다.
pub async fn restore_puzzle(pool: &SqlitePool, puzzle: &Puzzle) -> Result<Option<Puzzle>, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO puzzles (id, name, piece_count, image_uri, brand, first_completed,
                             last_completed, total_completions, best_time_ms,
                             average_time_ms, total_time_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(puzzle.id)
    .bind(&puzzle.name)
    .bind(puzzle.piece_count)
    .bind(&puzzle.image_uri)
    .bind(&puzzle.brand)
    .bind(puzzle.first_completed)
    .bind(puzzle.last_completed)
    .bind(puzzle.total_completions)
    .bind(puzzle.best_time_ms)
    .bind(puzzle.average_time_ms)
    .bind(puzzle.total_time_ms)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_puzzle(pool, puzzle.id).await
}
