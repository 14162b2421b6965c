//! # 퍼즐 세션 데이터베이스 쿼리 모듈
//!
//! 세션의 생성, 일시정지/재개, 완료, 삭제/복원, 조회를 담당하는 SQL 쿼리 함수들입니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! create_session() → 진행 중 ⇄ pause_session()/resume_session() → complete_session() → 완료
//!                        └──────────── delete_session() (포기) ────────────┘
//! ```
//!
//! "진행 중인 세션은 전체에서 최대 하나" 규칙은 생성과 재개 시점에
//! `NOT EXISTS` 조건을 포함한 단일 문장으로 검사합니다.
//! SQLite가 쓰기를 직렬화하므로 검사와 쓰기 사이에 다른 쓰기가 끼어들 수 없습니다.
//!
//! 문장 하나로 끝나는 함수는 `SqliteExecutor`를 받으므로, 풀(`&SqlitePool`)로도
//! 트랜잭션(`&mut *tx`) 안에서도 호출할 수 있습니다.

use crate::error::AppError;
use crate::models::PuzzleSession;
use sqlx::{SqliteExecutor, SqlitePool};

/// ID로 세션 하나를 조회합니다.
pub async fn get_session<'e, E>(executor: E, id: i64) -> Result<Option<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        SELECT id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// 특정 퍼즐의 모든 세션을 최신순(`start_time DESC`)으로 조회합니다.
pub async fn list_sessions_for_puzzle<'e, E>(
    executor: E,
    puzzle_id: i64,
) -> Result<Vec<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sessions = sqlx::query_as::<_, PuzzleSession>(
        r#"
        SELECT id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        FROM sessions
        WHERE puzzle_id = ?
        ORDER BY start_time DESC, id DESC
        "#,
    )
    .bind(puzzle_id)
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

/// 아직 끝나지 않은(`end_time IS NULL`) 세션 하나를 조회합니다.
///
/// 진행 중인 세션이 있으면 그것을, 없으면 가장 최근에 시작한 일시정지 세션을 돌려줍니다.
pub async fn get_active_session(pool: &SqlitePool) -> Result<Option<PuzzleSession>, AppError> {
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        SELECT id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        FROM sessions
        WHERE end_time IS NULL
        ORDER BY paused_at IS NOT NULL, start_time DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 진행 중(running) 세션을 조회합니다. 규칙상 최대 하나입니다.
pub async fn get_running_session<'e, E>(executor: E) -> Result<Option<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        SELECT id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        FROM sessions
        WHERE end_time IS NULL AND paused_at IS NULL
        LIMIT 1
        "#,
    )
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// 가장 최근에 일시정지된 세션을 조회합니다. 홈 화면의 "이어서 하기"에 사용됩니다.
pub async fn get_most_recent_paused_session(
    pool: &SqlitePool,
) -> Result<Option<PuzzleSession>, AppError> {
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        SELECT id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        FROM sessions
        WHERE end_time IS NULL AND paused_at IS NOT NULL
        ORDER BY paused_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 새 세션을 진행 중 상태로 시작합니다.
///
/// ## 반환값
/// - `Ok(Some(session))`: 생성 성공
/// - `Ok(None)`: 퍼즐이 존재하지 않음
/// - `Err(AppError::Conflict)`: 다른 세션이 이미 진행 중
pub async fn create_session(
    pool: &SqlitePool,
    puzzle_id: i64,
    start_time: i64,
) -> Result<Option<PuzzleSession>, AppError> {
    // INSERT ... SELECT ... WHERE: 조건이 거짓이면 0행이 삽입됩니다.
    let result = sqlx::query(
        r#"
        INSERT INTO sessions (puzzle_id, start_time)
        SELECT ?, ?
        WHERE EXISTS (SELECT 1 FROM puzzles WHERE id = ?)
          AND NOT EXISTS (
              SELECT 1 FROM sessions WHERE end_time IS NULL AND paused_at IS NULL
          )
        "#,
    )
    .bind(puzzle_id)
    .bind(start_time)
    .bind(puzzle_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        if crate::db::get_puzzle(pool, puzzle_id).await?.is_none() {
            return Ok(None);
        }
        return Err(already_running(pool).await?);
    }

    get_session(pool, result.last_insert_rowid()).await
}

async fn already_running(pool: &SqlitePool) -> Result<AppError, AppError> {
    let running = get_running_session(pool).await?;
    Ok(AppError::Conflict(match running {
        Some(s) => format!("Session {} is already running", s.id),
        None => "Another session is already running".to_string(),
    }))
}

/// 진행 중인 세션을 일시정지 상태로 기록합니다.
///
/// 누적 경과 시간(`elapsed_time_ms`)을 함께 저장하여, 이후 비정상 종료가 나더라도
/// 이 시점까지의 시간은 보존됩니다.
pub async fn pause_session(
    pool: &SqlitePool,
    id: i64,
    elapsed_time_ms: i64,
    paused_at: i64,
) -> Result<Option<PuzzleSession>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET elapsed_time_ms = ?, paused_at = ?
        WHERE id = ? AND end_time IS NULL
        "#,
    )
    .bind(elapsed_time_ms)
    .bind(paused_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_session(pool, id).await
}

/// 일시정지된 세션의 `paused_at`을 지워 다시 진행 중으로 만듭니다. 경과 시간은 그대로입니다.
///
/// ## 반환값
/// - `Ok(Some(session))`: 재개 성공, 또는 이미 일시정지 상태가 아니어서 바꿀 것이 없음
/// - `Ok(None)`: 세션이 존재하지 않음
/// - `Err(AppError::Conflict)`: 다른 세션이 진행 중
pub async fn resume_session(pool: &SqlitePool, id: i64) -> Result<Option<PuzzleSession>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET paused_at = NULL
        WHERE id = ? AND end_time IS NULL AND paused_at IS NOT NULL
          AND NOT EXISTS (
              SELECT 1 FROM sessions
              WHERE id != ? AND end_time IS NULL AND paused_at IS NULL
          )
        "#,
    )
    .bind(id)
    .bind(id)
    .execute(pool)
    .await?;

    let session = get_session(pool, id).await?;
    if result.rows_affected() > 0 {
        return Ok(session);
    }

    match session {
        Some(s) if s.end_time.is_none() && s.paused_at.is_some() => {
            Err(already_running(pool).await?)
        }
        other => Ok(other),
    }
}

/// 세션을 완료 처리합니다.
///
/// `end_time`, 최종 경과 시간, `completed = 1`을 기록하고 `paused_at`은 지웁니다.
/// 이미 끝난 세션이면 아무것도 바꾸지 않고 `None`을 반환합니다.
pub async fn complete_session<'e, E>(
    executor: E,
    id: i64,
    end_time: i64,
    elapsed_time_ms: i64,
) -> Result<Option<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        UPDATE sessions
        SET end_time = ?, elapsed_time_ms = ?, completed = 1, paused_at = NULL
        WHERE id = ? AND end_time IS NULL
        RETURNING id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        "#,
    )
    .bind(end_time)
    .bind(elapsed_time_ms)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// 세션 행을 삭제하고, 삭제된 행을 그대로 돌려줍니다. 없으면 `None`.
pub async fn delete_session<'e, E>(executor: E, id: i64) -> Result<Option<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, PuzzleSession>(
        r#"
        DELETE FROM sessions
        WHERE id = ?
        RETURNING id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// 삭제했던 세션을 원래 id 그대로 다시 넣습니다 (되돌리기).
///
/// 다음 경우에는 아무것도 넣지 않고 `None`을 반환합니다.
/// - 퍼즐이 이미 없음
/// - 같은 id의 세션이 남아 있음
/// - 되살릴 세션이 진행 중 상태인데 다른 세션이 이미 진행 중
pub async fn restore_session<'e, E>(
    executor: E,
    session: &PuzzleSession,
) -> Result<Option<PuzzleSession>, AppError>
where
    E: SqliteExecutor<'e>,
{
    // 진행 중 규칙 검사도 같은 INSERT 문장 안에서 합니다.
    let restored = sqlx::query_as::<_, PuzzleSession>(
        r#"
        INSERT INTO sessions (id, puzzle_id, start_time, end_time, elapsed_time_ms,
                              completed, paused_at)
        SELECT ?, ?, ?, ?, ?, ?, ?
        WHERE EXISTS (SELECT 1 FROM puzzles WHERE id = ?)
          AND (
              ? IS NOT NULL OR ? IS NOT NULL
              OR NOT EXISTS (
                  SELECT 1 FROM sessions WHERE end_time IS NULL AND paused_at IS NULL
              )
          )
        ON CONFLICT(id) DO NOTHING
        RETURNING id, puzzle_id, start_time, end_time, elapsed_time_ms, completed, paused_at
        "#,
    )
    .bind(session.id)
    .bind(session.puzzle_id)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.elapsed_time_ms)
    .bind(session.completed)
    .bind(session.paused_at)
    .bind(session.puzzle_id)
    .bind(session.end_time)
    .bind(session.paused_at)
    .fetch_optional(executor)
    .await?;

    Ok(restored)
}
