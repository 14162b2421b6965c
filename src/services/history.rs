//! # 세션 변경과 통계 반영
//!
//! 세션이 시작/완료/삭제/복원될 때 퍼즐 통계를 함께 맞춰 주는 서비스 함수들입니다.
//!
//! - 완료: 증분 경로(`PuzzleStats::with_sample`)로 샘플 하나를 합칩니다.
//! - 삭제/복원: 남은(또는 복원된) 세션 전체로 `stats::recompute`를 다시 돌립니다.
//!
//! 세션 행 변경과 통계 갱신은 항상 한 트랜잭션으로 묶입니다.
//! 통계 쓰기가 실패하면 세션 변경도 함께 롤백되어, 재시도하면 처음부터 다시 적용됩니다.

use crate::db;
use crate::error::AppError;
use crate::models::{PuzzleSession, SessionState};
use crate::services::clock::Clock;
use crate::services::stats::{self, PuzzleStats};
use sqlx::{SqliteConnection, SqlitePool};

/// 퍼즐에 새 세션을 시작합니다.
///
/// 다른 세션이 진행 중이면 `AppError::Conflict`, 퍼즐이 없으면 `Ok(None)`입니다.
pub async fn start_session(
    pool: &SqlitePool,
    clock: &dyn Clock,
    puzzle_id: i64,
) -> Result<Option<PuzzleSession>, AppError> {
    let session = db::create_session(pool, puzzle_id, clock.now_millis()).await?;
    if let Some(ref s) = session {
        tracing::info!(session_id = s.id, puzzle_id, "Session started");
    }
    Ok(session)
}

/// 완료된 세션 하나를 퍼즐 통계에 증분으로 합칩니다.
///
/// 세션 완료와 같은 트랜잭션의 연결을 받습니다.
/// 퍼즐이 이미 삭제되었으면 아무것도 하지 않고 `None`을 반환합니다.
pub async fn record_completion(
    conn: &mut SqliteConnection,
    session: &PuzzleSession,
) -> Result<Option<PuzzleStats>, AppError> {
    let Some(puzzle) = db::get_puzzle(&mut *conn, session.puzzle_id).await? else {
        return Ok(None);
    };

    let updated = puzzle
        .stats()
        .with_sample(session.elapsed_time_ms, session.completed_at());
    db::update_puzzle_stats(&mut *conn, puzzle.id, &updated).await?;

    tracing::info!(
        puzzle_id = puzzle.id,
        total_completions = updated.total_completions,
        best_time_ms = ?updated.best_time_ms,
        average_time_ms = ?updated.average_time_ms,
        "Puzzle stats updated"
    );
    Ok(Some(updated))
}

/// 퍼즐의 세션 전체를 읽어 통계를 처음부터 다시 계산하고 저장합니다.
pub async fn refresh_puzzle_stats(
    conn: &mut SqliteConnection,
    puzzle_id: i64,
) -> Result<Option<PuzzleStats>, AppError> {
    let sessions = db::list_sessions_for_puzzle(&mut *conn, puzzle_id).await?;
    let recomputed = stats::recompute(&sessions);

    if !db::update_puzzle_stats(&mut *conn, puzzle_id, &recomputed).await? {
        return Ok(None);
    }
    tracing::debug!(puzzle_id, total_completions = recomputed.total_completions, "Puzzle stats recomputed");
    Ok(Some(recomputed))
}

/// 세션을 삭제하고 퍼즐 통계를 다시 계산합니다.
///
/// 삭제된 세션을 반환하므로 호출자가 되돌리기(`restore_session`)에 쓸 수 있습니다.
/// 세션이 없으면 `None`.
pub async fn delete_session(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<Option<PuzzleSession>, AppError> {
    let mut tx = pool.begin().await?;
    let Some(session) = db::delete_session(&mut *tx, session_id).await? else {
        return Ok(None);
    };
    refresh_puzzle_stats(&mut tx, session.puzzle_id).await?;
    tx.commit().await?;

    tracing::info!(session_id, puzzle_id = session.puzzle_id, "Session deleted");
    Ok(Some(session))
}

/// 삭제했던 세션을 되살리고 퍼즐 통계를 다시 계산합니다.
///
/// 되살릴 세션이 진행 중 상태인데 다른 세션이 이미 진행 중이면 `Conflict`입니다.
/// 퍼즐이 없거나 같은 id의 세션이 남아 있으면 `None`.
pub async fn restore_session(
    pool: &SqlitePool,
    session: &PuzzleSession,
) -> Result<Option<PuzzleSession>, AppError> {
    let mut tx = pool.begin().await?;
    let Some(restored) = db::restore_session(&mut *tx, session).await? else {
        // 삽입이 거부된 이유가 진행 중 규칙이었는지 같은 트랜잭션 안에서 확인합니다.
        if session.state() == SessionState::Running {
            if let Some(running) = db::get_running_session(&mut *tx).await? {
                if running.id != session.id {
                    return Err(AppError::Conflict(format!(
                        "Session {} is already running",
                        running.id
                    )));
                }
            }
        }
        return Ok(None);
    };
    refresh_puzzle_stats(&mut tx, restored.puzzle_id).await?;
    tx.commit().await?;

    tracing::info!(session_id = restored.id, puzzle_id = restored.puzzle_id, "Session restored");
    Ok(Some(restored))
}
