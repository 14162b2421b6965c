//! # 퍼즐 세션 모델 정의
//!
//! 세션은 퍼즐 하나를 맞추는 한 번의 시도입니다.
//!
//! ## 세션 상태
//! ```text
//! 진행 중(running)  : end_time = NULL, paused_at = NULL
//! 일시정지(paused)  : end_time = NULL, paused_at ≠ NULL
//! 완료(finished)    : end_time ≠ NULL, completed = true
//! ```
//! 중간에 포기한 세션은 표시하지 않고 행 자체를 삭제합니다.

use crate::models::Puzzle;
use serde::{Deserialize, Serialize};

/// 세션 엔티티: DB의 `sessions` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PuzzleSession {
    pub id: i64,
    /// 이 세션이 속한 퍼즐 (외래키, 퍼즐 삭제 시 함께 삭제)
    pub puzzle_id: i64,
    pub start_time: i64,
    pub end_time: Option<i64>,
    /// 일시정지 구간을 제외한 누적 경과 시간(ms).
    /// 벽시계 차이가 아니라 일시정지 때마다 갱신되는 누적값입니다.
    pub elapsed_time_ms: i64,
    pub completed: bool,
    pub paused_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Running,
    Paused,
    Finished,
}

impl PuzzleSession {
    pub fn state(&self) -> SessionState {
        match (self.end_time, self.paused_at) {
            (Some(_), _) => SessionState::Finished,
            (None, Some(_)) => SessionState::Paused,
            (None, None) => SessionState::Running,
        }
    }

    /// 통계 계산에서 "완료 시각"으로 쓰는 값. 종료 시각이 없으면 시작 시각을 씁니다.
    pub fn completed_at(&self) -> i64 {
        self.end_time.unwrap_or(self.start_time)
    }
}

/// 홈 화면에 보여줄 일시정지 세션과 그 퍼즐
#[derive(Debug, Clone, Serialize)]
pub struct PausedSessionInfo {
    pub session: PuzzleSession,
    pub puzzle: Puzzle,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(end_time: Option<i64>, paused_at: Option<i64>) -> PuzzleSession {
        PuzzleSession {
            id: 1,
            puzzle_id: 1,
            start_time: 1_000,
            end_time,
            elapsed_time_ms: 0,
            completed: end_time.is_some(),
            paused_at,
        }
    }

    #[test]
    fn state_follows_end_time_and_paused_at() {
        assert_eq!(session(None, None).state(), SessionState::Running);
        assert_eq!(session(None, Some(2_000)).state(), SessionState::Paused);
        assert_eq!(session(Some(3_000), None).state(), SessionState::Finished);
    }

    #[test]
    fn completed_at_falls_back_to_start_time() {
        assert_eq!(session(None, None).completed_at(), 1_000);
        assert_eq!(session(Some(3_000), None).completed_at(), 3_000);
    }
}
