//! # 퍼즐 통계 계산
//!
//! 세션 목록을 퍼즐 단위 집계(완료 횟수, 최고 기록, 평균 기록, 첫/마지막 완료 시각)로 접습니다.
//!
//! 두 가지 경로가 있습니다:
//! - `recompute()`: 전체 재계산. 세션 삭제/복원 후에 사용합니다.
//!   최솟값 샘플이 빠지는 경우는 증분으로 되돌릴 수 없기 때문입니다.
//! - `PuzzleStats::with_sample()`: 완료 한 건을 기존 통계에 합치는 증분 경로.
//!   세션 완료 직후에 사용합니다.
//!
//! 평균은 두 경로 모두 `total_time_ms / total_completions`(정수 나눗셈, 내림)로 계산합니다.
//! 합계를 함께 저장하므로 증분 경로가 전체 재계산과 비트 단위로 같은 결과를 냅니다.

use crate::models::PuzzleSession;
use serde::Serialize;

/// 퍼즐 하나의 집계 통계
///
/// 불변식: `total_completions == 0`이면 나머지 옵션 필드가 모두 `None`이고 `total_time_ms == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PuzzleStats {
    pub total_completions: i64,
    pub best_time_ms: Option<i64>,
    pub average_time_ms: Option<i64>,
    pub total_time_ms: i64,
    pub first_completed: Option<i64>,
    pub last_completed: Option<i64>,
}

/// 통계에 포함되는 세션인지: 완료되었고 경과 시간이 0보다 커야 합니다.
pub fn counts_toward_stats(session: &PuzzleSession) -> bool {
    session.completed && session.elapsed_time_ms > 0
}

/// 세션 목록 전체로부터 통계를 새로 계산합니다.
///
/// 순수 함수이므로 같은 입력에 대해 몇 번을 호출해도 같은 결과가 나옵니다.
pub fn recompute(sessions: &[PuzzleSession]) -> PuzzleStats {
    let counted: Vec<&PuzzleSession> = sessions
        .iter()
        .filter(|s| counts_toward_stats(s))
        .collect();

    if counted.is_empty() {
        return PuzzleStats::default();
    }

    let total_completions = counted.len() as i64;
    let total_time_ms: i64 = counted.iter().map(|s| s.elapsed_time_ms).sum();

    PuzzleStats {
        total_completions,
        best_time_ms: counted.iter().map(|s| s.elapsed_time_ms).min(),
        average_time_ms: Some(total_time_ms / total_completions),
        total_time_ms,
        first_completed: counted.iter().map(|s| s.completed_at()).min(),
        last_completed: counted.iter().map(|s| s.completed_at()).max(),
    }
}

impl PuzzleStats {
    /// 완료 샘플 하나를 합친 새 통계를 반환합니다.
    ///
    /// 기존 통계가 비어 있으면 이 샘플 하나로 초기화됩니다.
    /// `elapsed_ms <= 0`인 샘플은 `recompute()`와 마찬가지로 무시합니다.
    pub fn with_sample(self, elapsed_ms: i64, completed_at: i64) -> Self {
        if elapsed_ms <= 0 {
            return self;
        }

        let total_completions = self.total_completions + 1;
        let total_time_ms = self.total_time_ms + elapsed_ms;

        Self {
            total_completions,
            best_time_ms: Some(
                self.best_time_ms
                    .map_or(elapsed_ms, |best| best.min(elapsed_ms)),
            ),
            average_time_ms: Some(total_time_ms / total_completions),
            total_time_ms,
            first_completed: Some(
                self.first_completed
                    .map_or(completed_at, |first| first.min(completed_at)),
            ),
            last_completed: Some(
                self.last_completed
                    .map_or(completed_at, |last| last.max(completed_at)),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_completions == 0
    }

    /// 집계 값들이 서로 모순되지 않는지 검사합니다.
    ///
    /// - 완료 0회: 옵션 필드는 모두 `None`, 합계는 0
    /// - 완료 1회 이상: 옵션 필드는 모두 `Some`, `best > 0`, `first <= last`,
    ///   `best * count <= total`, `average == total / count`
    pub fn is_consistent(&self) -> bool {
        if self.total_completions < 0 {
            return false;
        }
        if self.is_empty() {
            return self.total_time_ms == 0
                && self.best_time_ms.is_none()
                && self.average_time_ms.is_none()
                && self.first_completed.is_none()
                && self.last_completed.is_none();
        }

        let (Some(best), Some(average), Some(first), Some(last)) = (
            self.best_time_ms,
            self.average_time_ms,
            self.first_completed,
            self.last_completed,
        ) else {
            return false;
        };
        best > 0
            && first <= last
            && best
                .checked_mul(self.total_completions)
                .is_some_and(|floor| floor <= self.total_time_ms)
            && average == self.total_time_ms / self.total_completions
    }
}
