//! # 세션 타이머 상태 기계
//!
//! 세션 하나에 묶인 메모리 상의 타이머입니다.
//!
//! ## 상태 전이
//! ```text
//! Idle ──load()──▶ Running ──pause()──▶ Paused
//!                     ▲                   │
//!                     └─────resume()──────┘
//!        Running / Paused ──finish()──▶ Finished
//!        Running / Paused ──abandon()─▶ Idle (세션 행 삭제)
//! ```
//! 허용되지 않은 전이 호출은 조용히 무시됩니다(no-op).
//!
//! ## 경과 시간 계산
//! 매 틱마다 카운터를 올리지 않고, `baseline + (now - reference)`로 계산합니다.
//! 틱이 늦게 오거나 앱이 잠시 멈춰도 값이 어긋나지 않습니다.
//! DB에는 일시정지/완료 시점의 `baseline`만 저장하므로, 틱은 DB를 전혀 건드리지 않습니다.
//!
//! ## 틱 태스크
//! Running 상태에서만 tokio 태스크가 `tick_interval`마다 현재 경과 시간을 `watch` 채널로 내보냅니다.
//! pause/finish/abandon은 이 태스크를 abort하고 끝날 때까지 기다린 뒤에 DB를 씁니다.
//!
//! ## 레지스트리
//! `TimerRegistry`는 진행 중/일시정지 타이머만 보관합니다. 세션을 시작하면 `start_time`부터
//! 재는 타이머가 바로 등록되고, 이후 `load`는 보관 중인 타이머를 그대로 돌려줍니다.
//! 끝났거나 사라진 세션은 DB에서 다시 읽어도 같은 결과이므로 보관하지 않습니다.

use crate::db;
use crate::error::AppError;
use crate::models::{Puzzle, PuzzleSession};
use crate::services::clock::Clock;
use crate::services::history;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    /// `reference`: 마지막으로 달리기 시작한 시각, `baseline`: 그 이전까지의 누적 시간
    Running { reference: i64, baseline: i64 },
    Paused { elapsed: i64 },
    Finished { elapsed: i64 },
}

/// 외부에 보여주는 타이머 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

/// 타이머 화면에 필요한 값 한 묶음
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub session_id: i64,
    pub puzzle_id: Option<i64>,
    pub puzzle_name: Option<String>,
    pub piece_count: Option<i64>,
    pub status: TimerStatus,
    pub elapsed_time_ms: i64,
}

pub struct SessionTimer {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    session_id: i64,
    puzzle_id: Option<i64>,
    puzzle_name: Option<String>,
    piece_count: Option<i64>,
    state: TimerState,
    elapsed_tx: Arc<watch::Sender<i64>>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        let (elapsed_tx, _) = watch::channel(0);
        Self {
            pool,
            clock,
            tick_interval,
            session_id: 0,
            puzzle_id: None,
            puzzle_name: None,
            piece_count: None,
            state: TimerState::Idle,
            elapsed_tx: Arc::new(elapsed_tx),
            ticker: None,
        }
    }

    /// 세션과 그 퍼즐을 읽어 타이머를 초기화합니다.
    ///
    /// - `paused_at`이 있으면 Paused (경과 시간 = 저장된 값)
    /// - 아직 끝나지 않았으면 Running (지금부터 다시 잼)
    /// - 이미 끝났으면 Finished (틱 없음)
    ///
    /// 세션이나 퍼즐이 없으면 `None`을 반환하고 Idle로 남습니다.
    pub async fn load(&mut self, session_id: i64) -> Result<Option<TimerSnapshot>, AppError> {
        self.stop_ticking().await;
        self.state = TimerState::Idle;

        let Some(session) = db::get_session(&self.pool, session_id).await? else {
            return Ok(None);
        };
        let Some(puzzle) = db::get_puzzle(&self.pool, session.puzzle_id).await? else {
            return Ok(None);
        };

        self.attach(&session, puzzle, self.clock.now_millis());
        tracing::debug!(session_id, status = ?self.status(), "Timer loaded");
        Ok(Some(self.snapshot()))
    }

    /// 방금 시작한 세션에 타이머를 붙입니다. 첫 요청 시각이 아니라 `start_time`부터 잽니다.
    pub async fn begin(
        &mut self,
        session: &PuzzleSession,
    ) -> Result<Option<TimerSnapshot>, AppError> {
        self.stop_ticking().await;
        self.state = TimerState::Idle;

        let Some(puzzle) = db::get_puzzle(&self.pool, session.puzzle_id).await? else {
            return Ok(None);
        };

        self.attach(session, puzzle, session.start_time);
        tracing::debug!(session_id = session.id, "Timer started with session");
        Ok(Some(self.snapshot()))
    }

    // 진행 중인 세션이면 `reference`부터, 저장된 경과 시간을 기준값으로 잽니다.
    fn attach(&mut self, session: &PuzzleSession, puzzle: Puzzle, reference: i64) {
        self.session_id = session.id;
        self.puzzle_id = Some(puzzle.id);
        self.puzzle_name = Some(puzzle.name);
        self.piece_count = Some(puzzle.piece_count);

        let stored = session.elapsed_time_ms;
        if session.paused_at.is_some() {
            self.state = TimerState::Paused { elapsed: stored };
        } else if session.end_time.is_none() {
            self.start_ticking(reference, stored);
        } else {
            self.state = TimerState::Finished { elapsed: stored };
        }
        self.elapsed_tx.send_replace(self.elapsed());
    }

    /// 현재 표시할 경과 시간(ms)
    pub fn elapsed(&self) -> i64 {
        match self.state {
            TimerState::Idle => 0,
            TimerState::Running {
                reference,
                baseline,
            } => baseline + (self.clock.now_millis() - reference).max(0),
            TimerState::Paused { elapsed } | TimerState::Finished { elapsed } => elapsed,
        }
    }

    pub fn status(&self) -> TimerStatus {
        match self.state {
            TimerState::Idle => TimerStatus::Idle,
            TimerState::Running { .. } => TimerStatus::Running,
            TimerState::Paused { .. } => TimerStatus::Paused,
            TimerState::Finished { .. } => TimerStatus::Finished,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            session_id: self.session_id,
            puzzle_id: self.puzzle_id,
            puzzle_name: self.puzzle_name.clone(),
            piece_count: self.piece_count,
            status: self.status(),
            elapsed_time_ms: self.elapsed(),
        }
    }

    /// 틱마다 갱신되는 경과 시간을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.elapsed_tx.subscribe()
    }

    /// Running에서만 동작합니다. 현재 경과 시간을 저장하고 Paused로 갑니다.
    pub async fn pause(&mut self) -> Result<TimerSnapshot, AppError> {
        let TimerState::Running {
            reference,
            baseline,
        } = self.state
        else {
            return Ok(self.snapshot());
        };

        self.stop_ticking().await;
        let now = self.clock.now_millis();
        let elapsed = baseline + (now - reference).max(0);

        match db::pause_session(&self.pool, self.session_id, elapsed, now).await {
            Ok(Some(_)) => {
                self.state = TimerState::Paused { elapsed };
                self.elapsed_tx.send_replace(elapsed);
                tracing::info!(session_id = self.session_id, elapsed, "Timer paused");
            }
            Ok(None) => self.state = TimerState::Idle,
            Err(e) => {
                self.start_ticking(reference, baseline);
                return Err(e);
            }
        }
        Ok(self.snapshot())
    }

    /// Paused에서만 동작합니다. `paused_at`을 지우고 지금부터 다시 잽니다.
    ///
    /// 다른 세션이 진행 중이면 `Conflict`를 반환하고 Paused로 남습니다.
    pub async fn resume(&mut self) -> Result<TimerSnapshot, AppError> {
        let TimerState::Paused { elapsed } = self.state else {
            return Ok(self.snapshot());
        };

        match db::resume_session(&self.pool, self.session_id).await? {
            Some(session) if session.end_time.is_none() && session.paused_at.is_none() => {
                self.start_ticking(self.clock.now_millis(), elapsed);
                tracing::info!(session_id = self.session_id, elapsed, "Timer resumed");
            }
            Some(session) => {
                self.state = TimerState::Finished {
                    elapsed: session.elapsed_time_ms,
                };
            }
            None => self.state = TimerState::Idle,
        }
        Ok(self.snapshot())
    }

    /// Running 또는 Paused에서 세션을 완료하고 퍼즐 통계를 갱신합니다.
    ///
    /// 성공하면 퍼즐 id를 반환합니다. 이미 끝났거나 로드되지 않은 타이머면 `None` (통계 변경 없음).
    /// 완료 기록과 통계 갱신은 한 트랜잭션입니다. 실패하면 둘 다 롤백되고 타이머는
    /// 원래 상태(Running이면 다시 틱)로 남으므로 그대로 다시 호출할 수 있습니다.
    pub async fn finish(&mut self) -> Result<Option<i64>, AppError> {
        // Running이었으면 (reference, baseline), Paused였으면 None
        let running_since = match self.state {
            TimerState::Running {
                reference,
                baseline,
            } => Some((reference, baseline)),
            TimerState::Paused { .. } => None,
            TimerState::Idle | TimerState::Finished { .. } => return Ok(None),
        };

        self.stop_ticking().await;
        let now = self.clock.now_millis();
        let elapsed = match running_since {
            Some((reference, baseline)) => baseline + (now - reference).max(0),
            None => self.elapsed(),
        };

        let session = match self.complete_and_record(now, elapsed).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.state = TimerState::Idle;
                return Ok(None);
            }
            Err(e) => {
                if let Some((reference, baseline)) = running_since {
                    self.start_ticking(reference, baseline);
                }
                return Err(e);
            }
        };

        self.state = TimerState::Finished { elapsed };
        self.elapsed_tx.send_replace(elapsed);
        tracing::info!(
            session_id = session.id,
            puzzle_id = session.puzzle_id,
            elapsed,
            "Session finished"
        );
        Ok(Some(session.puzzle_id))
    }

    async fn complete_and_record(
        &self,
        end_time: i64,
        elapsed: i64,
    ) -> Result<Option<PuzzleSession>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(session) = db::complete_session(&mut *tx, self.session_id, end_time, elapsed).await?
        else {
            return Ok(None);
        };
        history::record_completion(&mut tx, &session).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// 저장하지 않을 시도를 버립니다. 세션 행을 삭제하며 통계는 바뀌지 않습니다.
    ///
    /// 삭제가 일어났는지 여부를 반환합니다.
    pub async fn abandon(&mut self) -> Result<bool, AppError> {
        if !matches!(
            self.state,
            TimerState::Running { .. } | TimerState::Paused { .. }
        ) {
            return Ok(false);
        }

        self.stop_ticking().await;
        let deleted = db::delete_session(&self.pool, self.session_id)
            .await?
            .is_some();
        self.state = TimerState::Idle;
        self.elapsed_tx.send_replace(0);
        tracing::info!(session_id = self.session_id, deleted, "Session abandoned");
        Ok(deleted)
    }

    fn start_ticking(&mut self, reference: i64, baseline: i64) {
        self.state = TimerState::Running {
            reference,
            baseline,
        };

        let clock = Arc::clone(&self.clock);
        let tx = Arc::clone(&self.elapsed_tx);
        let period = self.tick_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tx.send_replace(baseline + (clock.now_millis() - reference).max(0));
            }
        }));
    }

    // abort 후 join까지 기다려야 마지막 틱이 저장된 값을 덮어쓰지 않습니다.
    async fn stop_ticking(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

/// 완료 요청의 결과
#[derive(Debug, Clone, Serialize)]
pub struct FinishOutcome {
    /// 이번 호출로 완료되었으면 퍼즐 id, 이미 끝나 있었으면 `None`
    pub puzzle_id: Option<i64>,
    pub timer: TimerSnapshot,
}

/// 세션 id별로 로드된 타이머를 보관합니다.
///
/// 하나의 `Mutex`가 모든 전이를 직렬화하므로, 같은 세션에 대한 동시 요청이
/// 서로의 pause/finish 기록을 덮어쓰지 않습니다.
#[derive(Clone)]
pub struct TimerRegistry {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    timers: Arc<Mutex<HashMap<i64, SessionTimer>>>,
}

impl TimerRegistry {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        Self {
            pool,
            clock,
            tick_interval,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 퍼즐에 새 세션을 시작하고 곧바로 타이머를 등록합니다.
    ///
    /// 다른 세션이 진행 중이면 `Conflict`, 퍼즐이 없으면 `None`.
    pub async fn start(&self, puzzle_id: i64) -> Result<Option<PuzzleSession>, AppError> {
        let mut timers = self.timers.lock().await;
        let Some(session) =
            history::start_session(&self.pool, self.clock.as_ref(), puzzle_id).await?
        else {
            return Ok(None);
        };

        // 세션은 이미 저장되었으므로 타이머 등록 실패는 첫 타이머 요청 때 다시 로드합니다.
        let mut timer = self.new_timer();
        match timer.begin(&session).await {
            Ok(Some(_)) => {
                timers.insert(session.id, timer);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(session_id = session.id, error = %e, "Timer not registered at start");
            }
        }
        Ok(Some(session))
    }

    /// 세션 타이머를 로드합니다.
    ///
    /// 이미 보관 중인 타이머가 있으면 그 상태를 그대로 돌려줍니다.
    /// 없을 때만 DB에서 읽으며, 이때 진행 중 세션은 마지막으로 저장된 경과 시간부터 다시 잽니다.
    pub async fn load(&self, session_id: i64) -> Result<Option<TimerSnapshot>, AppError> {
        self.snapshot(session_id).await
    }

    pub async fn snapshot(&self, session_id: i64) -> Result<Option<TimerSnapshot>, AppError> {
        let mut timers = self.timers.lock().await;
        let snapshot = self
            .loaded(&mut timers, session_id)
            .await?
            .map(|timer| timer.snapshot());
        settle(&mut timers, session_id);
        Ok(snapshot)
    }

    pub async fn subscribe(
        &self,
        session_id: i64,
    ) -> Result<Option<watch::Receiver<i64>>, AppError> {
        let mut timers = self.timers.lock().await;
        let rx = self
            .loaded(&mut timers, session_id)
            .await?
            .map(|timer| timer.subscribe());
        settle(&mut timers, session_id);
        Ok(rx)
    }

    pub async fn pause(&self, session_id: i64) -> Result<Option<TimerSnapshot>, AppError> {
        let mut timers = self.timers.lock().await;
        let snapshot = match self.loaded(&mut timers, session_id).await? {
            Some(timer) => Some(timer.pause().await?),
            None => None,
        };
        settle(&mut timers, session_id);
        Ok(snapshot)
    }

    pub async fn resume(&self, session_id: i64) -> Result<Option<TimerSnapshot>, AppError> {
        let mut timers = self.timers.lock().await;
        let snapshot = match self.loaded(&mut timers, session_id).await? {
            Some(timer) => Some(timer.resume().await?),
            None => None,
        };
        settle(&mut timers, session_id);
        Ok(snapshot)
    }

    pub async fn finish(&self, session_id: i64) -> Result<Option<FinishOutcome>, AppError> {
        let mut timers = self.timers.lock().await;
        let Some(timer) = self.loaded(&mut timers, session_id).await? else {
            return Ok(None);
        };
        let puzzle_id = timer.finish().await?;
        let outcome = FinishOutcome {
            puzzle_id,
            timer: timer.snapshot(),
        };
        settle(&mut timers, session_id);
        Ok(Some(outcome))
    }

    /// 세션을 포기합니다. 세션이 없으면 `false`.
    pub async fn abandon(&self, session_id: i64) -> Result<bool, AppError> {
        let mut timers = self.timers.lock().await;
        let Some(timer) = self.loaded(&mut timers, session_id).await? else {
            return Ok(false);
        };
        let deleted = timer.abandon().await?;
        timers.remove(&session_id);
        Ok(deleted)
    }

    /// 세션이 다른 경로로 삭제되었을 때 보관 중인 타이머를 버립니다.
    pub async fn forget(&self, session_id: i64) {
        self.timers.lock().await.remove(&session_id);
    }

    #[cfg(test)]
    async fn is_cached(&self, session_id: i64) -> bool {
        self.timers.lock().await.contains_key(&session_id)
    }

    fn new_timer(&self) -> SessionTimer {
        SessionTimer::new(
            self.pool.clone(),
            Arc::clone(&self.clock),
            self.tick_interval,
        )
    }

    async fn loaded<'a>(
        &self,
        timers: &'a mut HashMap<i64, SessionTimer>,
        session_id: i64,
    ) -> Result<Option<&'a mut SessionTimer>, AppError> {
        if !timers.contains_key(&session_id) {
            let mut timer = self.new_timer();
            if timer.load(session_id).await?.is_none() {
                return Ok(None);
            }
            timers.insert(session_id, timer);
        }
        Ok(timers.get_mut(&session_id))
    }
}

// Running/Paused가 아닌 타이머는 레지스트리에서 뺍니다.
fn settle(timers: &mut HashMap<i64, SessionTimer>, session_id: i64) {
    let done = timers.get(&session_id).is_some_and(|timer| {
        matches!(timer.status(), TimerStatus::Idle | TimerStatus::Finished)
    });
    if done {
        timers.remove(&session_id);
    }
}
