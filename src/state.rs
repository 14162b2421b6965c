use crate::services::clock::Clock;
use crate::services::timer::TimerRegistry;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`과 `TimerRegistry`는 내부적으로 Arc라서 clone해도 같은 대상을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// 로드된 세션 타이머들 (현재 시각은 레지스트리가 가진 `Clock`으로 읽습니다)
    pub timers: TimerRegistry,
}

impl AppState {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        let timers = TimerRegistry::new(pool.clone(), clock, tick_interval);
        Self { pool, timers }
    }
}
