//! # 시각 공급원
//!
//! 타이머는 "지금"을 직접 읽지 않고 `Clock`을 통해 읽습니다.
//! 운영 환경에서는 UTC 벽시계(`SystemClock`)를, 테스트에서는 손으로 움직이는 시계를 씁니다.

/// epoch 밀리초 단위의 현재 시각을 제공합니다.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

/// chrono의 UTC 현재 시각
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
