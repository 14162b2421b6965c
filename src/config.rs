//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(`.env` 포함)에서 서버 설정값을 읽어옵니다.
//! 모든 항목에 기본값이 있으므로 아무 것도 설정하지 않아도 실행됩니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (기본값: `sqlite:data/puzzle-timer.db`)
//! - `HOST`: 서버 바인딩 주소 (기본값: `0.0.0.0`)
//! - `PORT`: 서버 포트 번호 (기본값: 3000)
//! - `TICK_INTERVAL_MS`: 타이머 표시 갱신 주기 (기본값: 10, 1~99 범위로 제한)

use std::env;
use std::time::Duration;

const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// 애플리케이션 전체 설정을 담는 구조체
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// 타이머가 경과 시간을 다시 계산해 내보내는 주기. 100ms 미만이어야 합니다.
    pub tick_interval: Duration,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    /// 값이 없거나 숫자로 파싱되지 않으면 기본값을 씁니다.
    pub fn from_env() -> Self {
        let tick_ms = env::var("TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS)
            .clamp(1, 99);

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/puzzle-timer.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            tick_interval: Duration::from_millis(tick_ms),
        }
    }
}
