//! # 서비스 계층
//!
//! DB 쿼리 위에서 동작하는 도메인 로직입니다.
//! - `clock`: 타이머가 읽는 시각 공급원
//! - `stats`: 세션 목록 → 퍼즐 통계 (순수 함수)
//! - `history`: 세션 시작/완료/삭제/복원과 통계 반영
//! - `timer`: 세션 타이머 상태 기계와 타이머 보관소

pub mod clock;
pub mod history;
pub mod stats;
pub mod timer;
