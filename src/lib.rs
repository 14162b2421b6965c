//! # puzzle-timer
//!
//! 직소 퍼즐을 맞추는 데 걸린 시간을 기록하는 단일 사용자 백엔드입니다.
//!
//! - `db`: SQLite 저장소 (퍼즐, 세션, 설정)
//! - `services`: 통계 계산, 세션 기록, 타이머 상태 기계
//! - `routes`: axum HTTP 핸들러

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
