//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! SQLite와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스(services/)와 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `puzzles`: 퍼즐 CRUD, 이름 검색, 통계 컬럼 갱신
//! - `sessions`: 세션 생성/일시정지/재개/완료/삭제/복원
//! - `preferences`: 정렬 기준 사용자 설정

pub mod preferences;
pub mod puzzles;
pub mod sessions;

// `crate::db::get_puzzle`처럼 바로 접근할 수 있게 재공개합니다.
pub use preferences::*;
pub use puzzles::*;
pub use sessions::*;
