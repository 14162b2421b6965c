//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `puzzle`: 퍼즐 엔티티와 생성/수정 요청, 입력 검증
//! - `session`: 퍼즐 세션 엔티티와 세션 상태
//! - `preference`: 정렬 기준 사용자 설정
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Puzzle`처럼 짧게 접근합니다.

pub mod preference;
pub mod puzzle;
pub mod session;

pub use preference::*;
pub use puzzle::*;
pub use session::*;
