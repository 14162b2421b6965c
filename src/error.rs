//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 함수들은 예외 대신 `Result<T, AppError>`를 반환하고, 호출자는 `?`로 에러를 위로 전파합니다.
//!
//! 에러 분류:
//! - **검증 에러**(`Validation`): 빈 이름, 0 이하의 조각 수 등. 어떤 상태도 바꾸기 전에 거부합니다.
//! - **없음**(`NotFound`): DB 계층과 서비스 계층은 `Option`으로 "아무 일도 없었음"을 돌려주고,
//!   HTTP 계층에서만 이 variant로 바뀝니다.
//! - **충돌**(`Conflict`): 이미 진행 중인 세션이 있는데 또 세션을 시작/재개하려는 경우
//! - **영속화 실패**(`Database`, `Internal`): 요청 하나만 실패시키고 프로세스는 계속 동작합니다.
//!
//! `IntoResponse` 구현으로 핸들러가 `Err(AppError)`를 반환하면 자동으로 JSON 에러 응답이 됩니다.

use axum::{
    http::StatusCode,                   // 404, 409 등 HTTP 상태 코드
    response::{IntoResponse, Response}, // 핸들러 반환값을 HTTP 응답으로 바꾸는 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로로 에러 본문을 만듭니다
use thiserror::Error; // #[error("...")]로 Display와 std::error::Error를 구현해 주는 derive

// #[derive(Debug, Error)]
// - Debug: {:?} 출력 (로그에 그대로 찍힙니다)
// - Error (thiserror): 각 variant의 #[error("...")] 문구가 Display 메시지가 됩니다.

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 variant는 HTTP 상태 코드 하나와 `code` 문자열 하나에 대응합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 퍼즐/세션을 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 입력값 검증 실패 (HTTP 400)
    /// {0}은 안에 담긴 String, 즉 클라이언트에 그대로 보여줄 메시지입니다.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 다른 세션이 이미 진행 중 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from] 덕분에 sqlx 호출 뒤의 `?`가 자동으로 이 variant로 변환됩니다.
    /// 트랜잭션 안에서 난 에러라면 `?`로 빠져나가는 순간 트랜잭션이 drop되어 롤백됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// Axum은 핸들러가 Err(AppError)를 반환하면 이 구현을 호출해 응답을 만듭니다.
impl IntoResponse for AppError {
    /// AppError를 `{ "error": { "code", "message" } }` 형태의 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 남기고
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        // (상태 코드, 에러 코드 문자열, 메시지) 튜플로 모읍니다.
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),

            // ref: self를 옮기지 않고 안의 String만 빌려옵니다.
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                // 원인은 서버 로그에만 남깁니다.
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과 예: { "error": { "code": "conflict", "message": "Session 3 is already running" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // (StatusCode, Json) 튜플은 그 자체로 IntoResponse를 구현합니다.
        (status, body).into_response()
    }
}
