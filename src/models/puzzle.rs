//! # 퍼즐 모델 정의
//!
//! `puzzles` 테이블 한 행과, 퍼즐 생성/수정 요청 구조체를 정의합니다.
//! 요청은 DB에 닿기 전에 `validate()`로 검증되며, 검증을 통과한 값만
//! `PuzzleDraft`로 만들어져 DB 계층에 전달됩니다.

use crate::error::AppError;
use crate::services::stats::PuzzleStats;
use serde::{Deserialize, Serialize};

/// 퍼즐 엔티티: DB의 `puzzles` 테이블 한 행에 대응합니다.
///
/// 시각은 모두 epoch 밀리초(UTC)이고, 시간 길이는 밀리초입니다.
/// 한 번도 완료되지 않은 퍼즐은 통계 필드가 모두 `None`이고 `total_completions`가 0입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Puzzle {
    pub id: i64,
    pub name: String,
    pub piece_count: i64,
    pub image_uri: Option<String>,
    pub brand: Option<String>,
    pub first_completed: Option<i64>,
    pub last_completed: Option<i64>,
    pub total_completions: i64,
    pub best_time_ms: Option<i64>,
    pub average_time_ms: Option<i64>,
    /// 집계된 완료 세션들의 경과 시간 합계. 증분 평균을 정확하게 유지하는 데 씁니다.
    #[serde(default)]
    pub total_time_ms: i64,
}

impl Puzzle {
    /// 행에 저장된 통계 컬럼들을 `PuzzleStats`로 묶어 반환합니다.
    pub fn stats(&self) -> PuzzleStats {
        PuzzleStats {
            total_completions: self.total_completions,
            best_time_ms: self.best_time_ms,
            average_time_ms: self.average_time_ms,
            total_time_ms: self.total_time_ms,
            first_completed: self.first_completed,
            last_completed: self.last_completed,
        }
    }

    /// 되돌리기로 들어온 퍼즐 행을 검증합니다.
    ///
    /// 클라이언트가 보낸 통계는 그대로 저장되므로, 서로 모순되는 값이면 거부합니다.
    pub fn validate_restore(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_piece_count(self.piece_count)?;
        if !self.stats().is_consistent() {
            return Err(AppError::Validation(
                "Puzzle statistics are inconsistent".to_string(),
            ));
        }
        Ok(())
    }
}

/// 퍼즐 생성 요청: `POST /api/v1/puzzles`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreatePuzzleRequest {
    pub name: String,
    pub piece_count: i64,
    pub brand: Option<String>,
    pub image_uri: Option<String>,
    /// true면 퍼즐을 만든 직후 바로 타이머 세션을 시작합니다.
    #[serde(default)]
    pub start_timer: bool,
}

/// 퍼즐 수정 요청: `PATCH /api/v1/puzzles/{id}`
///
/// 포함된 필드만 바꿉니다. `image_uri`가 없으면 기존 이미지를 유지합니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePuzzleRequest {
    pub name: Option<String>,
    pub piece_count: Option<i64>,
    pub image_uri: Option<String>,
    pub brand: Option<String>,
}

/// 검증을 통과한 퍼즐 입력값
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDraft {
    pub name: String,
    pub piece_count: i64,
    pub brand: Option<String>,
    pub image_uri: Option<String>,
}

impl CreatePuzzleRequest {
    pub fn validate(&self) -> Result<PuzzleDraft, AppError> {
        Ok(PuzzleDraft {
            name: validate_name(&self.name)?,
            piece_count: validate_piece_count(self.piece_count)?,
            brand: normalize_optional(self.brand.as_deref()),
            image_uri: normalize_optional(self.image_uri.as_deref()),
        })
    }
}

impl UpdatePuzzleRequest {
    /// 기존 퍼즐에 요청을 덮어쓴 결과를 검증하여 반환합니다.
    /// 하나라도 잘못된 값이 있으면 아무것도 바꾸지 않고 에러를 돌려줍니다.
    pub fn apply_to(&self, current: &Puzzle) -> Result<PuzzleDraft, AppError> {
        let name = match &self.name {
            Some(name) => validate_name(name)?,
            None => current.name.clone(),
        };
        let piece_count = match self.piece_count {
            Some(count) => validate_piece_count(count)?,
            None => current.piece_count,
        };
        let brand = match &self.brand {
            Some(brand) => normalize_optional(Some(brand)),
            None => current.brand.clone(),
        };
        let image_uri = normalize_optional(self.image_uri.as_deref())
            .or_else(|| current.image_uri.clone());

        Ok(PuzzleDraft {
            name,
            piece_count,
            brand,
            image_uri,
        })
    }
}

/// 이름은 앞뒤 공백을 제거한 뒤 비어 있으면 안 됩니다.
fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Puzzle name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_piece_count(count: i64) -> Result<i64, AppError> {
    if count <= 0 {
        return Err(AppError::Validation(
            "Piece count must be greater than 0".to_string(),
        ));
    }
    Ok(count)
}

// 공백뿐인 선택 입력은 "입력 안 함"과 같게 취급합니다.
fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
