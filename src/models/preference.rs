use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 퍼즐 목록 정렬 기준. 사용자 설정으로 저장되는 유일한 값입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    /// 이름 오름차순 (기본값)
    #[default]
    Name,
    /// 마지막 완료일 내림차순, 한 번도 완료하지 않은 퍼즐은 뒤로
    DateCompleted,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Name => "NAME",
            SortOrder::DateCompleted => "DATE_COMPLETED",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NAME" => Ok(SortOrder::Name),
            "DATE_COMPLETED" => Ok(SortOrder::DateCompleted),
            other => Err(AppError::Validation(format!("Unknown sort option: {other}"))),
        }
    }
}

/// `GET`/`PUT /api/v1/preferences/sort` 응답 본문
#[derive(Debug, Serialize, Deserialize)]
pub struct SortPreference {
    pub sort: SortOrder,
}
