//! # 사용자 설정 쿼리 모듈
//!
//! `preferences` 키-값 테이블에 문자열 설정을 저장합니다.
//! 현재는 퍼즐 목록 정렬 기준(`sort_preference`) 하나만 사용합니다.

use crate::error::AppError;
use crate::models::SortOrder;
use sqlx::SqlitePool;

const SORT_PREFERENCE_KEY: &str = "sort_preference";

pub async fn get_preference(pool: &SqlitePool, key: &str) -> Result<Option<String>, AppError> {
    let value: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value.map(|(v,)| v))
}

/// 설정값을 저장합니다. 같은 키가 있으면 덮어씁니다 (UPSERT).
pub async fn set_preference(pool: &SqlitePool, key: &str, value: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO preferences (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// 저장된 정렬 기준을 읽습니다. 저장된 값이 없거나 알 수 없는 값이면 기본값(`NAME`)입니다.
pub async fn get_sort_order(pool: &SqlitePool) -> Result<SortOrder, AppError> {
    let stored = get_preference(pool, SORT_PREFERENCE_KEY).await?;
    let sort = match stored.as_deref().map(str::parse::<SortOrder>) {
        Some(Ok(sort)) => sort,
        Some(Err(_)) => {
            tracing::warn!(value = ?stored, "Ignoring unknown stored sort preference");
            SortOrder::default()
        }
        None => SortOrder::default(),
    };
    Ok(sort)
}

pub async fn save_sort_order(pool: &SqlitePool, sort: SortOrder) -> Result<(), AppError> {
    set_preference(pool, SORT_PREFERENCE_KEY, sort.as_str()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn sort_order_defaults_to_name(pool: SqlitePool) {
        assert_eq!(get_sort_order(&pool).await.unwrap(), SortOrder::Name);
    }

    #[sqlx::test]
    async fn saved_sort_order_is_overwritten(pool: SqlitePool) {
        save_sort_order(&pool, SortOrder::DateCompleted).await.unwrap();
        assert_eq!(get_sort_order(&pool).await.unwrap(), SortOrder::DateCompleted);

        save_sort_order(&pool, SortOrder::Name).await.unwrap();
        assert_eq!(get_sort_order(&pool).await.unwrap(), SortOrder::Name);
    }

    #[sqlx::test]
    async fn garbage_value_falls_back_to_default(pool: SqlitePool) {
        set_preference(&pool, SORT_PREFERENCE_KEY, "SIZE").await.unwrap();
        assert_eq!(get_sort_order(&pool).await.unwrap(), SortOrder::Name);
    }
}
