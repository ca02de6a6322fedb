//! Search history persistence.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::SearchRecord;

/// Maximum snapshot length stored per record, in characters.
pub const SNAPSHOT_LIMIT: usize = 1000;

fn truncate_snapshot(snapshot: &str) -> String {
    snapshot.chars().take(SNAPSHOT_LIMIT).collect()
}

/// Append a search record. The snapshot is truncated to [`SNAPSHOT_LIMIT`].
pub async fn append_search(
    pool: &SqlitePool,
    user_id: i64,
    query: &str,
    category: &str,
    snapshot: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO search_history (user_id, query, category, snapshot)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(query)
    .bind(category)
    .bind(truncate_snapshot(snapshot))
    .execute(pool)
    .await?;

    Ok(())
}

/// Debit the search cost and append the history record in one transaction.
///
/// Either both apply or neither does. A cost of zero (privileged users)
/// skips the debit but still logs the record.
pub async fn finalize_search(
    pool: &SqlitePool,
    user_id: i64,
    query: &str,
    category: &str,
    snapshot: &str,
    cost: i64,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    if cost > 0 {
        let result = sqlx::query(
            r#"
            UPDATE users SET credits = credits - ? WHERE id = ? AND credits >= ?
            "#,
        )
        .bind(cost)
        .bind(user_id)
        .bind(cost)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let balance = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT credits FROM users WHERE id = ?
                "#,
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DatabaseError::NotFound {
                entity: "User",
                id: user_id,
            })?;

            return Err(DatabaseError::InsufficientCredits {
                user_id,
                balance,
                needed: cost,
            });
        }
    }

    sqlx::query(
        r#"
        INSERT INTO search_history (user_id, query, category, snapshot)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(query)
    .bind(category)
    .bind(truncate_snapshot(snapshot))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Get the last `limit` searches for a user, in insertion order.
pub async fn recent_searches(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<SearchRecord>> {
    let mut rows = sqlx::query_as::<_, SearchRecord>(
        r#"
        SELECT id, user_id, query, category, snapshot, created_at
        FROM search_history
        WHERE user_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}

/// Count searches for one user.
pub async fn count_searches_for(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM search_history WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Count searches across all users.
pub async fn count_searches(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM search_history
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger, user, Database};

    async fn test_db_with_user(id: i64, credits: i64) -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        user::create_user(db.pool(), id, "Test", None).await.unwrap();
        if credits > 0 {
            ledger::credit(db.pool(), id, credits).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_append_and_recent_order() {
        let db = test_db_with_user(1, 0).await;

        for query in ["first", "second", "third"] {
            append_search(db.pool(), 1, query, "ip-address", "snap").await.unwrap();
        }

        let recent = recent_searches(db.pool(), 1, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Last two, oldest first.
        assert_eq!(recent[0].query, "second");
        assert_eq!(recent[1].query, "third");
    }

    #[tokio::test]
    async fn test_snapshot_truncated() {
        let db = test_db_with_user(1, 0).await;

        let long = "x".repeat(SNAPSHOT_LIMIT + 500);
        append_search(db.pool(), 1, "q", "ip-address", &long).await.unwrap();

        let recent = recent_searches(db.pool(), 1, 1).await.unwrap();
        assert_eq!(recent[0].snapshot.chars().count(), SNAPSHOT_LIMIT);
    }

    #[tokio::test]
    async fn test_finalize_search_debits_and_logs() {
        let db = test_db_with_user(1, 10).await;

        finalize_search(db.pool(), 1, "110001", "postal-code", "report", 5)
            .await
            .unwrap();

        assert_eq!(ledger::get_credits(db.pool(), 1).await.unwrap(), 5);
        assert_eq!(count_searches_for(db.pool(), 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_finalize_search_zero_cost() {
        let db = test_db_with_user(1, 10).await;

        finalize_search(db.pool(), 1, "q", "ip-address", "report", 0)
            .await
            .unwrap();

        assert_eq!(ledger::get_credits(db.pool(), 1).await.unwrap(), 10);
        assert_eq!(count_searches_for(db.pool(), 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_finalize_search_insufficient_rolls_back() {
        let db = test_db_with_user(1, 3).await;

        let result = finalize_search(db.pool(), 1, "q", "ip-address", "report", 5).await;
        assert!(matches!(
            result,
            Err(DatabaseError::InsufficientCredits { balance: 3, .. })
        ));

        // Neither the debit nor the history write applied.
        assert_eq!(ledger::get_credits(db.pool(), 1).await.unwrap(), 3);
        assert_eq!(count_searches_for(db.pool(), 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counts() {
        let db = test_db_with_user(1, 0).await;
        user::create_user(db.pool(), 2, "Other", None).await.unwrap();

        append_search(db.pool(), 1, "a", "ip-address", "s").await.unwrap();
        append_search(db.pool(), 2, "b", "postal-code", "s").await.unwrap();

        assert_eq!(count_searches(db.pool()).await.unwrap(), 2);
        assert_eq!(count_searches_for(db.pool(), 1).await.unwrap(), 1);
    }
}
