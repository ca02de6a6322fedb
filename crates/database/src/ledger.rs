//! Credit ledger operations.
//!
//! The balance column is only ever mutated here (and by the transaction in
//! [`crate::history::finalize_search`]). A debit is a single conditional
//! UPDATE, so check-then-debit races cannot drive a balance negative.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};

/// Get the current credit balance for a user.
pub async fn get_credits(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT credits FROM users WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DatabaseError::NotFound {
        entity: "User",
        id: user_id,
    })
}

/// Unconditionally increase a user's balance.
///
/// Used for the welcome bonus and administrative grants.
pub async fn credit(pool: &SqlitePool, user_id: i64, amount: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users SET credits = credits + ? WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id,
        });
    }

    tracing::debug!("Credited {} to user {}", amount, user_id);
    Ok(())
}

/// Atomically decrease a user's balance, refusing to underflow.
///
/// The update only applies when the current balance covers the amount.
pub async fn debit(pool: &SqlitePool, user_id: i64, amount: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users SET credits = credits - ? WHERE id = ? AND credits >= ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(amount)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let balance = get_credits(pool, user_id).await?;
        return Err(DatabaseError::InsufficientCredits {
            user_id,
            balance,
            needed: amount,
        });
    }

    tracing::debug!("Debited {} from user {}", amount, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{user, Database};

    async fn test_db_with_user(id: i64) -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        user::create_user(db.pool(), id, "Test", None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_credit_then_debit() {
        let db = test_db_with_user(1).await;

        credit(db.pool(), 1, 10).await.unwrap();
        assert_eq!(get_credits(db.pool(), 1).await.unwrap(), 10);

        debit(db.pool(), 1, 5).await.unwrap();
        assert_eq!(get_credits(db.pool(), 1).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_debit_refuses_underflow() {
        let db = test_db_with_user(1).await;

        credit(db.pool(), 1, 3).await.unwrap();
        let result = debit(db.pool(), 1, 5).await;
        assert!(matches!(
            result,
            Err(DatabaseError::InsufficientCredits {
                balance: 3,
                needed: 5,
                ..
            })
        ));

        // Balance untouched by the refused debit.
        assert_eq!(get_credits(db.pool(), 1).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_exact_balance_debit() {
        let db = test_db_with_user(1).await;

        credit(db.pool(), 1, 5).await.unwrap();
        debit(db.pool(), 1, 5).await.unwrap();
        assert_eq!(get_credits(db.pool(), 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_balance_never_negative() {
        let db = test_db_with_user(1).await;

        credit(db.pool(), 1, 7).await.unwrap();
        for _ in 0..5 {
            let _ = debit(db.pool(), 1, 5).await;
        }
        assert!(get_credits(db.pool(), 1).await.unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_ledger_missing_user() {
        let db = test_db_with_user(1).await;

        assert!(matches!(
            get_credits(db.pool(), 404).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            credit(db.pool(), 404, 5).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
