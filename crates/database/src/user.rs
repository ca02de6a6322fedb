//! User account operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::UserAccount;

/// Create a new user account with a zero balance.
///
/// The welcome bonus is granted separately through the ledger so that the
/// balance is only ever mutated by ledger operations.
pub async fn create_user(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    handle: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, handle)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(handle)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists { entity: "User", id };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a user account by id.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<UserAccount> {
    sqlx::query_as::<_, UserAccount>(
        r#"
        SELECT id, name, handle, credits, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DatabaseError::NotFound { entity: "User", id })
}

/// Refresh the mutable identity fields of an existing user.
pub async fn update_identity(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    handle: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, handle = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(handle)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound { entity: "User", id });
    }

    Ok(())
}

/// Get an existing user, creating the account on first contact.
///
/// Returns the account and whether it was newly created.
pub async fn ensure_user(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    handle: Option<&str>,
) -> Result<(UserAccount, bool)> {
    match create_user(pool, id, name, handle).await {
        Ok(()) => Ok((get_user(pool, id).await?, true)),
        Err(DatabaseError::AlreadyExists { .. }) => {
            update_identity(pool, id, name, handle).await?;
            Ok((get_user(pool, id).await?, false))
        }
        Err(e) => Err(e),
    }
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;

        create_user(db.pool(), 7, "Alice", Some("alice99")).await.unwrap();
        let user = get_user(db.pool(), 7).await.unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.handle.as_deref(), Some("alice99"));
        assert_eq!(user.credits, 0);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let db = test_db().await;

        create_user(db.pool(), 7, "Alice", None).await.unwrap();
        let result = create_user(db.pool(), 7, "Alice", None).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_ensure_user_first_contact() {
        let db = test_db().await;

        let (user, created) = ensure_user(db.pool(), 7, "Alice", None).await.unwrap();
        assert!(created);
        assert_eq!(user.credits, 0);

        // Second contact refreshes identity and reports not-created.
        let (user, created) = ensure_user(db.pool(), 7, "Alicia", Some("ali")).await.unwrap();
        assert!(!created);
        assert_eq!(user.name, "Alicia");
        assert_eq!(user.handle.as_deref(), Some("ali"));
    }

    #[tokio::test]
    async fn test_count_users() {
        let db = test_db().await;

        assert_eq!(count_users(db.pool()).await.unwrap(), 0);
        create_user(db.pool(), 1, "A", None).await.unwrap();
        create_user(db.pool(), 2, "B", None).await.unwrap();
        assert_eq!(count_users(db.pool()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = test_db().await;

        let result = get_user(db.pool(), 404).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
