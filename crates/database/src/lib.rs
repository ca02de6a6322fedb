//! SQLite persistence layer for Lookout.
//!
//! This crate provides async database operations for user accounts, the
//! credit ledger, and search history using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{user, ledger, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:lookout.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a user and grant the welcome bonus
//!     user::create_user(db.pool(), 42, "Bob", None).await?;
//!     ledger::credit(db.pool(), 42, 10).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{SearchRecord, UserAccount};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Sized for many users advancing their search turns concurrently.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/lookout.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_account_lifecycle() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        // First contact creates the account, ledger grants the bonus
        let (account, created) = user::ensure_user(db.pool(), 42, "Bob", Some("bob"))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(account.credits, 0);
        ledger::credit(db.pool(), 42, 10).await.unwrap();

        // A paid search settles atomically
        history::finalize_search(db.pool(), 42, "8.8.8.8", "ip-address", "report", 5)
            .await
            .unwrap();
        assert_eq!(ledger::get_credits(db.pool(), 42).await.unwrap(), 5);
        assert_eq!(history::count_searches(db.pool()).await.unwrap(), 1);
    }
}
