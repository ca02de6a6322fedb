//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account, identified by its externally assigned numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    /// Transport-assigned user id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Optional handle (username), informational only.
    pub handle: Option<String>,
    /// Prepaid credit balance. Never negative; mutated only through the
    /// ledger operations.
    pub credits: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// A completed search, logged once per attempt that reached rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SearchRecord {
    /// Auto-incrementing id; insertion order.
    pub id: i64,
    /// Owning user id.
    pub user_id: i64,
    /// The normalized query that was searched.
    pub query: String,
    /// Category tag (e.g. "postal-code").
    pub category: String,
    /// Truncated copy of the rendered report.
    pub snapshot: String,
    /// Creation timestamp.
    pub created_at: String,
}
