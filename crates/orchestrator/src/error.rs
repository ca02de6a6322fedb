//! Error types for the search pipeline.

use bot_core::TransportError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can terminate a search attempt or an account operation.
///
/// `EmptyQuery` and `InsufficientCredits` are user-visible rejections with
/// no side effects. Upstream misses are not errors at all; they degrade to
/// a "no data" report inside the pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was empty after category normalization.
    #[error("empty query")]
    EmptyQuery,

    /// The user's balance does not cover the search cost.
    #[error("insufficient credits: have {balance}, need {needed}")]
    InsufficientCredits { balance: i64, needed: i64 },

    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// A required delivery failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The operation requires a privileged account.
    #[error("not authorized")]
    NotAuthorized,
}
