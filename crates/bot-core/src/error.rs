//! Transport error types.

use thiserror::Error;

/// Errors that can occur while delivering outbound content.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport rejected or failed the delivery.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The recipient chat is unknown or unreachable.
    #[error("chat unreachable: {0}")]
    Unreachable(i64),
}
