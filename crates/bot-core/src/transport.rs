//! Transport trait and test implementations.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::event::OutboundContent;

/// Trait for delivering outbound content to a chat.
///
/// Abstracted to support different chat platforms (and tests). The core
/// never talks to a platform API directly; everything goes through this
/// seam.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver content to a chat.
    async fn send(&self, chat_id: i64, content: OutboundContent) -> Result<(), TransportError>;

    /// Deliver a plain text message (convenience wrapper).
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.send(chat_id, OutboundContent::text(text)).await
    }
}

/// A no-op transport for testing that discards all content.
#[derive(Debug, Clone, Default)]
pub struct NoOpTransport;

#[async_trait]
impl Transport for NoOpTransport {
    async fn send(&self, _chat_id: i64, _content: OutboundContent) -> Result<(), TransportError> {
        Ok(())
    }
}

/// A logging transport for debugging that logs all deliveries.
#[derive(Debug, Clone, Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    async fn send(&self, chat_id: i64, content: OutboundContent) -> Result<(), TransportError> {
        match content {
            OutboundContent::Text(text) => {
                tracing::info!("[chat {}] {}", chat_id, text);
            }
            OutboundContent::Document { file_name, content } => {
                tracing::info!(
                    "[chat {}] document {} ({} chars)",
                    chat_id,
                    file_name,
                    content.chars().count()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_transport() {
        let transport = NoOpTransport;

        // Should not error
        transport.send_text(1, "test").await.unwrap();
        transport
            .send(1, OutboundContent::document("a.txt", "body"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logging_transport() {
        let transport = LoggingTransport;

        transport.send_text(1, "test").await.unwrap();
        transport
            .send(2, OutboundContent::document("report.txt", "body"))
            .await
            .unwrap();
    }
}
