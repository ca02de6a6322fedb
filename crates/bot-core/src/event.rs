//! Transport-facing message types.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// An inbound event delivered by the chat transport.
///
/// Events are keyed by user id and chat id. For direct conversations the
/// two are usually equal; the distinction is kept because delivery is
/// addressed by chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Externally assigned numeric user id.
    pub user_id: i64,
    /// Chat to address replies to.
    pub chat_id: i64,
    /// Display name as reported by the transport.
    pub display_name: String,
    /// Optional handle (e.g. a username), informational only.
    pub handle: Option<String>,
    /// What the user actually did.
    pub payload: EventPayload,
}

/// The content of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// The user selected a lookup category from the menu.
    Select(Category),
    /// The user sent free text.
    Text(String),
}

impl InboundEvent {
    /// Create a free-text event for a direct conversation.
    pub fn text(user_id: i64, display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id: user_id,
            display_name: display_name.into(),
            handle: None,
            payload: EventPayload::Text(text.into()),
        }
    }

    /// Create a category-selection event for a direct conversation.
    pub fn select(user_id: i64, display_name: impl Into<String>, category: Category) -> Self {
        Self {
            user_id,
            chat_id: user_id,
            display_name: display_name.into(),
            handle: None,
            payload: EventPayload::Select(category),
        }
    }

    /// Set the handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// Outbound content accepted by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundContent {
    /// An inline text message.
    Text(String),
    /// A document attachment, used when a report exceeds the inline limit.
    Document {
        /// Suggested file name.
        file_name: String,
        /// Full document body.
        content: String,
    },
}

impl OutboundContent {
    /// Create an inline text message.
    pub fn text(text: impl Into<String>) -> Self {
        OutboundContent::Text(text.into())
    }

    /// Create a document attachment.
    pub fn document(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        OutboundContent::Document {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_event_addresses_user_chat() {
        let event = InboundEvent::text(7, "Bob", "hello");
        assert_eq!(event.chat_id, 7);
        assert_eq!(event.payload, EventPayload::Text("hello".to_string()));
    }

    #[test]
    fn test_with_handle() {
        let event = InboundEvent::select(7, "Bob", Category::IpAddress).with_handle("bob99");
        assert_eq!(event.handle.as_deref(), Some("bob99"));
    }
}
