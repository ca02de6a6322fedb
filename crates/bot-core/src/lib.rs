//! Core types for the Lookout bot.
//!
//! This crate provides the shared vocabulary used across the Lookout
//! workspace:
//!
//! - [`Category`] - The closed set of lookup types a user can request
//! - [`InboundEvent`] / [`OutboundContent`] - Transport-facing message types
//! - [`Transport`] - The trait the chat platform adapter implements
//! - [`TransportError`] - Delivery failures
//!
//! # Example
//!
//! ```rust
//! use bot_core::{Category, InboundEvent};
//!
//! let event = InboundEvent::select(42, "Alice", Category::PostalCode);
//! assert_eq!(event.user_id, 42);
//! ```

mod category;
mod error;
mod event;
mod transport;

pub use category::Category;
pub use error::TransportError;
pub use event::{EventPayload, InboundEvent, OutboundContent};
pub use transport::{LoggingTransport, NoOpTransport, Transport};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
