//! Inbound event processing for the Lookout bot.
//!
//! This crate glues a chat transport to the search pipeline: it consumes
//! a stream of [`InboundEvent`]s, registers users on first contact, and
//! routes category selections, queries, and commands into the
//! orchestrator.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures::stream;
//! use message_listener::{
//!     Category, EventProcessor, InboundEvent, LoggingTransport, Orchestrator, SearchConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = database::Database::connect("sqlite::memory:").await?;
//! db.migrate().await?;
//!
//! let orchestrator = Arc::new(Orchestrator::new(
//!     db,
//!     Arc::new(lookup::HttpFetcher::new()),
//!     LoggingTransport,
//!     SearchConfig::from_env(),
//! ));
//!
//! let events = stream::iter(vec![
//!     InboundEvent::select(1, "Alice", Category::PostalCode),
//!     InboundEvent::text(1, "Alice", "110001"),
//! ]);
//!
//! EventProcessor::with_defaults(orchestrator).run(events).await?;
//! # Ok(())
//! # }
//! ```

mod processor;

pub use processor::{EventProcessor, ProcessResult, ProcessorConfig, ProcessorError};

/// Re-export commonly used types for convenience.
pub use bot_core::{
    Category, EventPayload, InboundEvent, LoggingTransport, NoOpTransport, OutboundContent,
    Transport,
};
pub use orchestrator::{Orchestrator, SearchConfig, SearchOutcome};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
