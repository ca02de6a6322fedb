//! Credit-gated search pipeline for Lookout.
//!
//! The orchestrator drives a single user's search attempt through its
//! fixed state order: validate the query, check the balance, fetch the
//! upstream payload, normalize and render it, deliver the report, and
//! settle credit and history in one step. Different users' attempts run
//! independently; one user's attempts are serialized.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bot_core::{Category, LoggingTransport};
//! use database::Database;
//! use lookup::HttpFetcher;
//! use orchestrator::{Orchestrator, SearchConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite:lookout.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let orchestrator = Orchestrator::new(
//!     db,
//!     Arc::new(HttpFetcher::new()),
//!     LoggingTransport,
//!     SearchConfig::from_env(),
//! );
//!
//! orchestrator.select_category(42, 42, Category::PostalCode).await?;
//! orchestrator.handle_message(42, 42, "110001").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod orchestrator;
mod pending;
mod profile;

// Public exports
pub use config::SearchConfig;
pub use error::SearchError;
pub use orchestrator::{Orchestrator, SearchOutcome, EMPTY_QUERY_NOTICE, SEARCHING_NOTICE};
pub use pending::PendingStore;
pub use profile::SystemStats;

// Re-export commonly used types from dependencies
pub use bot_core::{Category, Transport};
pub use lookup::{Fetch, HttpFetcher};
