//! The search pipeline.

use std::sync::Arc;

use bot_core::{Category, OutboundContent, Transport};
use database::{history, ledger, Database};
use lookup::fetcher::Fetch;
use lookup::normalize::parse_payload;
use lookup::render::render;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::pending::{PendingStore, UserLocks};

/// Notice sent while a search is in flight.
pub const SEARCHING_NOTICE: &str = "Searching...";

/// Notice sent when a query is empty after normalization.
pub const EMPTY_QUERY_NOTICE: &str = "Empty query. Please send something to search for.";

/// The credit-gated search pipeline.
///
/// One instance serves all users. A search attempt moves through a fixed
/// order: validate, balance check, fetch, normalize, render, deliver,
/// persist. An upstream miss is not a failure; the user always gets a
/// report and the attempt still settles. Each user's attempts are
/// serialized from the balance check through settlement so rapid messages
/// cannot double-spend a balance.
pub struct Orchestrator<T: Transport> {
    db: Database,
    fetcher: Arc<dyn Fetch>,
    transport: T,
    config: SearchConfig,
    pending: PendingStore,
    locks: UserLocks,
}

/// What a completed search attempt looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The category searched.
    pub category: Category,
    /// The normalized query.
    pub query: String,
    /// Credits actually debited (zero for privileged users).
    pub charged: i64,
    /// Rendered report length in characters.
    pub report_chars: usize,
    /// Whether the report fit the inline limit.
    pub delivered_inline: bool,
}

impl<T: Transport> Orchestrator<T> {
    /// Create a new orchestrator.
    pub fn new(db: Database, fetcher: Arc<dyn Fetch>, transport: T, config: SearchConfig) -> Self {
        Self {
            db,
            fetcher,
            transport,
            config,
            pending: PendingStore::new(),
            locks: UserLocks::new(),
        }
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Get a reference to the database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Get a reference to the pending-request store.
    pub fn pending(&self) -> &PendingStore {
        &self.pending
    }

    /// Record a pending request for a user and prompt for the query.
    ///
    /// A second selection before the query arrives overwrites the first.
    pub async fn select_category(
        &self,
        user_id: i64,
        chat_id: i64,
        category: Category,
    ) -> Result<(), SearchError> {
        self.pending.set(user_id, category).await;
        debug!("User {} selected {}", user_id, category);
        self.transport
            .send_text(chat_id, &format!("Send the query for {}", category.banner()))
            .await?;
        Ok(())
    }

    /// Consume the user's pending request and run the search with `text`
    /// as the query.
    ///
    /// Returns `Ok(None)` when the user has no pending request; the
    /// message belongs to some other conversation and nothing happens.
    /// The pending request is consumed even when the attempt is rejected.
    pub async fn handle_message(
        &self,
        user_id: i64,
        chat_id: i64,
        text: &str,
    ) -> Result<Option<SearchOutcome>, SearchError> {
        let Some(category) = self.pending.take(user_id).await else {
            return Ok(None);
        };
        self.run_search(user_id, chat_id, category, text)
            .await
            .map(Some)
    }

    async fn run_search(
        &self,
        user_id: i64,
        chat_id: i64,
        category: Category,
        raw_query: &str,
    ) -> Result<SearchOutcome, SearchError> {
        // Validating
        let query = category.normalize_query(raw_query);
        if query.is_empty() {
            self.notify(chat_id, EMPTY_QUERY_NOTICE).await;
            return Err(SearchError::EmptyQuery);
        }

        // One attempt per user at a time from here through settlement.
        let _guard = self.locks.acquire(user_id).await;

        // BalanceCheck
        let privileged = self.config.is_admin(user_id);
        let cost = if privileged { 0 } else { self.config.search_cost };
        if !privileged {
            let balance = ledger::get_credits(self.db.pool(), user_id).await?;
            if balance < self.config.search_cost {
                self.notify(chat_id, &insufficient_credits_notice(self.config.search_cost))
                    .await;
                return Err(SearchError::InsufficientCredits {
                    balance,
                    needed: self.config.search_cost,
                });
            }
        }

        self.notify(chat_id, SEARCHING_NOTICE).await;

        // Fetching: an upstream miss is not an error; the attempt
        // continues with an absent payload and still settles.
        let payload = match self.config.url_for(category, &query) {
            Some(url) => match self.fetcher.fetch(&url).await {
                Some(raw) => parse_payload(&raw),
                None => Value::Null,
            },
            None => {
                warn!("No endpoint configured for {}", category);
                Value::Null
            }
        };

        // Normalizing + Rendering
        let report = render(category, &payload, &query);
        let report_chars = report.chars().count();

        let delivered_inline = self.deliver(chat_id, category, &query, &report).await;

        // Persisting: debit and history append are one transaction.
        if let Err(e) = history::finalize_search(
            self.db.pool(),
            user_id,
            &query,
            category.as_str(),
            &report,
            cost,
        )
        .await
        {
            warn!("Failed to persist search for user {}: {}", user_id, e);
            self.notify(chat_id, &format!("Search failed: {}", e)).await;
            return Err(e.into());
        }

        info!(
            "Search completed for user {}: {} '{}' ({} chars, cost {})",
            user_id, category, query, report_chars, cost
        );
        Ok(SearchOutcome {
            category,
            query,
            charged: cost,
            report_chars,
            delivered_inline,
        })
    }

    /// Deliver a report inline or as a document, falling back to the
    /// alternate method on failure. Delivery problems are logged, never
    /// fatal to the attempt.
    async fn deliver(&self, chat_id: i64, category: Category, query: &str, report: &str) -> bool {
        let inline = report.chars().count() <= self.config.inline_limit;

        let primary = if inline {
            self.transport.send_text(chat_id, report).await
        } else {
            self.transport
                .send(chat_id, document_for(category, query, report))
                .await
        };

        if let Err(e) = primary {
            warn!(
                "Report delivery to chat {} failed: {}; trying alternate method",
                chat_id, e
            );
            let fallback = if inline {
                self.transport
                    .send(chat_id, document_for(category, query, report))
                    .await
            } else {
                self.transport.send_text(chat_id, report).await
            };
            if let Err(e) = fallback {
                warn!("Alternate delivery to chat {} failed: {}", chat_id, e);
            }
        }

        inline
    }

    /// Best-effort status message; failures are logged, never fatal.
    pub(crate) async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            warn!("Failed to notify chat {}: {}", chat_id, e);
        }
    }
}

/// User-visible rejection for an uncovered search cost.
pub fn insufficient_credits_notice(cost: i64) -> String {
    format!("Insufficient credits. Each search costs {} credits.", cost)
}

fn document_for(category: Category, query: &str, report: &str) -> OutboundContent {
    OutboundContent::document(format!("{}_{}_details.txt", category.as_str(), query), report)
}
