//! Event processor that connects a chat transport to the search pipeline.

use std::sync::Arc;
use std::time::Duration;

use bot_core::{Category, EventPayload, InboundEvent, Transport};
use futures::{Stream, StreamExt};
use orchestrator::{Orchestrator, SearchError, SearchOutcome};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Default timeout for one search turn (fetch retries included).
const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the event processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// The bot's own user id (to ignore events from self).
    pub self_user_id: Option<i64>,

    /// Whether first-contact users receive a welcome notice.
    pub welcome_new_users: bool,

    /// Timeout for a single search turn. If the pipeline takes longer
    /// than this, the turn is abandoned and an error returned.
    /// Default: 60 seconds.
    pub search_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            self_user_id: None,
            welcome_new_users: true,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

impl ProcessorConfig {
    /// Create a new config with the bot's own user id.
    pub fn with_self_id(self_user_id: i64) -> Self {
        Self {
            self_user_id: Some(self_user_id),
            ..Default::default()
        }
    }
}

/// Errors that can occur during event processing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Error from the search pipeline.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// A search turn timed out.
    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    /// The event stream ended unexpectedly.
    #[error("event stream ended")]
    StreamEnded,
}

/// Result of processing a single event.
#[derive(Debug)]
pub enum ProcessResult {
    /// A search ran to completion.
    Completed {
        user_id: i64,
        outcome: SearchOutcome,
    },
    /// The event was answered without running a search.
    Replied { user_id: i64 },
    /// The event was skipped (e.g., from self, or no pending request).
    Skipped { reason: String },
    /// Error occurred during processing.
    Error(ProcessorError),
}

/// Recognized slash commands.
///
/// Commands are checked before a pending request is consumed, so sending
/// `/profile` mid-search does not eat the query prompt. Unknown slash
/// text is treated as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Profile,
    Stats,
    Grant { target: i64, amount: i64 },
}

impl Command {
    fn parse(text: &str) -> Option<Command> {
        let mut parts = text.split_whitespace();
        match parts.next()? {
            "/profile" | "/me" => Some(Command::Profile),
            "/stats" => Some(Command::Stats),
            "/grant" => {
                let target = parts.next()?.parse().ok()?;
                let amount = parts.next()?.parse().ok()?;
                Some(Command::Grant { target, amount })
            }
            _ => None,
        }
    }
}

/// An event processor that receives transport events and drives the
/// search pipeline.
pub struct EventProcessor<T: Transport> {
    orchestrator: Arc<Orchestrator<T>>,
    config: ProcessorConfig,
}

impl<T: Transport> EventProcessor<T> {
    /// Create a new event processor.
    pub fn new(orchestrator: Arc<Orchestrator<T>>, config: ProcessorConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Create a processor with default configuration.
    pub fn with_defaults(orchestrator: Arc<Orchestrator<T>>) -> Self {
        Self::new(orchestrator, ProcessorConfig::default())
    }

    /// Get a reference to the orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator<T> {
        &self.orchestrator
    }

    /// Check if we should process this event.
    fn should_process(&self, event: &InboundEvent) -> Result<(), String> {
        if self.config.self_user_id == Some(event.user_id) {
            return Err("event from self".to_string());
        }

        if let EventPayload::Text(text) = &event.payload {
            if text.trim().is_empty() {
                return Err("empty text".to_string());
            }
        }

        Ok(())
    }

    /// Process a single event and return the result.
    pub async fn process_event(&self, event: &InboundEvent) -> ProcessResult {
        if let Err(reason) = self.should_process(event) {
            debug!("Skipping event: {}", reason);
            return ProcessResult::Skipped { reason };
        }

        // Every event refreshes the account; first contact creates it.
        match self
            .orchestrator
            .register_user(event.user_id, &event.display_name, event.handle.as_deref())
            .await
        {
            Ok((account, true)) if self.config.welcome_new_users => {
                let notice = format!(
                    "Welcome, {}! You have {} credits. Each search costs {}.",
                    account.name,
                    account.credits,
                    self.orchestrator.config().search_cost
                );
                if let Err(e) = self
                    .orchestrator
                    .transport()
                    .send_text(event.chat_id, &notice)
                    .await
                {
                    warn!("Failed to send welcome to {}: {}", event.user_id, e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to register user {}: {}", event.user_id, e);
                return ProcessResult::Error(e.into());
            }
        }

        match &event.payload {
            EventPayload::Select(category) => self.handle_selection(event, *category).await,
            EventPayload::Text(text) => self.handle_text(event, text).await,
        }
    }

    async fn handle_selection(&self, event: &InboundEvent, category: Category) -> ProcessResult {
        match self
            .orchestrator
            .select_category(event.user_id, event.chat_id, category)
            .await
        {
            Ok(()) => ProcessResult::Replied {
                user_id: event.user_id,
            },
            Err(e) => ProcessResult::Error(e.into()),
        }
    }

    async fn handle_text(&self, event: &InboundEvent, text: &str) -> ProcessResult {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(event, command).await;
        }

        let turn = timeout(
            self.config.search_timeout,
            self.orchestrator
                .handle_message(event.user_id, event.chat_id, text),
        )
        .await;

        match turn {
            Ok(Ok(Some(outcome))) => {
                info!(
                    "Completed {} search for user {}",
                    outcome.category, event.user_id
                );
                ProcessResult::Completed {
                    user_id: event.user_id,
                    outcome,
                }
            }
            Ok(Ok(None)) => ProcessResult::Skipped {
                reason: "no pending request".to_string(),
            },
            Ok(Err(e)) => {
                warn!("Search failed for user {}: {}", event.user_id, e);
                ProcessResult::Error(e.into())
            }
            Err(_elapsed) => {
                error!(
                    "Search turn timed out for user {} after {:?}",
                    event.user_id, self.config.search_timeout
                );
                ProcessResult::Error(ProcessorError::Timeout(self.config.search_timeout))
            }
        }
    }

    async fn handle_command(&self, event: &InboundEvent, command: Command) -> ProcessResult {
        let reply = match command {
            Command::Profile => self.orchestrator.profile_summary(event.user_id).await,
            Command::Stats => self
                .orchestrator
                .system_stats(event.user_id)
                .await
                .map(|stats| format!("Users: {}\nSearches: {}", stats.users, stats.searches)),
            Command::Grant { target, amount } => self
                .orchestrator
                .grant_credits(event.user_id, target, amount)
                .await
                .map(|balance| {
                    format!(
                        "Granted {} credits to user {} (balance now {})",
                        amount, target, balance
                    )
                }),
        };

        let text = match reply {
            Ok(text) => text,
            Err(SearchError::NotAuthorized) => "Not authorized.".to_string(),
            Err(e) => {
                warn!("Command failed for user {}: {}", event.user_id, e);
                return ProcessResult::Error(e.into());
            }
        };

        if let Err(e) = self
            .orchestrator
            .transport()
            .send_text(event.chat_id, &text)
            .await
        {
            warn!("Failed to reply to {}: {}", event.user_id, e);
        }
        ProcessResult::Replied {
            user_id: event.user_id,
        }
    }

    /// Run the processor, handling events until the stream ends.
    ///
    /// This method consumes self and runs indefinitely.
    pub async fn run<S>(self, events: S) -> Result<(), ProcessorError>
    where
        S: Stream<Item = InboundEvent> + Send,
    {
        info!("Starting event processor");

        tokio::pin!(events);

        while let Some(event) = events.next().await {
            match self.process_event(&event).await {
                ProcessResult::Completed { user_id, outcome } => {
                    debug!("Completed {} for user {}", outcome.category, user_id);
                }
                ProcessResult::Replied { .. } => {}
                ProcessResult::Skipped { reason } => {
                    debug!("Skipped: {}", reason);
                }
                ProcessResult::Error(e) => {
                    // Log but continue processing
                    warn!("Error processing event: {}", e);
                }
            }
        }

        warn!("Event stream ended");
        Err(ProcessorError::StreamEnded)
    }

    /// Run the processor with graceful shutdown support.
    ///
    /// This method runs until either:
    /// - The provided shutdown signal completes
    /// - The event stream ends
    pub async fn run_with_shutdown<S, F>(
        self,
        events: S,
        shutdown_signal: F,
    ) -> Result<(), ProcessorError>
    where
        S: Stream<Item = InboundEvent> + Send,
        F: std::future::Future<Output = ()> + Send,
    {
        info!("Starting event processor (graceful shutdown enabled)");

        tokio::pin!(events);
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                // Check for shutdown signal first
                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping event processor");
                    return Ok(());
                }

                event = events.next() => {
                    match event {
                        Some(event) => {
                            match self.process_event(&event).await {
                                ProcessResult::Completed { user_id, outcome } => {
                                    debug!("Completed {} for user {}", outcome.category, user_id);
                                }
                                ProcessResult::Replied { .. } => {}
                                ProcessResult::Skipped { reason } => {
                                    debug!("Skipped: {}", reason);
                                }
                                ProcessResult::Error(e) => {
                                    warn!("Error processing event: {}", e);
                                }
                            }
                        }
                        None => {
                            warn!("Event stream ended");
                            return Err(ProcessorError::StreamEnded);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_core::{async_trait, NoOpTransport};
    use database::{history, ledger, Database};
    use futures::stream;
    use lookup::fetcher::Fetch;
    use orchestrator::SearchConfig;

    struct StaticFetcher(Option<String>);

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Option<String> {
            self.0.clone()
        }
    }

    async fn test_processor(
        config: ProcessorConfig,
    ) -> (EventProcessor<NoOpTransport>, Database) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let orchestrator = Arc::new(Orchestrator::new(
            db.clone(),
            Arc::new(StaticFetcher(Some(r#"{"country": "Germany"}"#.to_string()))),
            NoOpTransport,
            SearchConfig::default(),
        ));
        (EventProcessor::new(orchestrator, config), db)
    }

    #[test]
    fn test_config_with_self_id() {
        let config = ProcessorConfig::with_self_id(1000);
        assert_eq!(config.self_user_id, Some(1000));
        assert!(config.welcome_new_users);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/profile"), Some(Command::Profile));
        assert_eq!(Command::parse("/me"), Some(Command::Profile));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
        assert_eq!(
            Command::parse("/grant 7 50"),
            Some(Command::Grant {
                target: 7,
                amount: 50
            })
        );
        // Malformed or unknown slash text is plain text.
        assert_eq!(Command::parse("/grant seven"), None);
        assert_eq!(Command::parse("/plans"), None);
        assert_eq!(Command::parse("8.8.8.8"), None);
    }

    #[tokio::test]
    async fn test_event_from_self_is_skipped() {
        let (processor, db) = test_processor(ProcessorConfig::with_self_id(1000)).await;

        let event = InboundEvent::text(1000, "Bot", "hello");
        let result = processor.process_event(&event).await;
        assert!(matches!(result, ProcessResult::Skipped { .. }));

        // Not even registered.
        assert_eq!(database::user::count_users(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_selection_then_query_completes_search() {
        let (processor, db) = test_processor(ProcessorConfig::default()).await;

        let select = InboundEvent::select(1, "Alice", Category::IpAddress);
        assert!(matches!(
            processor.process_event(&select).await,
            ProcessResult::Replied { .. }
        ));

        let query = InboundEvent::text(1, "Alice", "8.8.8.8");
        match processor.process_event(&query).await {
            ProcessResult::Completed { user_id, outcome } => {
                assert_eq!(user_id, 1);
                assert_eq!(outcome.category, Category::IpAddress);
            }
            other => panic!("expected completion, got {:?}", other),
        }

        // Welcome bonus minus one paid search.
        assert_eq!(ledger::get_credits(db.pool(), 1).await.unwrap(), 5);
        assert_eq!(history::count_searches_for(db.pool(), 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_text_without_pending_request_is_skipped() {
        let (processor, _db) = test_processor(ProcessorConfig::default()).await;

        let event = InboundEvent::text(1, "Alice", "just chatting");
        let result = processor.process_event(&event).await;
        assert!(matches!(result, ProcessResult::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_profile_command_replies_without_consuming_pending() {
        let (processor, _db) = test_processor(ProcessorConfig::default()).await;

        let select = InboundEvent::select(1, "Alice", Category::IpAddress);
        processor.process_event(&select).await;

        let command = InboundEvent::text(1, "Alice", "/profile");
        assert!(matches!(
            processor.process_event(&command).await,
            ProcessResult::Replied { .. }
        ));

        // The pending request survived the command and still consumes the
        // next free text.
        let query = InboundEvent::text(1, "Alice", "8.8.8.8");
        assert!(matches!(
            processor.process_event(&query).await,
            ProcessResult::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn test_grant_rejected_for_regular_user() {
        let (processor, db) = test_processor(ProcessorConfig::default()).await;

        processor
            .process_event(&InboundEvent::text(1, "Alice", "/grant 2 100"))
            .await;

        // Replied with a rejection; no credits moved.
        assert_eq!(ledger::get_credits(db.pool(), 1).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_run_drains_stream() {
        let (processor, db) = test_processor(ProcessorConfig::default()).await;

        let events = stream::iter(vec![
            InboundEvent::select(1, "Alice", Category::IpAddress),
            InboundEvent::text(1, "Alice", "8.8.8.8"),
        ]);

        let result = processor.run(events).await;
        assert!(matches!(result, Err(ProcessorError::StreamEnded)));
        assert_eq!(history::count_searches_for(db.pool(), 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_with_shutdown_stops_cleanly() {
        let (processor, _db) = test_processor(ProcessorConfig::default()).await;

        let events = stream::pending::<InboundEvent>();
        let result = processor
            .run_with_shutdown(events, futures::future::ready(()))
            .await;
        assert!(result.is_ok());
    }
}
