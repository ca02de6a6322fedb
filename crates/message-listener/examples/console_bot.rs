//! Console demo driving the Lookout pipeline without a chat platform.
//!
//! Reads lines from stdin and feeds them to the processor as events from
//! a single demo user:
//!
//!   select <category-tag>   choose a lookup type (e.g. `select ip-address`)
//!   /profile                show the demo user's profile
//!   anything else           free text (consumed by a pending request)
//!
//! Run with: cargo run -p message-listener --example console_bot
//!
//! Configuration via .env file or environment variables:
//!   LOOKOUT_DB        - SQLite URL (default: sqlite:lookout.db?mode=rwc)
//!   LOOKOUT_ADMIN_IDS - comma-separated privileged user ids

use std::env;
use std::sync::Arc;

use futures::StreamExt;
use message_listener::{
    Category, EventProcessor, InboundEvent, LoggingTransport, Orchestrator, ProcessorError,
    SearchConfig,
};
use tokio::io::AsyncBufReadExt;

const DEMO_USER: i64 = 1;

fn parse_line(line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(tag) = line.strip_prefix("select ") {
        return match Category::from_tag(tag.trim()) {
            Some(category) => Some(InboundEvent::select(DEMO_USER, "Console", category)),
            None => {
                println!("Unknown category: {}", tag.trim());
                println!("Categories: {}", category_tags().join(", "));
                None
            }
        };
    }

    Some(InboundEvent::text(DEMO_USER, "Console", line))
}

fn category_tags() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (searches current dir and parents)
    let _ = dotenvy::dotenv();

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let db_url =
        env::var("LOOKOUT_DB").unwrap_or_else(|_| "sqlite:lookout.db?mode=rwc".to_string());
    let db = database::Database::connect(&db_url).await?;
    db.migrate().await?;

    let orchestrator = Arc::new(Orchestrator::new(
        db,
        Arc::new(lookup::HttpFetcher::new()),
        LoggingTransport,
        SearchConfig::from_env(),
    ));
    let processor = EventProcessor::with_defaults(orchestrator);

    println!("Lookout console bot is running!");
    println!("Categories: {}", category_tags().join(", "));
    println!("Type `select <category-tag>`, then the query. Ctrl+D to exit.\n");

    let lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let events = futures::stream::unfold(lines, |mut lines| async {
        let line = lines.next_line().await.ok().flatten()?;
        Some((parse_line(&line), lines))
    })
    .filter_map(|event| async move { event });

    // End of stdin ends the demo; that is a normal exit here.
    match processor.run(events).await {
        Err(ProcessorError::StreamEnded) => Ok(()),
        Err(e) => Err(e.into()),
        Ok(()) => Ok(()),
    }
}
