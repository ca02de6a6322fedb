//! Best-effort HTTP fetch against upstream data APIs.
//!
//! Upstream sources are third-party services outside our control; a fetch
//! either yields a non-blank body or it yields nothing. Transport errors,
//! non-success statuses, and blank bodies are all the same outcome to the
//! caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Maximum attempts per fetch.
const MAX_ATTEMPTS: u32 = 3;

/// Per-attempt timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Trait for fetching an upstream URL.
///
/// Abstracted so the orchestrator can be driven by scripted payloads in
/// tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch `url`, returning the body text or `None` when no usable data
    /// could be obtained.
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// HTTP fetcher with bounded retries.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new fetcher.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; LookoutBot/1.0)")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Attempt the request up to three times. An attempt succeeds only when
    /// the status is a success and the body is non-blank; everything else
    /// is retried silently.
    async fn fetch(&self, url: &str) -> Option<String> {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.text().await {
                        Ok(body) if !body.trim().is_empty() => {
                            debug!("Fetched {} ({} bytes)", url, body.len());
                            return Some(body);
                        }
                        Ok(_) => debug!("Attempt {}/{}: blank body", attempt, MAX_ATTEMPTS),
                        Err(e) => debug!("Attempt {}/{}: body read failed: {}", attempt, MAX_ATTEMPTS, e),
                    }
                }
                Ok(response) => {
                    debug!(
                        "Attempt {}/{}: status {} from {}",
                        attempt,
                        MAX_ATTEMPTS,
                        response.status(),
                        url
                    );
                }
                Err(e) => debug!("Attempt {}/{}: {}", attempt, MAX_ATTEMPTS, e),
            }
        }

        warn!("No data from {} after {} attempts", url, MAX_ATTEMPTS);
        None
    }
}

/// Percent-encode a query value for substitution into a URL template.
// Inline encoding to avoid adding another dependency
pub fn encode_query(input: &str) -> String {
    let mut result = String::new();
    for c in input.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => {
                result.push(c);
            }
            _ => {
                for byte in c.to_string().as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}
