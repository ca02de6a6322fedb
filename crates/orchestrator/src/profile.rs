//! Account, profile, and administrative operations.

use bot_core::Transport;
use database::{history, ledger, user, UserAccount};
use tracing::info;

use crate::error::SearchError;
use crate::orchestrator::Orchestrator;

/// How many history entries a profile summary shows.
const RECENT_LIMIT: i64 = 5;

/// Platform totals shown to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemStats {
    /// Total registered users.
    pub users: i64,
    /// Total completed searches.
    pub searches: i64,
}

impl<T: Transport> Orchestrator<T> {
    /// Get or create the account for an inbound user.
    ///
    /// First contact creates the account and grants the welcome bonus
    /// through the ledger; later contacts refresh the name and handle.
    /// Returns the account and whether it was newly created.
    pub async fn register_user(
        &self,
        user_id: i64,
        name: &str,
        handle: Option<&str>,
    ) -> Result<(UserAccount, bool), SearchError> {
        let pool = self.database().pool();
        let (account, created) = user::ensure_user(pool, user_id, name, handle).await?;

        if created && self.config().welcome_bonus > 0 {
            ledger::credit(pool, user_id, self.config().welcome_bonus).await?;
            info!(
                "Registered user {} with {} welcome credits",
                user_id,
                self.config().welcome_bonus
            );
            return Ok((user::get_user(pool, user_id).await?, true));
        }

        Ok((account, created))
    }

    /// Build the profile text for a user: identity, balance, and the most
    /// recent searches.
    pub async fn profile_summary(&self, user_id: i64) -> Result<String, SearchError> {
        let pool = self.database().pool();
        let account = user::get_user(pool, user_id).await?;
        let total = history::count_searches_for(pool, user_id).await?;
        let recent = history::recent_searches(pool, user_id, RECENT_LIMIT).await?;

        let mut lines = vec![format!("User #{} - {}", account.id, account.name)];
        if let Some(handle) = &account.handle {
            lines.push(format!("Handle: @{}", handle));
        }
        lines.push(format!("Credits: {}", account.credits));
        lines.push(format!("Total searches: {}", total));

        if !recent.is_empty() {
            lines.push(String::new());
            lines.push("Recent searches:".to_string());
            for record in &recent {
                lines.push(format!("- [{}] {}", record.category, preview(&record.query)));
            }
        }

        Ok(lines.join("\n"))
    }

    /// Administrative credit grant to a target user.
    ///
    /// Returns the target's new balance. Rejected for callers outside the
    /// admin allow-list.
    pub async fn grant_credits(
        &self,
        admin_id: i64,
        target_id: i64,
        amount: i64,
    ) -> Result<i64, SearchError> {
        if !self.config().is_admin(admin_id) {
            return Err(SearchError::NotAuthorized);
        }

        let pool = self.database().pool();
        ledger::credit(pool, target_id, amount).await?;
        let balance = ledger::get_credits(pool, target_id).await?;
        info!(
            "Admin {} granted {} credits to user {} (balance now {})",
            admin_id, amount, target_id, balance
        );
        Ok(balance)
    }

    /// Platform totals. Rejected for callers outside the admin allow-list.
    pub async fn system_stats(&self, admin_id: i64) -> Result<SystemStats, SearchError> {
        if !self.config().is_admin(admin_id) {
            return Err(SearchError::NotAuthorized);
        }

        let pool = self.database().pool();
        Ok(SystemStats {
            users: user::count_users(pool).await?,
            searches: history::count_searches(pool).await?,
        })
    }
}

fn preview(query: &str) -> String {
    const MAX: usize = 20;
    if query.chars().count() > MAX {
        let short: String = query.chars().take(MAX).collect();
        format!("{}...", short)
    } else {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_queries() {
        let long = "a".repeat(30);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(20)));
        assert_eq!(preview("short"), "short");
    }
}
