//! Search pipeline configuration.
//!
//! All ambient policy lives in one explicit object handed to the
//! orchestrator at construction: the admin allow-list, the per-category
//! upstream URL templates, and the credit constants.

use std::collections::{HashMap, HashSet};
use std::env;

use bot_core::Category;
use lookup::fetcher::encode_query;

/// Configuration for the search pipeline.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Privileged user ids exempt from the balance check.
    pub admin_ids: HashSet<i64>,
    /// Credits debited per completed search.
    pub search_cost: i64,
    /// Credits granted on first contact.
    pub welcome_bonus: i64,
    /// Upstream URL template per category; `{}` is replaced with the
    /// percent-encoded normalized query.
    pub endpoints: HashMap<Category, String>,
    /// Reports longer than this (in characters) are delivered as a
    /// document instead of inline text.
    pub inline_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            admin_ids: HashSet::new(),
            search_cost: 5,
            welcome_bonus: 10,
            endpoints: default_endpoints(),
            inline_limit: 4096,
        }
    }
}

fn default_endpoints() -> HashMap<Category, String> {
    let mut endpoints = HashMap::new();
    endpoints.insert(
        Category::IndianPhone,
        "https://private-9e6q.onrender.com/search/?q={}".to_string(),
    );
    endpoints.insert(
        Category::PakistaniPhone,
        "https://allnetworkdata.com/?number={}".to_string(),
    );
    endpoints.insert(
        Category::IpAddress,
        "https://ip-info.bjcoderx.workers.dev/?ip={}".to_string(),
    );
    endpoints.insert(
        Category::IfscBankCode,
        "https://ifsc.razorpay.com/{}".to_string(),
    );
    endpoints.insert(
        Category::GameProfileId,
        "http://raw.thug4ff.com/info?uid={}".to_string(),
    );
    endpoints.insert(
        Category::PostalCode,
        "https://pincode-info-j4tnx.vercel.app/pincode={}".to_string(),
    );
    endpoints
}

impl SearchConfig {
    /// Build a config from environment variables, falling back to
    /// defaults.
    ///
    /// - `LOOKOUT_ADMIN_IDS` - comma-separated privileged user ids
    /// - `LOOKOUT_SEARCH_COST` - credits per search
    /// - `LOOKOUT_WELCOME_BONUS` - credits granted on first contact
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var("LOOKOUT_ADMIN_IDS") {
            config.admin_ids = raw
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect();
        }
        if let Some(cost) = env::var("LOOKOUT_SEARCH_COST")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.search_cost = cost;
        }
        if let Some(bonus) = env::var("LOOKOUT_WELCOME_BONUS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.welcome_bonus = bonus;
        }

        config
    }

    /// Whether a user is on the admin allow-list.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Build the upstream URL for a category and normalized query.
    pub fn url_for(&self, category: Category, query: &str) -> Option<String> {
        self.endpoints
            .get(&category)
            .map(|template| template.replace("{}", &encode_query(query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_every_category() {
        let config = SearchConfig::default();
        for category in Category::ALL {
            assert!(
                config.url_for(category, "q").is_some(),
                "missing endpoint for {}",
                category
            );
        }
    }

    #[test]
    fn test_url_substitution_encodes_query() {
        let config = SearchConfig::default();
        let url = config.url_for(Category::IfscBankCode, "SBIN 001").unwrap();
        assert_eq!(url, "https://ifsc.razorpay.com/SBIN%20001");
    }

    #[test]
    fn test_admin_membership() {
        let mut config = SearchConfig::default();
        config.admin_ids.insert(99);
        assert!(config.is_admin(99));
        assert!(!config.is_admin(7));
    }
}
