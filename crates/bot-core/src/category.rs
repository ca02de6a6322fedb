//! Lookup categories.

use serde::{Deserialize, Serialize};

/// The closed set of lookup types a user can request.
///
/// Each category maps 1:1 to an upstream URL template (held in the
/// orchestrator's configuration), a display banner, and a renderer label
/// dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    IndianPhone,
    PakistaniPhone,
    IpAddress,
    IfscBankCode,
    GameProfileId,
    PostalCode,
}

impl Category {
    /// All categories, in menu order.
    pub const ALL: [Category; 6] = [
        Category::IndianPhone,
        Category::PakistaniPhone,
        Category::IpAddress,
        Category::IfscBankCode,
        Category::GameProfileId,
        Category::PostalCode,
    ];

    /// Stable tag used in history rows, config keys, and selection events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::IndianPhone => "indian-phone",
            Category::PakistaniPhone => "pakistani-phone",
            Category::IpAddress => "ip-address",
            Category::IfscBankCode => "ifsc-bank-code",
            Category::GameProfileId => "game-profile-id",
            Category::PostalCode => "postal-code",
        }
    }

    /// Parse a category from its stable tag.
    pub fn from_tag(tag: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == tag)
    }

    /// Display banner shown in prompts and report headers.
    pub fn banner(&self) -> &'static str {
        match self {
            Category::IndianPhone => "Indian Phone",
            Category::PakistaniPhone => "Pakistan Phone",
            Category::IpAddress => "IP Address",
            Category::IfscBankCode => "IFSC Code",
            Category::GameProfileId => "Game Profile",
            Category::PostalCode => "Postal Code",
        }
    }

    /// Normalize a raw user query for this category.
    ///
    /// Indian phone numbers lose one leading `+`, a leading `91` country
    /// code, or leading zeros. Pakistani phone numbers keep ASCII digits
    /// only. Every other category is trimmed as-is.
    ///
    /// An empty result means the query is unusable and the search attempt
    /// must be rejected before any balance or history effects.
    pub fn normalize_query(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            Category::IndianPhone => {
                let bare = trimmed.strip_prefix('+').unwrap_or(trimmed);
                if let Some(rest) = bare.strip_prefix("91") {
                    rest.to_string()
                } else if trimmed.starts_with('0') {
                    trimmed.trim_start_matches('0').to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Category::PakistaniPhone => {
                trimmed.chars().filter(|c| c.is_ascii_digit()).collect()
            }
            _ => trimmed.to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_tag(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_tag("nope"), None);
    }

    #[test]
    fn test_indian_phone_normalization() {
        let cat = Category::IndianPhone;
        assert_eq!(cat.normalize_query("+919876543210"), "9876543210");
        assert_eq!(cat.normalize_query("919876543210"), "9876543210");
        assert_eq!(cat.normalize_query("0098"), "98");
        assert_eq!(cat.normalize_query("  9876543210  "), "9876543210");
        // only one prefix layer is stripped
        assert_eq!(cat.normalize_query("+91098"), "098");
        // no country code, no leading zeros: untouched
        assert_eq!(cat.normalize_query("8765432109"), "8765432109");
    }

    #[test]
    fn test_pakistani_phone_keeps_digits() {
        let cat = Category::PakistaniPhone;
        assert_eq!(cat.normalize_query("+92 300-1234567"), "923001234567");
        assert_eq!(cat.normalize_query("abc"), "");
    }

    #[test]
    fn test_other_categories_trim_only() {
        assert_eq!(Category::IpAddress.normalize_query(" 8.8.8.8 "), "8.8.8.8");
        assert_eq!(Category::PostalCode.normalize_query("110001"), "110001");
    }

    #[test]
    fn test_empty_after_normalization() {
        assert_eq!(Category::IndianPhone.normalize_query("+91"), "");
        assert_eq!(Category::IndianPhone.normalize_query("000"), "");
        assert_eq!(Category::PakistaniPhone.normalize_query("---"), "");
    }
}
