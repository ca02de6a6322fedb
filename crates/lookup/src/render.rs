//! Category-aware report rendering.
//!
//! Each category owns a small label dictionary matched against the final
//! path segment of each normalized field. Postal-code and game-profile
//! lookups additionally restructure known nested shapes into blocks before
//! falling back to the mechanical field dump. Rendering never fails:
//! absent or malformed input degrades to a "no data" report.

use bot_core::Category;
use serde_json::{Map, Value};

use crate::normalize::flatten;

const NA: &str = "N/A";

const PHONE_LABELS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("cnic", "CNIC"),
    ("address", "Address"),
    ("district", "District"),
    ("state", "State"),
    ("operator", "Operator"),
    ("circle", "Circle"),
    ("type", "Type"),
];

const IP_LABELS: &[(&str, &str)] = &[
    ("country", "Country"),
    ("region", "Region"),
    ("city", "City"),
    ("timezone", "Timezone"),
    ("isp", "ISP"),
    ("org", "Organization"),
    ("as", "AS Number"),
    ("lat", "Latitude"),
    ("lon", "Longitude"),
];

const BANK_LABELS: &[(&str, &str)] = &[
    ("bank", "Bank Name"),
    ("branch", "Branch"),
    ("address", "Address"),
    ("city", "City"),
    ("district", "District"),
    ("state", "State"),
    ("contact", "Contact"),
    ("rtgs", "RTGS"),
    ("neft", "NEFT"),
    ("imps", "IMPS"),
];

const POST_OFFICE_FIELDS: &[(&str, &str)] = &[
    ("Name", "Name"),
    ("BranchType", "Branch Type"),
    ("DeliveryStatus", "Delivery Status"),
    ("District", "District"),
    ("State", "State"),
    ("Pincode", "PIN Code"),
];

const PROFILE_BASIC_FIELDS: &[(&str, &str)] = &[
    ("nickname", "Nickname"),
    ("accountId", "Account ID"),
    ("level", "Level"),
    ("rank", "Rank"),
    ("region", "Region"),
    ("lastLoginAt", "Last Login"),
];

/// Render a bounded report for a category from a parsed payload.
///
/// `query` is the normalized query echoed back in every report. The
/// output is always non-empty.
pub fn render(category: Category, payload: &Value, query: &str) -> String {
    match category {
        Category::PostalCode => render_postal(payload, query),
        Category::GameProfileId => render_game_profile(payload, query),
        _ => render_labeled(category, payload, query),
    }
}

fn header(title: &str) -> String {
    format!("{}\n{}", title, "=".repeat(title.chars().count()))
}

fn title_for(category: Category) -> &'static str {
    match category {
        Category::IndianPhone => "INDIAN PHONE INFO",
        Category::PakistaniPhone => "PAKISTANI PHONE INFO",
        Category::IpAddress => "IP ADDRESS INFO",
        Category::IfscBankCode => "BANK DETAILS",
        Category::GameProfileId => "GAME PROFILE INFO",
        Category::PostalCode => "POSTAL CODE DETAILS",
    }
}

fn query_label(category: Category) -> &'static str {
    match category {
        Category::IndianPhone | Category::PakistaniPhone => "Number",
        Category::IpAddress => "IP Address",
        Category::IfscBankCode => "IFSC Code",
        Category::GameProfileId => "Profile ID",
        Category::PostalCode => "PIN Code",
    }
}

fn label_for(category: Category, segment: &str) -> Option<&'static str> {
    let table: &[(&str, &str)] = match category {
        Category::IndianPhone | Category::PakistaniPhone => PHONE_LABELS,
        Category::IpAddress => IP_LABELS,
        Category::IfscBankCode => BANK_LABELS,
        _ => &[],
    };
    table
        .iter()
        .find(|(key, _)| segment.eq_ignore_ascii_case(key))
        .map(|(_, label)| *label)
}

/// Scalar display text; blank values become "N/A", containers render as
/// compact JSON.
fn display_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.is_empty() {
        NA.to_string()
    } else {
        text
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn push_flat_dump(lines: &mut Vec<String>, payload: &Value) {
    for (path, value) in flatten(payload) {
        lines.push(format!("{}: {}", path, display_value(&value)));
    }
}

/// Generic labeled renderer used by phone, IP, and bank lookups (and as
/// the fallback for anything else).
fn render_labeled(category: Category, payload: &Value, query: &str) -> String {
    let mut lines = vec![header(title_for(category)), String::new()];
    lines.push(format!("{}: {}", query_label(category), query));

    match payload {
        Value::Object(map) if !map.is_empty() => {
            for (path, value) in flatten(payload) {
                match label_for(category, last_segment(&path)) {
                    Some(label) => lines.push(format!("{}: {}", label, display_value(&value))),
                    None => lines.push(format!("{}: {}", path, display_value(&value))),
                }
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (idx, item) in items.iter().enumerate() {
                lines.push(format!("Result {}: {}", idx + 1, display_value(item)));
            }
        }
        Value::Null | Value::Object(_) | Value::Array(_) => {
            lines.push("No data found".to_string());
        }
        scalar => lines.push(format!("Data: {}", display_value(scalar))),
    }

    lines.join("\n")
}

/// Postal lookups return a single-element list wrapping a record whose
/// `PostOffice` array holds one sub-record per office.
fn render_postal(payload: &Value, query: &str) -> String {
    let mut lines = vec![header(title_for(Category::PostalCode)), String::new()];
    lines.push(format!("{}: {}", query_label(Category::PostalCode), query));

    let data = match payload {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };

    match data.get("PostOffice").and_then(Value::as_array) {
        Some(offices) if !offices.is_empty() => {
            for (idx, office) in offices.iter().enumerate() {
                lines.push(String::new());
                lines.push(format!("Post Office #{}", idx + 1));
                for (field, label) in POST_OFFICE_FIELDS {
                    let value = office.get(*field).unwrap_or(&Value::Null);
                    lines.push(format!("{}: {}", label, display_value(value)));
                }
            }
        }
        _ => match &data {
            Value::Object(map) if !map.is_empty() => {
                lines.push(String::new());
                push_flat_dump(&mut lines, &data);
            }
            _ => lines.push("No post office data available".to_string()),
        },
    }

    lines.join("\n")
}

fn section_field<'a>(obj: &'a Map<String, Value>, section: &str, field: &str) -> &'a Value {
    obj.get(section)
        .and_then(|s| s.get(field))
        .unwrap_or(&Value::Null)
}

/// Game-profile lookups return a record with well-known sections
/// (basicInfo, clanBasicInfo, ...) that are rendered as blocks.
fn render_game_profile(payload: &Value, query: &str) -> String {
    let mut lines = vec![header(title_for(Category::GameProfileId)), String::new()];
    lines.push(format!("{}: {}", query_label(Category::GameProfileId), query));

    let obj = match payload.as_object() {
        Some(obj) if !obj.is_empty() => obj,
        _ => {
            lines.push("No player data found".to_string());
            return lines.join("\n");
        }
    };

    const KNOWN_SECTIONS: [&str; 7] = [
        "basicInfo",
        "socialInfo",
        "clanBasicInfo",
        "captainBasicInfo",
        "diamondCostRes",
        "petInfo",
        "profileInfo",
    ];
    if !KNOWN_SECTIONS.iter().any(|key| obj.contains_key(*key)) {
        // Unfamiliar shape: dump the flattened fields instead.
        lines.push(String::new());
        push_flat_dump(&mut lines, payload);
        return lines.join("\n");
    }

    if obj.get("basicInfo").is_some_and(Value::is_object) {
        lines.push(String::new());
        lines.push("Basic Information".to_string());
        for (field, label) in PROFILE_BASIC_FIELDS {
            lines.push(format!(
                "{}: {}",
                label,
                display_value(section_field(obj, "basicInfo", field))
            ));
        }
    }

    if obj.get("socialInfo").is_some_and(Value::is_object) {
        lines.push(String::new());
        lines.push("Social Stats".to_string());
        lines.push(format!(
            "Likes Received: {}",
            display_value(section_field(obj, "socialInfo", "liked"))
        ));
    }

    lines.push(String::new());
    lines.push("Game Assets".to_string());
    lines.push(format!(
        "Diamonds: {}",
        display_value(section_field(obj, "diamondCostRes", "diamondCost"))
    ));
    lines.push(format!(
        "Pet ID: {}",
        display_value(section_field(obj, "petInfo", "id"))
    ));
    let skills = obj
        .get("profileInfo")
        .and_then(|p| p.get("equipedSkills"))
        .and_then(Value::as_array);
    let skills_text = match skills {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        _ => "None".to_string(),
    };
    lines.push(format!("Equipped Skills: {}", skills_text));

    let clan_name = section_field(obj, "clanBasicInfo", "clanName");
    if clan_name.as_str().is_some_and(|name| !name.trim().is_empty()) {
        lines.push(String::new());
        lines.push("Clan Information".to_string());
        lines.push(format!("Clan Name: {}", display_value(clan_name)));
        lines.push(format!(
            "Members: {}",
            display_value(section_field(obj, "clanBasicInfo", "memberNum"))
        ));
        let captain = section_field(obj, "captainBasicInfo", "nickname");
        if captain.as_str().is_some_and(|name| !name.trim().is_empty()) {
            lines.push(format!("Captain: {}", display_value(captain)));
        }
    }

    lines.join("\n")
}
