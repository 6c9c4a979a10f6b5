//! Free-text address normalization.
//!
//! Reduces an address such as `"5/123 Smith Street, Brisbane QLD 4000"` to a
//! house-number + street-name core (`123-smith`) that survives differences in
//! unit notation, punctuation and locality suffixes. The heuristic is tuned
//! for Australian street addresses and returns `None` whenever it cannot find
//! both parts, rather than guessing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RE_STREET_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[a-z]?)$").unwrap());

/// Maximum number of words kept for the street name.
const MAX_STREET_NAME_TOKENS: usize = 4;

const UNIT_PREFIXES: &[&str] = &["unit", "apt", "suite", "flat", "level", "lvl", "u"];

const STREET_TYPES: &[&str] = &[
    "st", "street", "rd", "road", "ave", "av", "avenue", "dr", "drive", "ct", "court", "pl",
    "place", "cres", "crescent", "cl", "close", "pde", "parade", "tce", "terrace", "hwy",
    "highway", "blvd", "boulevard", "ln", "lane", "way", "cct", "circuit", "esp", "esplanade",
    "gr", "grove", "sq", "square",
];

const REGION_STOP_WORDS: &[&str] = &[
    "au", "aus", "australia", "qld", "nsw", "vic", "sa", "wa", "tas", "nt", "act",
];

/// Canonical fingerprint of a street address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCore {
    /// House number, possibly with a single letter suffix (`"12a"`).
    pub street_number: String,
    /// Street name words joined by a single space, without the street type.
    pub street_name: String,
    /// `"{number}-{name words joined by '-'}"`, used for equality checks.
    pub key: String,
}

/// Lowercases, replaces `.`, `,` and `#` with spaces, and collapses whitespace.
pub fn normalize_address_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '.' | ',' | '#') { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the number + street-name core from a free-text address.
///
/// Returns `None` when no usable street number is present or no street name
/// word follows it.
pub fn extract_address_core(text: &str) -> Option<AddressCore> {
    let normalized = normalize_address_text(text);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

    let (number_index, street_number) = find_street_number(&tokens)?;

    let mut name_tokens: Vec<&str> = Vec::new();
    for token in &tokens[number_index + 1..] {
        if name_tokens.len() >= MAX_STREET_NAME_TOKENS {
            break;
        }
        if starts_with_digit(token) || REGION_STOP_WORDS.contains(token) {
            break;
        }
        // "St Kilda Rd": a leading type word is part of the name.
        if STREET_TYPES.contains(token) && !name_tokens.is_empty() {
            break;
        }
        name_tokens.push(token);
    }

    if name_tokens.is_empty() {
        return None;
    }

    Some(AddressCore {
        key: format!("{}-{}", street_number, name_tokens.join("-")),
        street_name: name_tokens.join(" "),
        street_number,
    })
}

/// Renders a core back into address text that extracts to the same key.
pub fn format_address_core(core: &AddressCore) -> String {
    format!("{} {}", core.street_number, core.street_name)
}

fn find_street_number(tokens: &[&str]) -> Option<(usize, String)> {
    for (index, token) in tokens.iter().enumerate() {
        if UNIT_PREFIXES.contains(token) {
            continue;
        }
        // The token after a unit word is the unit number, whatever its shape.
        if index > 0 && UNIT_PREFIXES.contains(&tokens[index - 1]) {
            continue;
        }
        if let Some(number) = parse_street_number(token) {
            return Some((index, number));
        }
    }
    None
}

/// Parses `"45"`, `"45b"`, `"5/123"` (unit/number) and `"12-14"` (range).
fn parse_street_number(token: &str) -> Option<String> {
    let candidate = if let Some((_, number)) = token.rsplit_once('/') {
        number
    } else if let Some((number, _)) = token.split_once('-') {
        number
    } else {
        token
    };

    RE_STREET_NUMBER
        .captures(candidate)
        .map(|caps| caps[1].to_string())
}

fn starts_with_digit(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}
