//! Helpers for keeping customer data out of logs and span attributes.
//!
//! Addresses are reduced to their street core (no unit, suburb or
//! postcode) before they are logged.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::address::extract_address_core;

/// Returns only the street-core key of an address, e.g. `123-smith`.
///
/// Text without a recognisable street number becomes `<unparsed>`.
pub fn redact_address(address: &str) -> String {
    extract_address_core(address)
        .map(|core| core.key)
        .unwrap_or_else(|| "<unparsed>".to_string())
}

/// Returns a short deterministic hash of `text` for correlation without
/// exposing the text itself.
pub fn hash_text(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
