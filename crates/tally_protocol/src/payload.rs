//! Scan payload codec: the JSON envelope carried inside a label.
//!
//! Decoding is a total function over strings. Structured content is tried
//! first; anything unparseable degrades to the literal-SKU fallback; empty
//! input decodes to `None`. No path panics or returns an error.

use crate::defaults::{MAX_PAYLOAD_CHARS, PAYLOAD_TAG};
use crate::types::InventoryItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Payload codec errors (encoding side only; decoding never fails).
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to serialize identity payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ============================================================================
// Envelope
// ============================================================================

/// The full envelope written into a generated label.
///
/// `id` is omitted from the wire (not null) when the item has not been
/// registered with the store yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityPayload {
    #[serde(rename = "type")]
    pub tag: String,
    pub sku: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl IdentityPayload {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            tag: PAYLOAD_TAG.to_string(),
            sku: sku.into(),
            name: name.into(),
            price,
            id: None,
            timestamp,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn for_item(item: &InventoryItem, timestamp: DateTime<Utc>) -> Self {
        Self::new(item.sku.as_str(), item.name.as_str(), item.price, timestamp)
            .with_id(item.id.as_str())
    }
}

/// Identity recovered from scanned content.
///
/// Only `sku` is guaranteed; the rest is present for structured envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedIdentity {
    pub sku: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub id: Option<String>,
}

impl DecodedIdentity {
    /// A bare-SKU identity, as produced by the literal fallback.
    pub fn bare(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: None,
            price: None,
            id: None,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Serialize an envelope to canonical JSON text.
pub fn encode_payload(payload: &IdentityPayload) -> Result<String, PayloadError> {
    Ok(serde_json::to_string(payload)?)
}

/// Encode a store item, stamped with the current time.
pub fn encode(item: &InventoryItem) -> Result<String, PayloadError> {
    encode_at(item, Utc::now())
}

/// Encode a store item with an explicit timestamp.
pub fn encode_at(item: &InventoryItem, timestamp: DateTime<Utc>) -> Result<String, PayloadError> {
    encode_payload(&IdentityPayload::for_item(item, timestamp))
}

// ============================================================================
// Decoding - ordered strategy chain, first decisive strategy wins
// ============================================================================

/// Outcome of a single parse strategy.
enum Parsed {
    /// Strategy reached a verdict, possibly "recognized but not ours".
    Decided(Option<DecodedIdentity>),
    /// Strategy does not apply; try the next one.
    Pass,
}

const STRATEGIES: &[fn(&str) -> Parsed] = &[parse_envelope, parse_literal_sku];

/// Decode scanned content into an identity.
///
/// Empty or whitespace-only content decodes to `None`. Never panics.
pub fn decode(content: &str) -> Option<DecodedIdentity> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    for strategy in STRATEGIES {
        if let Parsed::Decided(identity) = strategy(trimmed) {
            return identity;
        }
    }
    None
}

/// Structured path: a JSON object tagged with the inventory discriminator.
///
/// A well-formed JSON object without the tag (or without a string `sku`) is
/// foreign structured content, not a SKU: the chain stops with `None`.
fn parse_envelope(content: &str) -> Parsed {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(_) => return Parsed::Pass,
    };
    let map = match value {
        Value::Object(map) => map,
        _ => return Parsed::Pass,
    };
    if map.get("type").and_then(Value::as_str) != Some(PAYLOAD_TAG) {
        return Parsed::Decided(None);
    }
    let sku = match map.get("sku").and_then(Value::as_str) {
        Some(sku) => sku.to_string(),
        None => return Parsed::Decided(None),
    };
    Parsed::Decided(Some(DecodedIdentity {
        sku,
        name: map.get("name").and_then(Value::as_str).map(str::to_string),
        price: map.get("price").and_then(Value::as_f64),
        id: map.get("id").and_then(Value::as_str).map(str::to_string),
    }))
}

/// Fallback path: the raw (trimmed) text is a literal SKU.
fn parse_literal_sku(content: &str) -> Parsed {
    Parsed::Decided(Some(DecodedIdentity::bare(content)))
}

// ============================================================================
// Validation - capacity guard, not a schema check
// ============================================================================

/// Accept any non-blank content within the scannable capacity ceiling.
pub fn validate(content: &str) -> bool {
    !content.trim().is_empty() && content.chars().count() <= MAX_PAYLOAD_CHARS
}

// ============================================================================
// Tests
// ============================================================================
