//! Canonical inventory model (store-facing payload equivalents).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Item ID - Newtype to prevent mixing with other identifiers
// ============================================================================

/// Inventory item identifier.
///
/// External stores hand out their own ids, so any string is carried verbatim;
/// `new()` mints a UUID-backed value for items created locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Inventory Item - read-only view of the external store's record
// ============================================================================

/// A recorded inventory item as supplied by the external store.
///
/// Field names follow the store's JSON shape (`minStockLevel`). This crate
/// never mutates an item; stock changes are requested through intents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub min_stock_level: u32,
    pub price: f64,
}

// ============================================================================
// Reason Codes (canonical enum, not freeform)
// ============================================================================

/// Audit reason attached to every stock mutation.
/// This is the CANONICAL definition - use this everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Restock,
    NewShipment,
    Return,
    Found,
    Adjustment,
    Recount,
    Other,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 7] = [
        ReasonCode::Restock,
        ReasonCode::NewShipment,
        ReasonCode::Return,
        ReasonCode::Found,
        ReasonCode::Adjustment,
        ReasonCode::Recount,
        ReasonCode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Restock => "restock",
            ReasonCode::NewShipment => "new_shipment",
            ReasonCode::Return => "return",
            ReasonCode::Found => "found",
            ReasonCode::Adjustment => "adjustment",
            ReasonCode::Recount => "recount",
            ReasonCode::Other => "other",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReasonCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "restock" => Ok(ReasonCode::Restock),
            "new_shipment" => Ok(ReasonCode::NewShipment),
            "return" => Ok(ReasonCode::Return),
            "found" => Ok(ReasonCode::Found),
            "adjustment" => Ok(ReasonCode::Adjustment),
            "recount" => Ok(ReasonCode::Recount),
            "other" => Ok(ReasonCode::Other),
            _ => Err(format!(
                "Invalid reason code: '{}'. Expected: restock, new_shipment, return, found, adjustment, recount, or other",
                s
            )),
        }
    }
}

// ============================================================================
// Mutation Intent - the output of a reconciliation cycle
// ============================================================================

/// Direction of a requested stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Counts agree; nothing to post.
    NoOp,
    /// Physical count exceeds the record.
    AddStock,
    /// Physical count falls short of the record.
    DeductStock,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::NoOp => "no_op",
            MutationKind::AddStock => "add_stock",
            MutationKind::DeductStock => "deduct_stock",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A requested stock change together with its audit trail.
///
/// Quantity is never negative; direction lives in `kind`. Intents are derived
/// from a recorded/observed count pair, never assembled field-by-field by an
/// operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationIntent {
    pub kind: MutationKind,
    pub quantity: u32,
    pub reason: ReasonCode,
    pub note: String,
}

impl MutationIntent {
    pub fn is_no_op(&self) -> bool {
        self.kind == MutationKind::NoOp
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_roundtrip() {
        let id = ItemId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_item_id_accepts_foreign_ids() {
        let id = ItemId::from("store-000042");
        assert_eq!(id.as_str(), "store-000042");
    }

    #[test]
    fn test_reason_code_roundtrip() {
        for code in ReasonCode::ALL {
            let parsed: ReasonCode = code.as_str().parse().unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_reason_code_serde_uses_snake_case() {
        let encoded = serde_json::to_string(&ReasonCode::NewShipment).unwrap();
        assert_eq!(encoded, "\"new_shipment\"");
    }

    #[test]
    fn test_reason_code_rejects_unknown() {
        assert!("shrinkage".parse::<ReasonCode>().is_err());
    }

    #[test]
    fn test_inventory_item_uses_store_field_names() {
        let item = InventoryItem {
            id: ItemId::from("itm-1"),
            sku: "SHI-BLA-LX-052".to_string(),
            name: "Black Shirt".to_string(),
            quantity: 10,
            min_stock_level: 2,
            price: 19.99,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"minStockLevel\":2"));
        let back: InventoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
