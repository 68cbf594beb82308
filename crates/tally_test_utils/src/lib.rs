//! Shared inventory fixtures for Tallyflow tests.

use tally_protocol::types::{InventoryItem, ItemId};

/// Build an item with the fields reconciliation cares about.
pub fn item(id: &str, sku: &str, name: &str, quantity: u32) -> InventoryItem {
    InventoryItem {
        id: ItemId::from(id),
        sku: sku.to_string(),
        name: name.to_string(),
        quantity,
        min_stock_level: 2,
        price: 19.99,
    }
}

/// A small shop: six shirts (enough to overflow the search cap), a mug and a
/// cap with distinct SKU stems.
pub fn sample_inventory() -> Vec<InventoryItem> {
    vec![
        item("itm-1", "SHI-BLA-LX-052", "Black Shirt", 10),
        item("itm-2", "SHI-BLU-LX-107", "Blue Shirt", 4),
        item("itm-3", "SHI-RED-SX-311", "Red Shirt", 7),
        item("itm-4", "SHI-GRE-MX-430", "Green Shirt", 2),
        item("itm-5", "SHI-WHI-XL-218", "White Shirt", 5),
        item("itm-6", "SHI-YEL-SX-660", "Yellow Shirt", 1),
        item("itm-7", "MUG-RED-MX-204", "Red Mug", 12),
        item("itm-8", "HAT-BLA-MX-077", "Black Cap", 3),
    ]
}
