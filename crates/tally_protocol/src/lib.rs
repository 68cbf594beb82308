//! Inventory identity protocol: canonical types and codecs.
//!
//! Everything a label or a recount needs to agree on lives here:
//!
//! - `types`: the canonical item/mutation model shared by every crate
//! - `sku`: structured `<prefix><TYPE3>-<COLOR3>-<SIZE2>-<NNN>` identifiers
//! - `payload`: the JSON envelope carried inside a scannable label
//! - `defaults`: fixed widths and capacity limits
//!
//! All codecs are pure and stateless; randomness (the SKU serial draw) is
//! injected by the caller.

pub mod defaults;
pub mod payload;
pub mod sku;
pub mod types;

// Re-export types for convenience
pub use payload::{
    decode, encode, encode_payload, validate, DecodedIdentity, IdentityPayload, PayloadError,
};
pub use sku::{generate, generate_unique_with, generate_with, parse, SkuComponents, SkuError};
pub use types::{InventoryItem, ItemId, MutationIntent, MutationKind, ReasonCode};
