//! Canonical fixed widths and capacity limits shared across the subsystem.

/// Fixed width of the SKU type segment.
pub const SKU_TYPE_WIDTH: usize = 3;
/// Fixed width of the SKU color segment.
pub const SKU_COLOR_WIDTH: usize = 3;
/// Fixed width of the SKU size segment.
pub const SKU_SIZE_WIDTH: usize = 2;
/// Pad character for attribute segments shorter than their fixed width.
pub const SKU_FILLER: char = 'X';
/// Segment delimiter.
pub const SKU_SEPARATOR: char = '-';
/// Inclusive bounds of the zero-padded numeric serial suffix.
pub const SKU_SERIAL_MIN: u16 = 1;
pub const SKU_SERIAL_MAX: u16 = 999;

/// Discriminator value of the structured scan envelope.
pub const PAYLOAD_TAG: &str = "inventory";
/// Capacity ceiling for scannable content (version-40 alphanumeric limit).
pub const MAX_PAYLOAD_CHARS: usize = 4296;

/// Maximum number of candidates shown for a reconciliation search.
pub const SEARCH_RESULT_CAP: usize = 5;
