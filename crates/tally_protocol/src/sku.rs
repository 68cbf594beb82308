//! SKU codec: `<prefix><TYPE3>-<COLOR3>-<SIZE2>-<NNN>` identifiers.
//!
//! Attributes are uppercased, restricted to `[A-Z0-9]`, truncated to their
//! fixed width and padded with `X`. The numeric serial disambiguates items
//! sharing the same attributes but is NOT globally unique; the external store
//! is the authority (see `generate_unique_with`).

use crate::defaults::{
    SKU_COLOR_WIDTH, SKU_FILLER, SKU_SEPARATOR, SKU_SERIAL_MAX, SKU_SERIAL_MIN, SKU_SIZE_WIDTH,
    SKU_TYPE_WIDTH,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute set encoded into (or recovered from) a SKU.
///
/// Missing attributes are empty strings, never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuComponents {
    pub item_type: String,
    pub color: String,
    pub size: String,
    pub prefix: String,
}

/// SKU generation errors.
#[derive(Debug, Error)]
pub enum SkuError {
    /// Every drawn serial was already taken at the store.
    #[error("no free serial for '{stem}' after {attempts} attempts")]
    SerialSpaceExhausted { stem: String, attempts: u32 },
}

/// Uppercase, restrict to `[A-Z0-9]`, truncate to `width`, pad with the filler.
fn encode_segment(raw: &str, width: usize) -> String {
    let mut segment: String = raw
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(width)
        .collect();
    while segment.len() < width {
        segment.push(SKU_FILLER);
    }
    segment
}

/// Everything but the serial: `<prefix><TYPE3>-<COLOR3>-<SIZE2>`.
fn stem(components: &SkuComponents) -> String {
    format!(
        "{}{}{}{}{}{}",
        components.prefix.trim().to_uppercase(),
        encode_segment(&components.item_type, SKU_TYPE_WIDTH),
        SKU_SEPARATOR,
        encode_segment(&components.color, SKU_COLOR_WIDTH),
        SKU_SEPARATOR,
        encode_segment(&components.size, SKU_SIZE_WIDTH),
    )
}

/// Generate a SKU drawing the serial from `rng`.
///
/// Always succeeds; the output always matches the fixed-width grammar.
pub fn generate_with<R: Rng + ?Sized>(components: &SkuComponents, rng: &mut R) -> String {
    let serial = rng.gen_range(SKU_SERIAL_MIN..=SKU_SERIAL_MAX);
    format!("{}{}{:03}", stem(components), SKU_SEPARATOR, serial)
}

/// Generate a SKU with a thread-local random serial.
pub fn generate(components: &SkuComponents) -> String {
    generate_with(components, &mut rand::thread_rng())
}

/// Generate a SKU whose serial is free according to `taken` (normally a
/// store-side existence probe), retrying up to `max_attempts` draws.
///
/// Collisions are an expected condition: the serial space is only 999 wide
/// per attribute stem, and the store owns the uniqueness guarantee.
pub fn generate_unique_with<R, F>(
    components: &SkuComponents,
    rng: &mut R,
    mut taken: F,
    max_attempts: u32,
) -> Result<String, SkuError>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    for _ in 0..max_attempts {
        let sku = generate_with(components, rng);
        if !taken(&sku) {
            return Ok(sku);
        }
    }
    Err(SkuError::SerialSpaceExhausted {
        stem: stem(components),
        attempts: max_attempts,
    })
}

/// Strip the trailing run of filler characters from a decoded segment.
fn strip_filler(segment: &str) -> String {
    segment.trim_end_matches(SKU_FILLER).to_string()
}

/// Parse a SKU back into its attribute segments.
///
/// Fewer than four segments yields `SkuComponents::default()`: callers treat
/// the input as an opaque identifier. Parsing is lossy: attributes longer
/// than their fixed width were truncated at generation time, and attributes
/// legitimately ending in the filler character lose that run. Accepted format
/// limitation, not recoverable.
pub fn parse(sku: &str) -> SkuComponents {
    let parts: Vec<&str> = sku.split(SKU_SEPARATOR).collect();
    if parts.len() < 4 {
        return SkuComponents::default();
    }

    let n = parts.len();
    // parts[n - 1] is the serial and carries no attribute data.
    let size = strip_filler(parts[n - 2]);
    let color = strip_filler(parts[n - 3]);

    // A prefix containing the separator fuses back into the head segment.
    let separator = SKU_SEPARATOR.to_string();
    let head = parts[..n - 3].join(separator.as_str());
    let chars: Vec<char> = head.chars().collect();
    let (prefix, item_type) = if chars.len() > SKU_TYPE_WIDTH {
        let split = chars.len() - SKU_TYPE_WIDTH;
        (
            chars[..split].iter().collect::<String>(),
            strip_filler(&chars[split..].iter().collect::<String>()),
        )
    } else {
        (String::new(), strip_filler(&head))
    };

    SkuComponents {
        item_type,
        color,
        size,
        prefix,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    /// Assert the `^.*[A-Z0-9]{3}-[A-Z0-9]{3}-[A-Z0-9]{2}-\d{3}$` grammar.
    fn assert_grammar(sku: &str) {
        let parts: Vec<&str> = sku.split('-').collect();
        assert!(parts.len() >= 4, "expected at least 4 segments: {sku}");
        let n = parts.len();
        let serial = parts[n - 1];
        assert_eq!(serial.len(), 3, "serial width: {sku}");
        let value: u16 = serial.parse().expect("numeric serial");
        assert!((1..=999).contains(&value), "serial range: {sku}");
        assert_eq!(parts[n - 2].len(), 2, "size width: {sku}");
        assert!(parts[n - 2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(parts[n - 3].len(), 3, "color width: {sku}");
        assert!(parts[n - 3].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(parts[n - 4].len() >= 3, "type width: {sku}");
    }

    #[test]
    fn test_generate_matches_grammar() {
        let mut rng = rng();
        for components in [
            SkuComponents::default(),
            SkuComponents {
                item_type: "Shirt".to_string(),
                color: "Black".to_string(),
                size: "L".to_string(),
                prefix: String::new(),
            },
            SkuComponents {
                item_type: "a".to_string(),
                color: "éé".to_string(),
                size: "XXL extra".to_string(),
                prefix: "WH".to_string(),
            },
        ] {
            assert_grammar(&generate_with(&components, &mut rng));
        }
    }

    #[test]
    fn test_generate_is_deterministic_under_seed() {
        let components = SkuComponents {
            item_type: "Shirt".to_string(),
            ..Default::default()
        };
        let a = generate_with(&components, &mut rng());
        let b = generate_with(&components, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_recovers_truncated_attributes() {
        let components = SkuComponents {
            item_type: "Shirt".to_string(),
            color: "Black".to_string(),
            size: "L".to_string(),
            prefix: String::new(),
        };
        let sku = generate_with(&components, &mut rng());
        assert!(sku.starts_with("SHI-BLA-LX-"));

        let parsed = parse(&sku);
        assert_eq!(parsed.item_type, "SHI");
        assert_eq!(parsed.color, "BLA");
        assert_eq!(parsed.size, "L");
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn test_short_attributes_are_padded() {
        let components = SkuComponents {
            item_type: "a".to_string(),
            color: "B".to_string(),
            size: String::new(),
            prefix: String::new(),
        };
        let sku = generate_with(&components, &mut rng());
        assert!(sku.starts_with("AXX-BXX-XX-"), "got {sku}");
    }

    #[test]
    fn test_parse_recovers_prefix() {
        let components = SkuComponents {
            item_type: "Mug".to_string(),
            color: "Red".to_string(),
            size: "M".to_string(),
            prefix: "WH".to_string(),
        };
        let sku = generate_with(&components, &mut rng());
        let parsed = parse(&sku);
        assert_eq!(parsed.prefix, "WH");
        assert_eq!(parsed.item_type, "MUG");
    }

    #[test]
    fn test_parse_short_input_is_opaque() {
        assert_eq!(parse("FREEFORM"), SkuComponents::default());
        assert_eq!(parse("A-B-C"), SkuComponents::default());
        assert_eq!(parse(""), SkuComponents::default());
    }

    #[test]
    fn test_parse_bare_sku() {
        let parsed = parse("SHI-BLA-LX-052");
        assert_eq!(parsed.item_type, "SHI");
        assert_eq!(parsed.color, "BLA");
        assert_eq!(parsed.size, "L");
    }

    #[test]
    fn test_generate_unique_retries_taken_serials() {
        let components = SkuComponents {
            item_type: "Shirt".to_string(),
            ..Default::default()
        };
        let mut seen = 0;
        let sku = generate_unique_with(
            &components,
            &mut rng(),
            |_| {
                seen += 1;
                seen <= 3
            },
            10,
        )
        .unwrap();
        assert_eq!(seen, 4);
        assert_grammar(&sku);
    }

    #[test]
    fn test_generate_unique_exhausts() {
        let components = SkuComponents::default();
        let err = generate_unique_with(&components, &mut rng(), |_| true, 5).unwrap_err();
        assert!(matches!(
            err,
            SkuError::SerialSpaceExhausted { attempts: 5, .. }
        ));
    }
}
