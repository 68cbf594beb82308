//! Deterministic label matrix renderer.
//!
//! Renders any string into a fixed 21x21 module grid: three finder landmarks,
//! a timing overlay, and a data area filled pseudo-randomly from a 32-bit
//! rolling hash of the input. Identical input always yields a bit-identical
//! matrix, so a label can be regenerated and compared visually.
//!
//! This is NOT an ISO/IEC 18004 symbol: there are no error-correction
//! codewords and no third-party scanner will decode it. Consumers needing
//! scanner interoperability must substitute a standards-compliant encoder;
//! the payload contract upstream is unchanged by that swap.

use std::io::Cursor;
use thiserror::Error;

/// Module count per side (the smallest real-world symbol size).
pub const SYMBOL_MODULES: usize = 21;
/// Side length of the three finder landmarks.
const FINDER_MODULES: usize = 7;
/// Inclusive module range of the timing overlay on row 6 / column 6.
const TIMING_START: usize = 8;
const TIMING_END: usize = 12;
/// Row/column carrying the timing overlay.
const TIMING_TRACK: usize = 6;

/// Rendering errors. Fatal to the single call only; callers may retry.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The pixel buffer could not be adopted as a drawing surface.
    #[error("could not obtain drawing surface ({width}x{height})")]
    Surface { width: u32, height: u32 },

    #[error("failed to encode label image: {0}")]
    Encode(#[from] image::ImageError),
}

// ============================================================================
// Hashing and seeded fill
// ============================================================================

/// 32-bit rolling hash over character codes (multiply-shift-accumulate).
pub fn symbol_hash(input: &str) -> u32 {
    let mut hash: u32 = 0;
    for code in input.chars() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(code as u32);
    }
    hash
}

/// Deterministic PRF mapping a u32 seed to [0, 1).
///
/// Integer mixing only: no platform-dependent float math, so a matrix
/// rendered on one machine matches the same render anywhere else.
fn seeded_fraction(seed: u32) -> f64 {
    let mut z = seed.wrapping_add(0x9e37_79b9);
    z = (z ^ (z >> 16)).wrapping_mul(0x21f0_aaad);
    z = (z ^ (z >> 15)).wrapping_mul(0x735a_2d97);
    z ^= z >> 15;
    f64::from(z) / f64::from(u32::MAX)
}

// ============================================================================
// Matrix
// ============================================================================

/// A rendered 21x21 module grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    modules: Vec<bool>,
}

impl Matrix {
    /// Render the matrix for `text`. Pure and infallible.
    pub fn from_text(text: &str) -> Self {
        let hash = symbol_hash(text);
        let mut modules = vec![false; SYMBOL_MODULES * SYMBOL_MODULES];

        // Data area: seeded fill everywhere outside the finder landmarks.
        for row in 0..SYMBOL_MODULES {
            for col in 0..SYMBOL_MODULES {
                if in_finder(row, col) {
                    continue;
                }
                let seed = hash.wrapping_add((row * SYMBOL_MODULES + col) as u32);
                modules[row * SYMBOL_MODULES + col] = seeded_fraction(seed) > 0.5;
            }
        }

        // Finder landmarks: fixed ring plus core, independent of input.
        for (base_row, base_col) in [
            (0, 0),
            (0, SYMBOL_MODULES - FINDER_MODULES),
            (SYMBOL_MODULES - FINDER_MODULES, 0),
        ] {
            for i in 0..FINDER_MODULES {
                for j in 0..FINDER_MODULES {
                    let dark = i == 0
                        || i == FINDER_MODULES - 1
                        || j == 0
                        || j == FINDER_MODULES - 1
                        || ((2..=4).contains(&i) && (2..=4).contains(&j));
                    modules[(base_row + i) * SYMBOL_MODULES + (base_col + j)] = dark;
                }
            }
        }

        // Timing overlay: alternating modules on row 6 and column 6.
        for index in TIMING_START..=TIMING_END {
            let dark = index % 2 == 0;
            modules[TIMING_TRACK * SYMBOL_MODULES + index] = dark;
            modules[index * SYMBOL_MODULES + TIMING_TRACK] = dark;
        }

        Self { modules }
    }

    pub fn size(&self) -> usize {
        SYMBOL_MODULES
    }

    /// Whether the module at (row, col) is dark.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules[row * SYMBOL_MODULES + col]
    }

    /// Scale to a square RGBA bitmap of (at least) the requested pixel size.
    ///
    /// Nearest-module sampling; sizes below one pixel per module are clamped
    /// up so every module stays visible.
    pub fn to_bitmap(&self, pixel_size: u32) -> Bitmap {
        let side = pixel_size.max(SYMBOL_MODULES as u32);
        let mut pixels = Vec::with_capacity((side * side * 4) as usize);
        for y in 0..side {
            let row = (y as usize * SYMBOL_MODULES) / side as usize;
            for x in 0..side {
                let col = (x as usize * SYMBOL_MODULES) / side as usize;
                let value = if self.is_dark(row, col) { 0x00 } else { 0xff };
                pixels.extend_from_slice(&[value, value, value, 0xff]);
            }
        }
        Bitmap {
            width: side,
            height: side,
            pixels,
        }
    }
}

/// Whether (row, col) lies inside one of the three finder landmarks.
fn in_finder(row: usize, col: usize) -> bool {
    let near_start = |v: usize| v < FINDER_MODULES;
    let near_end = |v: usize| v >= SYMBOL_MODULES - FINDER_MODULES;
    (near_start(row) && near_start(col))
        || (near_start(row) && near_end(col))
        || (near_end(row) && near_start(col))
}

// ============================================================================
// Bitmap
// ============================================================================

/// A rendered RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let surface = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(RenderError::Surface {
                width: self.width,
                height: self.height,
            })?;
        let mut out = Cursor::new(Vec::new());
        surface.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// Render `text` straight to PNG bytes at the requested pixel size.
pub fn render_png(text: &str, pixel_size: u32) -> Result<Vec<u8>, RenderError> {
    Matrix::from_text(text).to_bitmap(pixel_size).to_png()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_input_is_bit_identical() {
        let a = Matrix::from_text("SHI-BLA-LX-052");
        let b = Matrix::from_text("SHI-BLA-LX-052");
        assert_eq!(a, b);
        assert_eq!(a.to_bitmap(210), b.to_bitmap(210));
    }

    #[test]
    fn test_different_inputs_differ() {
        let a = Matrix::from_text("SHI-BLA-LX-052");
        let b = Matrix::from_text("SHI-BLA-LX-053");
        let differing = (0..SYMBOL_MODULES)
            .flat_map(|r| (0..SYMBOL_MODULES).map(move |c| (r, c)))
            .filter(|&(r, c)| a.is_dark(r, c) != b.is_dark(r, c))
            .count();
        assert!(differing > 0, "fill must be hash-sensitive");
    }

    #[test]
    fn test_finder_landmarks_are_input_independent() {
        for text in ["", "a", "some much longer payload content"] {
            let m = Matrix::from_text(text);
            for (base_row, base_col) in [(0, 0), (0, 14), (14, 0)] {
                // Ring corners and edges are dark, the 1-module gap is light,
                // the 3x3 core is dark.
                assert!(m.is_dark(base_row, base_col));
                assert!(m.is_dark(base_row + 6, base_col + 6));
                assert!(!m.is_dark(base_row + 1, base_col + 1));
                assert!(!m.is_dark(base_row + 5, base_col + 1));
                assert!(m.is_dark(base_row + 3, base_col + 3));
            }
        }
    }

    #[test]
    fn test_timing_overlay_alternates() {
        let m = Matrix::from_text("anything");
        for index in 8..=12 {
            assert_eq!(m.is_dark(6, index), index % 2 == 0);
            assert_eq!(m.is_dark(index, 6), index % 2 == 0);
        }
    }

    #[test]
    fn test_symbol_hash_rolls_over_character_codes() {
        assert_eq!(symbol_hash(""), 0);
        assert_eq!(symbol_hash("A"), 'A' as u32);
        let manual = ('A' as u32)
            .wrapping_shl(5)
            .wrapping_sub('A' as u32)
            .wrapping_add('B' as u32);
        assert_eq!(symbol_hash("AB"), manual);
    }

    #[test]
    fn test_bitmap_dimensions_and_scaling() {
        let bitmap = Matrix::from_text("x").to_bitmap(210);
        assert_eq!(bitmap.width(), 210);
        assert_eq!(bitmap.height(), 210);
        assert_eq!(bitmap.pixels().len(), 210 * 210 * 4);

        // Requests below one pixel per module are clamped up.
        let tiny = Matrix::from_text("x").to_bitmap(4);
        assert_eq!(tiny.width(), SYMBOL_MODULES as u32);
    }

    #[test]
    fn test_png_output_has_signature() {
        let png = render_png("SHI-BLA-LX-052", 84).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
