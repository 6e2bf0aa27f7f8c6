//! Pixel-to-glyph rendering for terminal sprite art.
//!
//! This module turns image bytes into truecolor ANSI text:
//!
//! 1. **Preparation** - decode, color keying, crop, resize, alpha
//!    binarization and trimming to the visible content
//! 2. **Rendering** - one of three styles selected by [`RenderStyle`]
//!
//! # Styles
//!
//! - `Small` - half blocks, two pixel rows per terminal row
//! - `Large` - two full blocks per pixel
//! - `Dots` - braille patterns, a 2x4 pixel block per character

pub mod ansi;
pub mod braille;
mod error;
pub mod halfblock;
mod pixel;
mod prepare;
pub mod solid;
mod style;

pub use error::PrepareError;
pub use pixel::{BoxArea, Color, Pixel, PixelGrid};
pub use prepare::{
    crop, decode, fix_alpha, key_transparency, prepare_grid, prepare_image, resize, trim,
    PrepareOptions, ALPHA_THRESHOLD, MAX_RESIZED_PIXELS, MAX_RESIZE_FACTOR,
};
pub use style::{RenderStyle, DEFAULT_DOTS_RESIZE};

pub use braille::{grid_to_braille, BRAILLE_BASE, DOTS_THRESHOLD};

/// Render with half blocks. See [`halfblock::render`].
pub fn render_half_block(grid: &PixelGrid) -> String {
    halfblock::render(grid)
}

/// Render with two full blocks per pixel. See [`solid::render`].
pub fn render_solid_block(grid: &PixelGrid) -> String {
    solid::render(grid)
}

/// Render with braille dots. See [`braille::render`].
pub fn render_dots(grid: &PixelGrid, threshold: u8) -> String {
    braille::render(grid, threshold)
}
