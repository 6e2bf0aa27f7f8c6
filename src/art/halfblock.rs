//! Half-block rendering: two pixel rows per terminal row.
//!
//! Each cell shows an upper and a lower pixel. The upper half block `▀`
//! takes the upper pixel as foreground and, when both are visible, the
//! lower pixel as background. A lone lower pixel uses the lower half block
//! `▄` instead so the transparent half stays the terminal's own background.

use super::ansi::{self, RESET};
use super::pixel::{Pixel, PixelGrid};

/// Upper half block (U+2580).
pub const UPPER_HALF_BLOCK: char = '▀';

/// Lower half block (U+2584).
pub const LOWER_HALF_BLOCK: char = '▄';

/// Render a grid with half blocks.
///
/// Rows are paired top to bottom; an odd last row is dropped. Every cell
/// starts with a reset so colors never carry over between cells.
pub fn render(grid: &PixelGrid) -> String {
    let mut output = String::new();

    for pair in 0..grid.height() / 2 {
        let upper = grid.row(pair * 2);
        let lower = grid.row(pair * 2 + 1);
        for (&upper_pixel, &lower_pixel) in upper.iter().zip(lower) {
            push_cell(&mut output, upper_pixel, lower_pixel);
        }
        ansi::end_line(&mut output);
    }

    output.push_str(RESET);
    output
}

fn push_cell(output: &mut String, upper: Pixel, lower: Pixel) {
    output.push_str(RESET);
    match (upper.is_visible(), lower.is_visible()) {
        (false, false) => output.push(' '),
        (true, false) => {
            output.push_str(&ansi::foreground(upper.rgb()));
            output.push(UPPER_HALF_BLOCK);
        }
        (false, true) => {
            output.push_str(&ansi::foreground(lower.rgb()));
            output.push(LOWER_HALF_BLOCK);
        }
        (true, true) => {
            output.push_str(&ansi::foreground(upper.rgb()));
            output.push_str(&ansi::background(lower.rgb()));
            output.push(UPPER_HALF_BLOCK);
        }
    }
}
