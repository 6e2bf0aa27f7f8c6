//! Braille rendering for the highest-resolution style.
//!
//! Each braille character represents a 2x4 dot matrix, giving 8 subpixels
//! per terminal cell. A cell has a single foreground color: the weighted
//! average of its 8 pixels, with the middle two rows counting double.

use super::ansi::{self, RESET};
use super::pixel::{Color, PixelGrid};

/// Braille base character (U+2800, empty braille pattern).
pub const BRAILLE_BASE: char = '\u{2800}';

/// Default alpha cutoff for a visible dot (strictly greater than).
pub const DOTS_THRESHOLD: u8 = 127;

/// `(column, row)` offset inside the 2x4 block for each pattern bit.
///
/// ```text
/// [0,0]=1   [1,0]=8
/// [0,1]=2   [1,1]=16
/// [0,2]=4   [1,2]=32
/// [0,3]=64  [1,3]=128
/// ```
pub const DOTS: [(usize, usize); 8] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 1),
    (1, 2),
    (0, 3),
    (1, 3),
];

/// Color weight per block position, indexed `[row][column]`.
pub const DOT_WEIGHTS: [[u32; 2]; 4] = [[1, 1], [2, 2], [2, 2], [1, 1]];

/// Convert a 2x4 boolean grid to a braille character.
///
/// `grid[x][y]` says whether the dot in column `x`, row `y` is on.
pub fn grid_to_braille(grid: [[bool; 4]; 2]) -> char {
    let code = DOTS
        .iter()
        .enumerate()
        .filter(|&(_, &(dx, dy))| grid[dx][dy])
        .fold(0u32, |code, (bit, _)| code | (1u32 << bit));
    char::from_u32(BRAILLE_BASE as u32 | code).unwrap_or(BRAILLE_BASE)
}

/// Render a grid as colored braille characters.
///
/// The grid is cut into 2-wide, 4-tall blocks; leftover columns at the right
/// and rows at the bottom are dropped. A dot is on when its pixel's alpha is
/// above `threshold`.
pub fn render(grid: &PixelGrid, threshold: u8) -> String {
    let mut output = String::new();

    for by in 0..grid.height() / 4 {
        for bx in 0..grid.width() / 2 {
            let (x, y) = (bx * 2, by * 4);
            let mut dots = [[false; 4]; 2];
            for (dx, column) in dots.iter_mut().enumerate() {
                for (dy, dot) in column.iter_mut().enumerate() {
                    *dot = grid.pixel(x + dx as u32, y + dy as u32).a > threshold;
                }
            }

            output.push_str(&ansi::foreground(block_color(grid, x, y)));
            output.push(grid_to_braille(dots));
        }
        ansi::end_line(&mut output);
    }

    output.push_str(RESET);
    output
}

/// Weighted average color of the 2x4 block whose top-left pixel is `(x, y)`.
///
/// Every position counts, visible or not. Channels are truncated.
pub fn block_color(grid: &PixelGrid, x: u32, y: u32) -> Color {
    let mut sums = [0u32; 3];
    let mut total = 0u32;

    for (dy, weights) in DOT_WEIGHTS.iter().enumerate() {
        for (dx, &weight) in weights.iter().enumerate() {
            let pixel = grid.pixel(x + dx as u32, y + dy as u32);
            sums[0] += pixel.r as u32 * weight;
            sums[1] += pixel.g as u32 * weight;
            sums[2] += pixel.b as u32 * weight;
            total += weight;
        }
    }

    Color::new(
        (sums[0] / total) as u8,
        (sums[1] / total) as u8,
        (sums[2] / total) as u8,
    )
}
