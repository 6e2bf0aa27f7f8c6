//! Solid-block rendering: one pixel per two terminal columns.

use super::ansi::{self, RESET};
use super::pixel::PixelGrid;

/// Two full blocks, roughly square in a terminal cell grid.
pub const SOLID_BLOCK: &str = "██";

/// Two spaces for a transparent pixel.
pub const WIDE_EMPTY_BLOCK: &str = "  ";

/// Render a grid with two full blocks per visible pixel.
pub fn render(grid: &PixelGrid) -> String {
    let mut output = String::new();

    for row in grid.rows() {
        for pixel in row {
            if pixel.is_visible() {
                output.push_str(&ansi::foreground(pixel.rgb()));
                output.push_str(SOLID_BLOCK);
            } else {
                output.push_str(WIDE_EMPTY_BLOCK);
            }
        }
        ansi::end_line(&mut output);
    }

    output.push_str(RESET);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::pixel::Pixel;

    #[test]
    fn test_transparent_pixel_is_two_spaces() {
        let grid = PixelGrid::filled(1, 1, Pixel::new(10, 20, 30, 0));
        assert_eq!(render(&grid), "  \x1b[0m\n\x1b[0m");
    }

    #[test]
    fn test_opaque_pixel_is_colored_block() {
        let grid = PixelGrid::filled(1, 1, Pixel::new(10, 20, 30, 255));
        assert_eq!(render(&grid), "\x1b[38;2;10;20;30m██\x1b[0m\n\x1b[0m");
    }

    #[test]
    fn test_one_line_per_row() {
        let grid = PixelGrid::filled(2, 3, Pixel::new(1, 1, 1, 255));
        let output = render(&grid);
        assert_eq!(output.lines().count(), 4);
        assert_eq!(output.matches(SOLID_BLOCK).count(), 6);
    }
}
