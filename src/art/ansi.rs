//! ANSI SGR escape sequences used by the renderers.

use super::pixel::Color;

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

/// 24-bit foreground color: `ESC[38;2;R;G;Bm`.
pub fn foreground(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// 24-bit background color: `ESC[48;2;R;G;Bm`.
pub fn background(color: Color) -> String {
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

/// Finish an output row: reset, then newline.
pub(crate) fn end_line(output: &mut String) {
    output.push_str(RESET);
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_escape() {
        assert_eq!(foreground(Color::new(255, 0, 10)), "\x1b[38;2;255;0;10m");
    }

    #[test]
    fn test_background_escape() {
        assert_eq!(background(Color::new(0, 128, 255)), "\x1b[48;2;0;128;255m");
    }
}
