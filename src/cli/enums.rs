//! CLI enum types for the render style option.

use clap::ValueEnum;

use crate::art::RenderStyle;

/// Rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Style {
    /// Half blocks, two pixel rows per line
    #[default]
    Small,
    /// Two full blocks per pixel
    Large,
    /// Braille dots
    Dots,
}

impl From<Style> for RenderStyle {
    fn from(s: Style) -> Self {
        match s {
            Style::Small => RenderStyle::Small,
            Style::Large => RenderStyle::Large,
            Style::Dots => RenderStyle::Dots,
        }
    }
}
