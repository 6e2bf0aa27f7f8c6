//! Render style selection.

use std::num::NonZeroU32;

use super::pixel::PixelGrid;
use super::prepare::PrepareOptions;
use super::{braille, halfblock, solid};

/// Resize factor applied before dot rendering unless configured otherwise.
pub const DEFAULT_DOTS_RESIZE: u32 = 2;

/// Which renderer turns a grid into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum RenderStyle {
    /// Half blocks, two pixel rows per line
    #[default]
    Small,
    /// Two full blocks per pixel
    Large,
    /// Braille dots, 2x4 pixels per character
    Dots,
}

impl RenderStyle {
    pub const ALL: [RenderStyle; 3] = [RenderStyle::Small, RenderStyle::Large, RenderStyle::Dots];

    /// Get the name used on the command line and in cache paths.
    pub fn name(&self) -> &'static str {
        match self {
            RenderStyle::Small => "small",
            RenderStyle::Large => "large",
            RenderStyle::Dots => "dots",
        }
    }

    /// Look up a style by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Render `grid` in this style.
    ///
    /// `dots_threshold` only affects [`RenderStyle::Dots`].
    pub fn render(&self, grid: &PixelGrid, dots_threshold: u8) -> String {
        match self {
            RenderStyle::Small => halfblock::render(grid),
            RenderStyle::Large => solid::render(grid),
            RenderStyle::Dots => braille::render(grid, dots_threshold),
        }
    }

    /// Preparation options for this style.
    ///
    /// Dots upscale by `dots_resize` first so small sprites still fill
    /// whole 2x4 blocks; the block styles render at native size.
    pub fn prepare_options(
        &self,
        base: PrepareOptions,
        dots_resize: Option<NonZeroU32>,
    ) -> PrepareOptions {
        match self {
            RenderStyle::Dots => PrepareOptions {
                resize_factor: base.resize_factor.or(dots_resize),
                ..base
            },
            RenderStyle::Small | RenderStyle::Large => base,
        }
    }
}

impl std::str::FromStr for RenderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!("Unknown style '{}', expected one of: small, large, dots", s)
        })
    }
}

impl std::fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
