//! Image preparation: decode, color keying, crop, resize, alpha binarization
//! and trimming to the visible content.
//!
//! [`prepare_image`] runs the full pipeline in a fixed order:
//!
//! 1. decode the bytes to RGBA
//! 2. key out the transparency color
//! 3. crop to the box area
//! 4. upscale by the resize factor
//! 5. binarize alpha at [`ALPHA_THRESHOLD`]
//! 6. trim to the bounding box of opaque pixels
//!
//! Each step consumes its input grid and returns a new one, so the caller
//! never shares a buffer with the pipeline.

use std::num::NonZeroU32;

use image::imageops::{self, FilterType};

use super::error::PrepareError;
use super::pixel::{BoxArea, Color, PixelGrid};

/// Alpha cutoff for binarization and trimming.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Largest resize factor accepted on the command line.
pub const MAX_RESIZE_FACTOR: u32 = 16;

/// Upper bound on the pixel count a resize may produce.
pub const MAX_RESIZED_PIXELS: u64 = 1 << 25;

/// Optional steps of the preparation pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Pixels with exactly this RGB become transparent.
    pub transparency_color: Option<Color>,
    /// Crop rectangle applied before resizing.
    pub box_area: Option<BoxArea>,
    /// Integer upscale factor applied before alpha binarization.
    pub resize_factor: Option<NonZeroU32>,
}

/// Decode image bytes and run the full preparation pipeline.
///
/// # Errors
///
/// Returns `PrepareError::Decode` for unreadable image data,
/// `PrepareError::InvalidBox` for a crop box outside the image and
/// `PrepareError::EmptyImage` when nothing visible is left to trim to.
pub fn prepare_image(bytes: &[u8], options: &PrepareOptions) -> Result<PixelGrid, PrepareError> {
    let grid = decode(bytes)?;
    prepare_grid(grid, options)
}

/// Run the preparation pipeline on an already decoded grid.
///
/// # Errors
///
/// Returns `PrepareError::InvalidBox` for a crop box outside the grid,
/// `PrepareError::TooLarge` when the resize would exceed
/// [`MAX_RESIZED_PIXELS`] and `PrepareError::EmptyImage` when nothing
/// visible is left to trim to.
pub fn prepare_grid(grid: PixelGrid, options: &PrepareOptions) -> Result<PixelGrid, PrepareError> {
    let mut grid = grid;

    if let Some(color) = options.transparency_color {
        grid = key_transparency(grid, color);
    }
    if let Some(area) = options.box_area {
        grid = crop(&grid, area)?;
    }
    if let Some(factor) = options.resize_factor {
        grid = resize(&grid, factor)?;
    }

    let grid = fix_alpha(grid, ALPHA_THRESHOLD);
    trim(&grid, ALPHA_THRESHOLD)
}

/// Decode any supported image format into an RGBA grid.
pub fn decode(bytes: &[u8]) -> Result<PixelGrid, PrepareError> {
    let image = image::load_from_memory(bytes)?;
    Ok(PixelGrid::from(image.to_rgba8()))
}

/// Set alpha to 0 on every pixel whose RGB equals `color`.
pub fn key_transparency(mut grid: PixelGrid, color: Color) -> PixelGrid {
    for pixel in grid.pixels_mut() {
        if pixel.rgb() == color {
            pixel.a = 0;
        }
    }
    grid
}

/// Select rows `[upper, lower)` and columns `[left, right)`.
pub fn crop(grid: &PixelGrid, area: BoxArea) -> Result<PixelGrid, PrepareError> {
    let BoxArea {
        left,
        upper,
        right,
        lower,
    } = area;

    if right < left || lower < upper || right > grid.width() || lower > grid.height() {
        return Err(PrepareError::InvalidBox {
            left,
            upper,
            right,
            lower,
            width: grid.width(),
            height: grid.height(),
        });
    }

    Ok(grid.sub_grid(left, upper, right, lower))
}

/// Upscale both dimensions by `factor` with a bilinear filter.
///
/// Color is resampled premultiplied by alpha, so the hidden color of
/// transparent pixels never leaks into visible ones. Edges still pick up
/// intermediate alpha values that [`fix_alpha`] later binarizes.
///
/// # Errors
///
/// Returns `PrepareError::TooLarge` if the result would have more than
/// [`MAX_RESIZED_PIXELS`] pixels.
pub fn resize(grid: &PixelGrid, factor: NonZeroU32) -> Result<PixelGrid, PrepareError> {
    let factor = factor.get();
    if factor == 1 || grid.is_empty() {
        return Ok(grid.clone());
    }

    let width = u64::from(grid.width()) * u64::from(factor);
    let height = u64::from(grid.height()) * u64::from(factor);
    if width
        .checked_mul(height)
        .map_or(true, |pixels| pixels > MAX_RESIZED_PIXELS)
    {
        return Err(PrepareError::TooLarge {
            width,
            height,
            max_pixels: MAX_RESIZED_PIXELS,
        });
    }

    let mut image = grid.to_rgba_image();
    for pixel in image.pixels_mut() {
        let a = u32::from(pixel[3]);
        for channel in &mut pixel.0[..3] {
            *channel = ((u32::from(*channel) * a + 127) / 255) as u8;
        }
    }

    // Both dimensions are bounded by MAX_RESIZED_PIXELS, well within u32
    let mut resized = imageops::resize(&image, width as u32, height as u32, FilterType::Triangle);
    for pixel in resized.pixels_mut() {
        let a = u32::from(pixel[3]);
        for channel in &mut pixel.0[..3] {
            *channel = if a == 0 {
                0
            } else {
                ((u32::from(*channel) * 255 + a / 2) / a).min(255) as u8
            };
        }
    }
    Ok(PixelGrid::from(resized))
}

/// Binarize alpha: below `threshold` becomes 0, everything else 255.
pub fn fix_alpha(mut grid: PixelGrid, threshold: u8) -> PixelGrid {
    for pixel in grid.pixels_mut() {
        pixel.a = if pixel.a < threshold { 0 } else { 255 };
    }
    grid
}

/// Crop to the bounding box of pixels with alpha above `threshold`.
///
/// The box includes its last row and column.
pub fn trim(grid: &PixelGrid, threshold: u8) -> Result<PixelGrid, PrepareError> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (y, row) in grid.rows().enumerate() {
        for (x, pixel) in row.iter().enumerate() {
            if pixel.a <= threshold {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x_min, y_min, x_max, y_max)) => {
                    (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
                }
            });
        }
    }

    let Some((x_min, y_min, x_max, y_max)) = bounds else {
        return Err(PrepareError::EmptyImage);
    };

    let right = (x_max + 1).min(grid.width());
    let lower = (y_max + 1).min(grid.height());
    Ok(grid.sub_grid(x_min, y_min, right, lower))
}
