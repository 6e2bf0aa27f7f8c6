//! Error types for image preparation.

/// Errors that can occur while turning image bytes into a render-ready grid.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(
        "Crop box ({left}, {upper}, {right}, {lower}) does not fit the {width}x{height} image"
    )]
    InvalidBox {
        left: u32,
        upper: u32,
        right: u32,
        lower: u32,
        /// Width of the image being cropped
        width: u32,
        /// Height of the image being cropped
        height: u32,
    },

    #[error("Resized image would be {width}x{height}, over the {max_pixels} pixel limit")]
    TooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },

    #[error("Image has no visible pixels")]
    EmptyImage,
}
