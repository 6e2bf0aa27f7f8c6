//! Pixel, color and grid types shared by preparation and the renderers.

use std::str::FromStr;

use image::RgbaImage;

/// One RGBA sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Fully transparent black.
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque pixel of the given color.
    pub const fn opaque(color: Color) -> Self {
        Self::new(color.r, color.g, color.b, 255)
    }

    /// The color channels without alpha.
    pub const fn rgb(&self) -> Color {
        Color::new(self.r, self.g, self.b)
    }

    /// Renderers treat any non-zero alpha as visible.
    pub const fn is_visible(&self) -> bool {
        self.a != 0
    }
}

/// RGB color used for glyph colors and transparency keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(format!(
                    "Invalid color '{}'. Use r,g,b (e.g., 255,255,255)",
                    s
                ));
            }
            let channel = |part: &str| {
                part.parse::<u8>()
                    .map_err(|_| format!("Invalid color channel '{}' in '{}' (0-255)", part, s))
            };
            return Ok(Color::new(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
            ));
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!(
                "Invalid color '{}'. Use #rrggbb (e.g., #ffffff)",
                s
            ));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| format!("Invalid hex color '{}'", s))
        };
        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Crop rectangle in pixel coordinates.
///
/// `right` and `lower` are one past the last included column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxArea {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl BoxArea {
    pub const fn new(left: u32, upper: u32, right: u32, lower: u32) -> Self {
        Self {
            left,
            upper,
            right,
            lower,
        }
    }
}

impl FromStr for BoxArea {
    type Err = String;

    /// Parses `left,upper,right,lower`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<u32> = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid crop value '{}' in '{}'", part.trim(), s))
            })
            .collect::<Result<_, _>>()?;

        match values.as_slice() {
            [left, upper, right, lower] => Ok(BoxArea::new(*left, *upper, *right, *lower)),
            _ => Err(format!(
                "Invalid crop box '{}'. Use LEFT,UPPER,RIGHT,LOWER (e.g., 0,0,32,32)",
                s
            )),
        }
    }
}

/// Row-major grid of RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Build a grid from row-major pixels.
    ///
    /// Returns `None` if `pixels.len()` is not `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Grid with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    /// Build a grid from rows. Returns `None` if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        if rows.iter().any(|row| row.len() as u32 != width) {
            return None;
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Pixel at column `x`, row `y`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[self.index(x, y)]
    }

    /// Row `y` as a slice. Panics when out of bounds.
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Copy of the region `[left, right) x [upper, lower)`.
    ///
    /// Callers validate the bounds.
    pub(crate) fn sub_grid(&self, left: u32, upper: u32, right: u32, lower: u32) -> PixelGrid {
        let width = right - left;
        let height = lower - upper;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in upper..lower {
            let start = self.index(left, y);
            pixels.extend_from_slice(&self.pixels[start..start + width as usize]);
        }
        PixelGrid {
            width,
            height,
            pixels,
        }
    }

    /// Convert into an `image` buffer for resampling.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (dst, src) in image.pixels_mut().zip(&self.pixels) {
            *dst = image::Rgba([src.r, src.g, src.b, src.a]);
        }
        image
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl From<RgbaImage> for PixelGrid {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| Pixel::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}
