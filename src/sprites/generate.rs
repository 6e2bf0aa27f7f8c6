//! Archive provisioning, on-demand rendering and the pre-render batch.

use std::io::{Read, Seek};
use std::num::NonZeroU32;
use std::path::PathBuf;

use super::archive::{SpriteArchive, Variant};
use super::cache::{ArchiveStatus, SpriteCache};
use super::client::ArchiveClient;
use super::error::SpriteError;
use super::forms::parse_forms;
use crate::art::{
    decode, prepare_grid, Color, PixelGrid, PrepareError, PrepareOptions, RenderStyle,
    DEFAULT_DOTS_RESIZE, DOTS_THRESHOLD,
};

/// How sprites are turned into art, independent of the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtOptions {
    pub dots_threshold: u8,
    /// Upscale factor applied before dot rendering
    pub dots_resize: Option<NonZeroU32>,
    pub transparency_color: Option<Color>,
}

impl Default for ArtOptions {
    fn default() -> Self {
        Self {
            dots_threshold: DOTS_THRESHOLD,
            dots_resize: NonZeroU32::new(DEFAULT_DOTS_RESIZE),
            transparency_color: None,
        }
    }
}

impl ArtOptions {
    pub fn prepare_options(&self, style: RenderStyle) -> PrepareOptions {
        let base = PrepareOptions {
            transparency_color: self.transparency_color,
            ..PrepareOptions::default()
        };
        style.prepare_options(base, self.dots_resize)
    }

    /// Prepare an already decoded sprite and render it in `style`.
    pub fn render_grid(&self, grid: PixelGrid, style: RenderStyle) -> Result<String, PrepareError> {
        let grid = prepare_grid(grid, &self.prepare_options(style))?;
        Ok(style.render(&grid, self.dots_threshold))
    }

    /// Decode, prepare and render sprite bytes in `style`.
    pub fn render(&self, sprite: &[u8], style: RenderStyle) -> Result<String, PrepareError> {
        self.render_grid(decode(sprite)?, style)
    }
}

/// Options for [`generate_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Styles to pre-render
    pub styles: Vec<RenderStyle>,
    pub art: ArtOptions,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            styles: RenderStyle::ALL.to_vec(),
            art: ArtOptions::default(),
        }
    }
}

/// Outcome of a pre-render batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Art files written
    pub rendered: usize,
    /// Art files already cached
    pub existing: usize,
    /// Forms skipped because their sprite was missing or unusable
    pub skipped: usize,
}

/// Make sure a usable archive is in the cache, downloading it if needed.
///
/// A cached archive without a recorded checksum is accepted and its
/// checksum recorded. One that no longer matches its checksum is discarded
/// and downloaded again.
pub async fn ensure_archive(
    cache: &SpriteCache,
    client: &ArchiveClient,
) -> Result<PathBuf, SpriteError> {
    cache.ensure_dir_exists()?;
    let path = cache.archive_path();

    match cache.archive_status()? {
        ArchiveStatus::Valid => {
            log::debug!("Using cached sprite archive {}", path.display());
            return Ok(path);
        }
        ArchiveStatus::Unverified => {
            let digest = cache.record_archive_checksum()?;
            log::info!("Recorded checksum {} for cached sprite archive", digest);
            return Ok(path);
        }
        ArchiveStatus::Corrupt => {
            log::warn!("Cached sprite archive failed its checksum, downloading again");
            cache.remove_archive()?;
        }
        ArchiveStatus::Missing => {}
    }

    client.download_with_retry(&path).await?;
    cache.record_archive_checksum()?;
    Ok(path)
}

/// Make sure a usable archive is cached and open it.
pub async fn open_archive(
    cache: &SpriteCache,
    client: &ArchiveClient,
) -> Result<SpriteArchive, SpriteError> {
    let path = ensure_archive(cache, client).await?;
    SpriteArchive::open(&path)
}

/// Extract the form database into the cache and list its forms.
pub fn extract_database<R: Read + Seek>(
    cache: &SpriteCache,
    archive: &mut SpriteArchive<R>,
) -> Result<Vec<String>, SpriteError> {
    let database = archive.database()?;
    let forms = parse_forms(&database)?;
    cache.store_database(&database)?;
    log::info!("Extracted form database ({} forms)", forms.len());
    Ok(forms)
}

/// Check that `form` is listed in the cached database.
///
/// Form names become cache file names, so anything not in the database is
/// rejected before a path is built from it.
pub fn validate_form(cache: &SpriteCache, form: &str) -> Result<(), SpriteError> {
    if cache.forms()?.iter().any(|known| known == form) {
        Ok(())
    } else {
        Err(SpriteError::UnknownForm(form.to_string()))
    }
}

/// Get the sprite png for `form`, extracting it from the archive on a cache miss.
pub fn load_sprite<R: Read + Seek>(
    cache: &SpriteCache,
    archive: &mut SpriteArchive<R>,
    variant: Variant,
    form: &str,
) -> Result<Vec<u8>, SpriteError> {
    if let Some(sprite) = cache.get_sprite(variant, form) {
        return Ok(sprite);
    }
    let sprite = archive.sprite(variant, form)?;
    cache.store_sprite(variant, form, &sprite)?;
    Ok(sprite)
}

/// Render one form on demand and store the result.
///
/// The form must be listed in the cached database.
pub fn render_form<R: Read + Seek>(
    cache: &SpriteCache,
    archive: &mut SpriteArchive<R>,
    style: RenderStyle,
    variant: Variant,
    form: &str,
    options: &ArtOptions,
) -> Result<String, SpriteError> {
    validate_form(cache, form)?;
    let sprite = load_sprite(cache, archive, variant, form)?;
    let art = options.render(&sprite, style)?;
    cache.store_art(style, variant, form, &art)?;
    log::debug!("Rendered {} {} ({})", variant, form, style);
    Ok(art)
}

/// Render one form from its already extracted sprite, without the archive.
///
/// Returns `Ok(None)` if the sprite has not been extracted yet. The form
/// must be listed in the cached database.
pub fn render_from_cache(
    cache: &SpriteCache,
    style: RenderStyle,
    variant: Variant,
    form: &str,
    options: &ArtOptions,
) -> Result<Option<String>, SpriteError> {
    validate_form(cache, form)?;
    let Some(sprite) = cache.get_sprite(variant, form) else {
        return Ok(None);
    };
    let art = options.render(&sprite, style)?;
    cache.store_art(style, variant, form, &art)?;
    log::debug!("Rendered {} {} ({}) from cached sprite", variant, form, style);
    Ok(Some(art))
}

/// Pre-render every form of every variant in the requested styles.
///
/// Art that is already cached is left untouched. Forms whose sprite is
/// missing from the archive or cannot be rendered are skipped with a warning.
pub fn generate_all<R: Read + Seek>(
    cache: &SpriteCache,
    archive: &mut SpriteArchive<R>,
    options: &GenerateOptions,
) -> Result<GenerateReport, SpriteError> {
    let forms = extract_database(cache, archive)?;
    log::info!(
        "Pre-rendering {} forms in {} style(s)",
        forms.len(),
        options.styles.len()
    );

    let mut report = GenerateReport::default();
    for variant in Variant::ALL {
        for form in &forms {
            match generate_form(cache, archive, variant, form, options, &mut report) {
                Ok(()) => {}
                Err(e @ (SpriteError::MissingEntry(_) | SpriteError::Prepare(_))) => {
                    log::warn!("Skipping {} {}: {}", variant, form, e);
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    log::info!(
        "Pre-render finished: {} rendered, {} already cached, {} skipped",
        report.rendered,
        report.existing,
        report.skipped
    );
    Ok(report)
}

fn generate_form<R: Read + Seek>(
    cache: &SpriteCache,
    archive: &mut SpriteArchive<R>,
    variant: Variant,
    form: &str,
    options: &GenerateOptions,
    report: &mut GenerateReport,
) -> Result<(), SpriteError> {
    let missing: Vec<RenderStyle> = options
        .styles
        .iter()
        .copied()
        .filter(|&style| !cache.art_path(style, variant, form).exists())
        .collect();
    report.existing += options.styles.len() - missing.len();
    if missing.is_empty() {
        return Ok(());
    }

    let sprite = load_sprite(cache, archive, variant, form)?;
    let grid = decode(&sprite)?;
    for style in missing {
        let art = options.art.render_grid(grid.clone(), style)?;
        cache.store_art(style, variant, form, &art)?;
        report.rendered += 1;
    }
    log::debug!("Rendered {} {}", variant, form);
    Ok(())
}
