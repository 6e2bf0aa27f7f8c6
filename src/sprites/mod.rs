//! Sprite archive integration.
//!
//! The pokesprite repository is downloaded once as a zip archive and kept in
//! a local data directory. Sprites and the form database are extracted from
//! it on demand, and rendered art is cached as text so repeated lookups never
//! touch the image pipeline.

mod archive;
mod cache;
mod client;
mod error;
mod forms;
mod generate;
pub mod retry;

pub use archive::{SpriteArchive, Variant, ARCHIVE_ROOT, DATABASE_ENTRY, SPRITE_DIR};
pub use cache::{default_data_dir, ArchiveStatus, CacheEntry, SpriteCache};
pub use client::{ArchiveClient, DEFAULT_ARCHIVE_URL};
pub use error::SpriteError;
pub use forms::{parse_forms, pokemon_forms};
pub use generate::{
    ensure_archive, extract_database, generate_all, load_sprite, open_archive, render_form,
    render_from_cache, validate_form, ArtOptions, GenerateOptions, GenerateReport,
};
