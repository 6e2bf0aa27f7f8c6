//! SpriteArchive - reads the form database and sprite images out of the
//! downloaded repository zip.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use super::error::SpriteError;

/// Folder every entry of the repository zip lives under.
pub const ARCHIVE_ROOT: &str = "pokesprite-master";

/// Form database, relative to [`ARCHIVE_ROOT`].
pub const DATABASE_ENTRY: &str = "data/pokemon.json";

/// Sprite folder, relative to [`ARCHIVE_ROOT`].
pub const SPRITE_DIR: &str = "pokemon-gen8";

/// Color variant of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Variant {
    #[default]
    Regular,
    Shiny,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Regular, Variant::Shiny];

    /// Folder name in the archive and in the cache.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Regular => "regular",
            Variant::Shiny => "shiny",
        }
    }

    pub fn from_shiny(shiny: bool) -> Self {
        if shiny {
            Variant::Shiny
        } else {
            Variant::Regular
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to the sprite repository zip.
pub struct SpriteArchive<R = BufReader<File>> {
    zip: ZipArchive<R>,
}

impl SpriteArchive {
    /// Open the archive file at `path`.
    pub fn open(path: &Path) -> Result<Self, SpriteError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> SpriteArchive<R> {
    /// Wrap any seekable zip reader.
    pub fn new(reader: R) -> Result<Self, SpriteError> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
        })
    }

    /// Read the form database (`pokemon.json`).
    pub fn database(&mut self) -> Result<Vec<u8>, SpriteError> {
        self.read_entry(DATABASE_ENTRY)
    }

    /// Read the png sprite for `form` in `variant`.
    pub fn sprite(&mut self, variant: Variant, form: &str) -> Result<Vec<u8>, SpriteError> {
        self.read_entry(&format!("{}/{}/{}.png", SPRITE_DIR, variant.name(), form))
    }

    /// Read the entry at `name`, relative to [`ARCHIVE_ROOT`].
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, SpriteError> {
        let full_name = format!("{}/{}", ARCHIVE_ROOT, name);
        let mut entry = match self.zip.by_name(&full_name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(SpriteError::MissingEntry(full_name)),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }
}
