//! SpriteCache - persistent disk cache for the archive, extracted sprites
//! and rendered art.
//!
//! Layout under the data directory:
//!
//! ```text
//! sprites.zip                         downloaded repository archive
//! sprites.zip.sha256                  hex SHA-256 of the archive
//! pokemon.json                        extracted form database
//! sprites/<variant>/<form>.png        extracted sprites
//! txt/<style>/<variant>/<form>.txt    rendered art
//! ```

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::archive::Variant;
use super::error::SpriteError;
use super::forms::parse_forms;
use crate::art::RenderStyle;

const ARCHIVE_FILE: &str = "sprites.zip";
const CHECKSUM_FILE: &str = "sprites.zip.sha256";
const DATABASE_FILE: &str = "pokemon.json";
const SPRITES_DIR: &str = "sprites";
const ART_DIR: &str = "txt";

/// State of the cached archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// No archive on disk.
    Missing,
    /// Archive matches its recorded checksum.
    Valid,
    /// Archive present but no checksum recorded yet.
    Unverified,
    /// Archive does not match its recorded checksum.
    Corrupt,
}

/// Persistent disk cache for sprite data.
pub struct SpriteCache {
    data_dir: PathBuf,
}

impl SpriteCache {
    /// Create a SpriteCache rooted at `data_dir`.
    /// Does not create the directory - call `ensure_dir_exists()` to create it.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Create a SpriteCache with the default data directory.
    /// Default: <data dir>/pokesprite (e.g. ~/.local/share/pokesprite)
    pub fn with_default_dir() -> Self {
        Self::new(default_data_dir())
    }

    /// Create a SpriteCache rooted at `data_dir` and ensure it exists.
    pub fn new_initialized(data_dir: PathBuf) -> Result<Self, io::Error> {
        let cache = Self::new(data_dir);
        cache.ensure_dir_exists()?;
        Ok(cache)
    }

    /// Ensure the data directory exists, creating it if necessary.
    pub fn ensure_dir_exists(&self) -> Result<(), io::Error> {
        std::fs::create_dir_all(&self.data_dir)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(ARCHIVE_FILE)
    }

    fn checksum_path(&self) -> PathBuf {
        self.data_dir.join(CHECKSUM_FILE)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn sprite_path(&self, variant: Variant, form: &str) -> PathBuf {
        self.data_dir
            .join(SPRITES_DIR)
            .join(variant.name())
            .join(format!("{}.png", form))
    }

    pub fn art_path(&self, style: RenderStyle, variant: Variant, form: &str) -> PathBuf {
        self.art_dir(style, variant).join(format!("{}.txt", form))
    }

    fn art_dir(&self, style: RenderStyle, variant: Variant) -> PathBuf {
        self.data_dir
            .join(ART_DIR)
            .join(style.name())
            .join(variant.name())
    }

    /// Get rendered art, if cached.
    pub fn get_art(&self, style: RenderStyle, variant: Variant, form: &str) -> Option<String> {
        std::fs::read_to_string(self.art_path(style, variant, form)).ok()
    }

    /// Store rendered art.
    pub fn store_art(
        &self,
        style: RenderStyle,
        variant: Variant,
        form: &str,
        art: &str,
    ) -> Result<PathBuf, io::Error> {
        let path = self.art_path(style, variant, form);
        write_creating_parent(&path, art.as_bytes())?;
        Ok(path)
    }

    /// Get an extracted sprite, if cached.
    pub fn get_sprite(&self, variant: Variant, form: &str) -> Option<Vec<u8>> {
        std::fs::read(self.sprite_path(variant, form)).ok()
    }

    /// Store an extracted sprite.
    pub fn store_sprite(
        &self,
        variant: Variant,
        form: &str,
        data: &[u8],
    ) -> Result<PathBuf, io::Error> {
        let path = self.sprite_path(variant, form);
        write_creating_parent(&path, data)?;
        Ok(path)
    }

    /// Store the extracted form database.
    pub fn store_database(&self, data: &[u8]) -> Result<PathBuf, io::Error> {
        let path = self.database_path();
        write_creating_parent(&path, data)?;
        Ok(path)
    }

    /// Whether the form database has been extracted.
    pub fn has_database(&self) -> bool {
        self.database_path().is_file()
    }

    /// List all form names from the cached database.
    ///
    /// # Errors
    ///
    /// Returns `SpriteError::DatabaseMissing` if the database has not been
    /// extracted yet.
    pub fn forms(&self) -> Result<Vec<String>, SpriteError> {
        let data = match std::fs::read(self.database_path()) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SpriteError::DatabaseMissing)
            }
            Err(e) => return Err(e.into()),
        };
        parse_forms(&data)
    }

    /// Generate the hex SHA-256 digest of a file.
    pub fn hash_file(path: &Path) -> Result<String, io::Error> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }

    /// Hash the cached archive and record the digest next to it.
    pub fn record_archive_checksum(&self) -> Result<String, io::Error> {
        let digest = Self::hash_file(&self.archive_path())?;
        std::fs::write(self.checksum_path(), &digest)?;
        Ok(digest)
    }

    /// Check the cached archive against its recorded checksum.
    pub fn archive_status(&self) -> Result<ArchiveStatus, io::Error> {
        let archive = self.archive_path();
        if !archive.is_file() {
            return Ok(ArchiveStatus::Missing);
        }

        let expected = match std::fs::read_to_string(self.checksum_path()) {
            Ok(expected) => expected,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ArchiveStatus::Unverified)
            }
            Err(e) => return Err(e),
        };

        if Self::hash_file(&archive)? == expected.trim() {
            Ok(ArchiveStatus::Valid)
        } else {
            Ok(ArchiveStatus::Corrupt)
        }
    }

    /// Remove the archive and its checksum.
    pub fn remove_archive(&self) -> Result<(), io::Error> {
        remove_if_exists(&self.archive_path())?;
        remove_if_exists(&self.checksum_path())
    }

    /// List rendered art per style and variant.
    pub fn list_entries(&self) -> Result<Vec<CacheEntry>, io::Error> {
        let mut entries = Vec::new();

        for style in RenderStyle::ALL {
            for variant in Variant::ALL {
                let dir = self.art_dir(style, variant);
                let (files, size_bytes) = count_files(&dir, Some("txt"))?;
                if files == 0 {
                    continue;
                }
                entries.push(CacheEntry {
                    style,
                    variant,
                    files,
                    size_bytes,
                    path: dir,
                });
            }
        }

        Ok(entries)
    }

    /// Get total size of everything in the data directory in bytes.
    pub fn total_size_bytes(&self) -> Result<u64, io::Error> {
        Ok(count_files(&self.data_dir, None)?.1)
    }

    /// Remove all rendered art, keeping the archive and extracted sprites.
    /// Returns the number of files removed.
    pub fn clear_art(&self) -> Result<usize, io::Error> {
        remove_tree(&self.data_dir.join(ART_DIR))
    }

    /// Remove everything in the data directory.
    /// Returns the number of files removed.
    pub fn clear_all(&self) -> Result<usize, io::Error> {
        remove_tree(&self.data_dir)
    }
}

/// Rendered art for one style and variant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub style: RenderStyle,
    pub variant: Variant,
    /// Number of rendered forms
    pub files: usize,
    /// Total size of the rendered files in bytes
    pub size_bytes: u64,
    /// Directory holding the files
    pub path: PathBuf,
}

/// Get the default data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("pokesprite")
}

fn write_creating_parent(path: &Path, data: &[u8]) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

fn remove_if_exists(path: &Path) -> Result<(), io::Error> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Count files (recursively) and their total size, optionally filtered by extension.
fn count_files(dir: &Path, extension: Option<&str>) -> Result<(usize, u64), io::Error> {
    if !dir.is_dir() {
        return Ok((0, 0));
    }

    let mut files = 0;
    let mut size = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            let (sub_files, sub_size) = count_files(&path, extension)?;
            files += sub_files;
            size += sub_size;
        } else if metadata.is_file()
            && extension.map_or(true, |ext| {
                path.extension().and_then(|e| e.to_str()) == Some(ext)
            })
        {
            files += 1;
            size += metadata.len();
        }
    }

    Ok((files, size))
}

/// Remove the contents of `dir` recursively, returning the number of files removed.
/// The directory itself is kept.
fn remove_tree(dir: &Path) -> Result<usize, io::Error> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            count += remove_tree(&path)?;
            std::fs::remove_dir(&path)?;
        } else {
            std::fs::remove_file(&path)?;
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_cache() -> (TempDir, SpriteCache) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache = SpriteCache::new_initialized(temp_dir.path().join("data"))
            .expect("Failed to create cache");
        (temp_dir, cache)
    }

    #[test]
    fn test_art_path_layout() {
        let cache = SpriteCache::new(PathBuf::from("/data"));
        assert_eq!(
            cache.art_path(RenderStyle::Dots, Variant::Shiny, "ampharos-mega"),
            PathBuf::from("/data/txt/dots/shiny/ampharos-mega.txt")
        );
        assert_eq!(
            cache.sprite_path(Variant::Regular, "pikachu"),
            PathBuf::from("/data/sprites/regular/pikachu.png")
        );
    }

    #[test]
    fn test_store_and_get_art() {
        let (_dir, cache) = temp_cache();
        assert!(cache.get_art(RenderStyle::Small, Variant::Regular, "pikachu").is_none());

        let path = cache
            .store_art(RenderStyle::Small, Variant::Regular, "pikachu", "art")
            .unwrap();
        assert!(path.exists());
        assert_eq!(
            cache.get_art(RenderStyle::Small, Variant::Regular, "pikachu"),
            Some("art".to_string())
        );
        assert!(cache.get_art(RenderStyle::Large, Variant::Regular, "pikachu").is_none());
    }

    #[test]
    fn test_forms_without_database() {
        let (_dir, cache) = temp_cache();
        assert!(matches!(cache.forms(), Err(SpriteError::DatabaseMissing)));
    }

    #[test]
    fn test_forms_from_stored_database() {
        let (_dir, cache) = temp_cache();
        cache
            .store_database(
                br#"{"001": {"slug": {"eng": "bulbasaur"}, "gen-8": {"forms": {"$": {}}}}}"#,
            )
            .unwrap();
        assert!(cache.has_database());
        assert_eq!(cache.forms().unwrap(), vec!["bulbasaur"]);
    }

    #[test]
    fn test_archive_status_transitions() {
        let (_dir, cache) = temp_cache();
        assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Missing);

        std::fs::write(cache.archive_path(), b"zip bytes").unwrap();
        assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Unverified);

        cache.record_archive_checksum().unwrap();
        assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Valid);

        std::fs::write(cache.archive_path(), b"truncated").unwrap();
        assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Corrupt);

        cache.remove_archive().unwrap();
        assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Missing);
    }

    #[test]
    fn test_hash_file_is_sha256_hex() {
        let (dir, _cache) = temp_cache();
        let path = dir.path().join("abc");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            SpriteCache::hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_list_entries_and_clear_art() {
        let (_dir, cache) = temp_cache();
        cache.store_art(RenderStyle::Small, Variant::Regular, "a", "12").unwrap();
        cache.store_art(RenderStyle::Small, Variant::Regular, "b", "345").unwrap();
        cache.store_art(RenderStyle::Dots, Variant::Shiny, "a", "6").unwrap();
        cache.store_sprite(Variant::Regular, "a", b"png").unwrap();

        let entries = cache.list_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].style, RenderStyle::Small);
        assert_eq!(entries[0].variant, Variant::Regular);
        assert_eq!(entries[0].files, 2);
        assert_eq!(entries[0].size_bytes, 5);
        assert_eq!(entries[1].style, RenderStyle::Dots);
        assert_eq!(entries[1].files, 1);

        assert_eq!(cache.total_size_bytes().unwrap(), 9);

        assert_eq!(cache.clear_art().unwrap(), 3);
        assert!(cache.list_entries().unwrap().is_empty());
        assert!(cache.get_sprite(Variant::Regular, "a").is_some());
    }

    #[test]
    fn test_clear_all() {
        let (_dir, cache) = temp_cache();
        cache.store_art(RenderStyle::Large, Variant::Shiny, "a", "x").unwrap();
        cache.store_database(b"{}").unwrap();
        assert_eq!(cache.clear_all().unwrap(), 2);
        assert_eq!(cache.total_size_bytes().unwrap(), 0);
        assert!(cache.data_dir().exists());
    }

    #[test]
    fn test_clear_missing_dir() {
        let cache = SpriteCache::new(PathBuf::from("/nonexistent/pokesprite-test"));
        assert_eq!(cache.clear_all().unwrap(), 0);
        assert!(cache.list_entries().unwrap().is_empty());
    }
}
