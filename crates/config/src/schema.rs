//! Config schema types (storage, image handling, platform capabilities).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Album folder used when a save request carries a blank album name.
pub const DEFAULT_ALBUM: &str = "GallerySaver";

/// First platform API level with scoped (relative-path) media storage.
pub const SCOPED_STORAGE_API_LEVEL: u32 = 29;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySaverConfig {
    pub storage: StorageConfig,
    pub images: ImageConfig,
    pub platform: PlatformConfig,
}

/// Where the emulated shared storage lives and how albums are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the shared storage tree. `None` means the user data dir.
    pub root: Option<PathBuf>,
    pub default_album: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            default_album: DEFAULT_ALBUM.into(),
        }
    }
}

/// Image processing knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG quality (1-100) used when a rotated image is re-encoded.
    pub jpeg_quality: u8,
    /// Rotate images according to their EXIF orientation before saving.
    pub correct_orientation: bool,
    /// Produce a thumbnail next to each image on legacy platforms.
    pub legacy_thumbnails: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            correct_orientation: true,
            legacy_thumbnails: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub api_level: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self { api_level: 34 }
    }
}

impl GallerySaverConfig {
    /// Reject values the media pipeline cannot honor.
    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(crate::Error::message(format!(
                "images.jpeg_quality must be within 1..=100, got {}",
                self.images.jpeg_quality
            )));
        }
        if self.storage.default_album.trim().is_empty() {
            return Err(crate::Error::message(
                "storage.default_album must not be blank",
            ));
        }
        if self.storage.default_album.contains(['/', '\\']) {
            return Err(crate::Error::message(format!(
                "storage.default_album must be a single folder name, got {:?}",
                self.storage.default_album
            )));
        }
        Ok(())
    }
}
