//! Media-store record types and destination resolution.

use std::path::{Component, Path, PathBuf};

use {
    chrono::{DateTime, Utc},
    gallery_saver_config::{PlatformConfig, SCOPED_STORAGE_API_LEVEL},
};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn uri_segment(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "video",
        }
    }
}

/// Top-level shared storage folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRoot {
    Dcim,
    Pictures,
    Movies,
}

impl StorageRoot {
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Dcim => "DCIM",
            Self::Pictures => "Pictures",
            Self::Movies => "Movies",
        }
    }

    /// DCIM when requested, otherwise the kind's general-purpose folder.
    #[must_use]
    pub fn select(kind: MediaKind, to_dcim: bool) -> Self {
        match (to_dcim, kind) {
            (true, _) => Self::Dcim,
            (false, MediaKind::Image) => Self::Pictures,
            (false, MediaKind::Video) => Self::Movies,
        }
    }
}

/// Album folder under one of the storage roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub root: StorageRoot,
    pub album: String,
}

impl Destination {
    /// Resolve the destination for a save request.
    ///
    /// A blank album falls back to `default_album`. Album names may contain
    /// nested folders but never absolute paths or `..` components.
    pub fn resolve(
        kind: MediaKind,
        to_dcim: bool,
        album_name: &str,
        default_album: &str,
    ) -> Result<Self> {
        let album = match album_name.trim() {
            "" => default_album,
            _ => album_name,
        };
        let escapes = Path::new(album)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(Error::invalid_input(format!(
                "album name must stay inside the storage root: {album:?}"
            )));
        }
        Ok(Self {
            root: StorageRoot::select(kind, to_dcim),
            album: album.to_string(),
        })
    }

    /// Folder relative to the storage root, e.g. `Pictures/Trips`.
    #[must_use]
    pub fn relative_dir(&self) -> String {
        format!("{}/{}", self.root.dir_name(), self.album)
    }
}

/// Platform generation descriptor, injected once per saver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub api_level: u32,
}

impl PlatformCapabilities {
    #[must_use]
    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    #[must_use]
    pub fn scoped_storage(&self) -> bool {
        self.api_level >= SCOPED_STORAGE_API_LEVEL
    }

    /// Pick the location variant for a file named `display_name` in
    /// `destination`.
    #[must_use]
    pub fn locate(
        &self,
        storage_root: &Path,
        destination: &Destination,
        display_name: &str,
    ) -> MediaLocation {
        if self.scoped_storage() {
            MediaLocation::Scoped {
                relative_path: destination.relative_dir(),
            }
        } else {
            MediaLocation::Legacy {
                absolute_path: storage_root
                    .join(destination.relative_dir())
                    .join(display_name),
            }
        }
    }
}

impl From<&PlatformConfig> for PlatformCapabilities {
    fn from(config: &PlatformConfig) -> Self {
        Self::new(config.api_level)
    }
}

/// Where a record's content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// Pre-scoped-storage: the full data path of the file.
    Legacy { absolute_path: PathBuf },
    /// Scoped storage: folder relative to the storage root.
    Scoped { relative_path: String },
}

/// Metadata handed to the media store for one save.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub kind: MediaKind,
    pub title: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub date_taken: DateTime<Utc>,
    pub location: MediaLocation,
}

impl MediaRecord {
    #[must_use]
    pub fn new(
        kind: MediaKind,
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        location: MediaLocation,
    ) -> Self {
        let display_name = display_name.into();
        let title = Path::new(&display_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&display_name)
            .to_string();
        let now = Utc::now();
        Self {
            kind,
            title,
            display_name,
            mime_type: mime_type.into(),
            size_bytes,
            created_at: now,
            date_taken: now,
            location,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_follow_kind_and_dcim_flag() {
        assert_eq!(StorageRoot::select(MediaKind::Image, false), StorageRoot::Pictures);
        assert_eq!(StorageRoot::select(MediaKind::Video, false), StorageRoot::Movies);
        assert_eq!(StorageRoot::select(MediaKind::Image, true), StorageRoot::Dcim);
        assert_eq!(StorageRoot::select(MediaKind::Video, true), StorageRoot::Dcim);
    }

    #[test]
    fn literal_album_name() {
        let dest = Destination::resolve(MediaKind::Image, false, "Trips", "GallerySaver").unwrap();
        assert_eq!(dest.relative_dir(), "Pictures/Trips");
    }

    #[test]
    fn blank_album_uses_default() {
        for blank in ["", "   "] {
            let dest = Destination::resolve(MediaKind::Image, true, blank, "GallerySaver").unwrap();
            assert_eq!(dest.relative_dir(), "DCIM/GallerySaver");
        }
    }

    #[test]
    fn nested_album_allowed_but_not_escapes() {
        let dest = Destination::resolve(MediaKind::Video, false, "2024/Summer", "x").unwrap();
        assert_eq!(dest.relative_dir(), "Movies/2024/Summer");

        for bad in ["../outside", "/etc", "a/../../b"] {
            let err = Destination::resolve(MediaKind::Image, false, bad, "x").unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }), "{bad}");
        }
    }

    #[test]
    fn scoped_storage_starts_at_api_29() {
        assert!(!PlatformCapabilities::new(28).scoped_storage());
        assert!(PlatformCapabilities::new(29).scoped_storage());
        let from_config = PlatformCapabilities::from(&PlatformConfig::default());
        assert!(from_config.scoped_storage());
    }

    #[test]
    fn capability_selects_location_variant() {
        let dest = Destination::resolve(MediaKind::Image, false, "Trips", "x").unwrap();
        let root = Path::new("/storage/emulated/0");

        let scoped = PlatformCapabilities::new(33).locate(root, &dest, "a.jpg");
        assert_eq!(scoped, MediaLocation::Scoped {
            relative_path: "Pictures/Trips".into()
        });

        let legacy = PlatformCapabilities::new(28).locate(root, &dest, "a.jpg");
        assert_eq!(legacy, MediaLocation::Legacy {
            absolute_path: PathBuf::from("/storage/emulated/0/Pictures/Trips/a.jpg")
        });
    }

    #[test]
    fn record_title_is_file_stem() {
        let record = MediaRecord::new(
            MediaKind::Image,
            "holiday.jpg",
            "image/jpeg",
            12,
            MediaLocation::Scoped {
                relative_path: "Pictures/x".into(),
            },
        );
        assert_eq!(record.title, "holiday");
        assert_eq!(record.created_at, record.date_taken);
    }
}
