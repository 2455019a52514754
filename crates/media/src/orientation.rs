//! EXIF orientation lookup.
//!
//! Only the four pure rotations matter here; mirrored orientations
//! (EXIF codes 2, 4, 5 and 7) are treated like a normal image.

use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

use tracing::debug;

use crate::{Error, Result};

/// Rotation an image needs for correct display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrientationTag {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl OrientationTag {
    /// Map a raw EXIF orientation code to a tag.
    #[must_use]
    pub fn from_exif(code: u32) -> Self {
        match code {
            6 => Self::Rotate90,
            3 => Self::Rotate180,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Clockwise rotation in degrees.
    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    #[must_use]
    pub fn needs_rotation(self) -> bool {
        self != Self::Normal
    }
}

/// Read the orientation tag of the image at `path`, surfacing every failure.
pub fn read_orientation(path: &Path) -> Result<OrientationTag> {
    let file = File::open(path).map_err(|e| Error::metadata(format!("{}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    read_from_container(&mut reader)
}

/// Resolve the orientation of the image at `path`.
///
/// Missing files, unsupported containers and absent tags all resolve to
/// [`OrientationTag::Normal`].
pub fn resolve_orientation(path: &Path) -> OrientationTag {
    match read_orientation(path) {
        Ok(tag) => tag,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no usable orientation metadata, assuming normal");
            OrientationTag::Normal
        },
    }
}

/// Same as [`resolve_orientation`] for an in-memory image.
pub fn orientation_from_bytes(data: &[u8]) -> OrientationTag {
    match read_from_container(&mut Cursor::new(data)) {
        Ok(tag) => tag,
        Err(e) => {
            debug!(error = %e, "no usable orientation metadata, assuming normal");
            OrientationTag::Normal
        },
    }
}

fn read_from_container<R: std::io::BufRead + std::io::Seek>(reader: &mut R) -> Result<OrientationTag> {
    let exif = exif::Reader::new()
        .read_from_container(reader)
        .map_err(Error::metadata)?;
    let field = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .ok_or_else(|| Error::metadata("no orientation field"))?;
    let code = field
        .value
        .get_uint(0)
        .ok_or_else(|| Error::metadata("orientation field is not an integer"))?;
    Ok(OrientationTag::from_exif(code))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::test_support};

    fn tagged_file(dir: &Path, code: u16) -> std::path::PathBuf {
        let path = dir.join(format!("tagged-{code}.jpg"));
        std::fs::write(&path, test_support::with_orientation(&test_support::jpeg(8, 4), code))
            .unwrap();
        path
    }

    #[test]
    fn maps_exif_codes() {
        assert_eq!(OrientationTag::from_exif(1), OrientationTag::Normal);
        assert_eq!(OrientationTag::from_exif(6), OrientationTag::Rotate90);
        assert_eq!(OrientationTag::from_exif(3), OrientationTag::Rotate180);
        assert_eq!(OrientationTag::from_exif(8), OrientationTag::Rotate270);
        for mirrored in [2, 4, 5, 7, 0, 9, 42] {
            assert_eq!(OrientationTag::from_exif(mirrored), OrientationTag::Normal);
        }
    }

    #[test]
    fn degrees_per_tag() {
        assert_eq!(OrientationTag::Normal.degrees(), 0);
        assert_eq!(OrientationTag::Rotate90.degrees(), 90);
        assert_eq!(OrientationTag::Rotate180.degrees(), 180);
        assert_eq!(OrientationTag::Rotate270.degrees(), 270);
        assert!(!OrientationTag::Normal.needs_rotation());
        assert!(OrientationTag::Rotate180.needs_rotation());
    }

    #[test]
    fn resolves_each_tagged_file() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [(1, 0), (6, 90), (3, 180), (8, 270)];
        for (code, degrees) in cases {
            let path = tagged_file(dir.path(), code);
            assert_eq!(resolve_orientation(&path).degrees(), degrees, "EXIF code {code}");
        }
    }

    #[test]
    fn missing_file_resolves_to_normal() {
        let path = Path::new("/nonexistent/photo.jpg");
        assert!(matches!(read_orientation(path), Err(Error::MetadataRead(_))));
        assert_eq!(resolve_orientation(path), OrientationTag::Normal);
    }

    #[test]
    fn untagged_images_resolve_to_normal() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = dir.path().join("plain.jpg");
        std::fs::write(&jpeg, test_support::jpeg(4, 4)).unwrap();
        let png = dir.path().join("plain.png");
        std::fs::write(&png, test_support::png(4, 4)).unwrap();

        assert!(read_orientation(&jpeg).is_err());
        assert_eq!(resolve_orientation(&jpeg), OrientationTag::Normal);
        assert_eq!(resolve_orientation(&png), OrientationTag::Normal);
    }

    #[test]
    fn reads_from_bytes() {
        let tagged = test_support::with_orientation(&test_support::jpeg(4, 2), 8);
        assert_eq!(orientation_from_bytes(&tagged), OrientationTag::Rotate270);
        assert_eq!(orientation_from_bytes(b"garbage"), OrientationTag::Normal);
    }
}
