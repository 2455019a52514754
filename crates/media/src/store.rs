//! Media-store collaborator and a filesystem-backed implementation.
//!
//! [`FsMediaStore`] emulates a device's shared storage under one root
//! directory (`DCIM/`, `Pictures/`, `Movies/`) and keeps an in-memory index
//! of committed records.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    record::{MediaLocation, MediaRecord},
};

/// Folder under the storage root where legacy thumbnails are written.
const THUMBNAIL_DIR: &str = "DCIM/.thumbnails";

/// Give up picking a free file name after this many collisions.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A committed media-store entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    pub id: u64,
    pub uri: String,
    pub path: PathBuf,
    pub record: MediaRecord,
    pub thumbnail: Option<PathBuf>,
}

/// Writable handle for a record that is not visible in the store yet.
///
/// Dropping the handle without calling [`PendingMedia::commit`] discards the
/// pending record and any bytes written so far.
pub trait PendingMedia: Write {
    fn commit(self: Box<Self>) -> Result<StoredMedia>;
}

/// Shared media index: accepts a record, hands back a writable handle.
pub trait MediaStore: Send + Sync {
    fn insert(&self, record: MediaRecord) -> Result<Box<dyn PendingMedia + '_>>;

    /// Attach a JPEG thumbnail to a committed entry, returning where it went.
    fn insert_thumbnail(&self, media: &StoredMedia, jpeg: &[u8]) -> Result<PathBuf>;

    /// Snapshot of every committed entry, oldest first.
    fn records(&self) -> Vec<StoredMedia>;
}

#[derive(Debug, Default)]
struct Index {
    next_id: u64,
    entries: Vec<StoredMedia>,
}

pub struct FsMediaStore {
    root: PathBuf,
    index: Mutex<Index>,
}

impl FsMediaStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Mutex::new(Index {
                next_id: 1,
                entries: Vec::new(),
            }),
        }
    }

    /// Directory and requested file name for a record's location.
    fn target_of(&self, record: &MediaRecord) -> Result<(PathBuf, String)> {
        match &record.location {
            MediaLocation::Scoped { relative_path } => {
                Ok((self.root.join(relative_path), record.display_name.clone()))
            },
            MediaLocation::Legacy { absolute_path } => {
                if !absolute_path.starts_with(&self.root) {
                    return Err(Error::invalid_input(format!(
                        "legacy path {} is outside the storage root",
                        absolute_path.display()
                    )));
                }
                let dir = absolute_path
                    .parent()
                    .ok_or_else(|| Error::invalid_input("legacy path has no parent directory"))?;
                let name = absolute_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| Error::invalid_input("legacy path has no file name"))?;
                Ok((dir.to_path_buf(), name.to_string()))
            },
        }
    }

    fn register(&self, mut record: MediaRecord, path: PathBuf) -> StoredMedia {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let id = index.next_id;
        index.next_id += 1;

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            record.display_name = name.to_string();
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            record.title = stem.to_string();
        }
        if let MediaLocation::Legacy { absolute_path } = &mut record.location {
            absolute_path.clone_from(&path);
        }

        let stored = StoredMedia {
            id,
            uri: format!("content://media/external/{}/media/{id}", record.kind.uri_segment()),
            path,
            record,
            thumbnail: None,
        };
        index.entries.push(stored.clone());
        stored
    }
}

impl MediaStore for FsMediaStore {
    fn insert(&self, record: MediaRecord) -> Result<Box<dyn PendingMedia + '_>> {
        let (dir, name) = self.target_of(&record)?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::insertion(format!("creating {}", dir.display()), e))?;
        let (file, path) = create_unique(&dir, &name)?;
        debug!(path = %path.display(), mime = %record.mime_type, "pending media record created");
        Ok(Box::new(FsPendingMedia {
            store: self,
            writer: Some(BufWriter::new(file)),
            path,
            record: Some(record),
            written: 0,
        }))
    }

    fn insert_thumbnail(&self, media: &StoredMedia, jpeg: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(THUMBNAIL_DIR);
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::insertion(format!("creating {}", dir.display()), e))?;
        let path = dir.join(format!("{}.jpg", media.id));
        std::fs::write(&path, jpeg)
            .map_err(|e| Error::insertion(format!("writing thumbnail {}", path.display()), e))?;

        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = index.entries.iter_mut().find(|e| e.id == media.id) {
            entry.thumbnail = Some(path.clone());
        }
        Ok(path)
    }

    fn records(&self) -> Vec<StoredMedia> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }
}

/// Create `name` in `dir`, or `stem (n).ext` if that is taken.
fn create_unique(dir: &Path, name: &str) -> Result<(File, PathBuf)> {
    let base = Path::new(name);
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = base.extension().and_then(|e| e.to_str());

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = match (attempt, ext) {
            (0, _) => name.to_string(),
            (n, Some(ext)) => format!("{stem} ({n}).{ext}"),
            (n, None) => format!("{stem} ({n})"),
        };
        let path = dir.join(candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(Error::insertion(format!("creating {}", path.display()), e));
            },
        }
    }

    Err(Error::insertion(
        format!("no free file name for {name} in {}", dir.display()),
        io::Error::from(io::ErrorKind::AlreadyExists),
    ))
}

struct FsPendingMedia<'a> {
    store: &'a FsMediaStore,
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    record: Option<MediaRecord>,
    written: u64,
}

impl Write for FsPendingMedia<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("pending media already closed"))?;
        let n = writer.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl PendingMedia for FsPendingMedia<'_> {
    fn commit(mut self: Box<Self>) -> Result<StoredMedia> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| Error::invalid_input("pending media already closed"))?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::insertion("flushing media content", e.into_error()))?;
        file.sync_all()
            .map_err(|e| Error::insertion("syncing media content", e))?;
        drop(file);

        let mut record = self
            .record
            .take()
            .ok_or_else(|| Error::invalid_input("pending media already committed"))?;
        if record.size_bytes != self.written {
            warn!(
                declared = record.size_bytes,
                written = self.written,
                "media size differs from declared size"
            );
            record.size_bytes = self.written;
        }

        let stored = self.store.register(record, self.path.clone());
        debug!(id = stored.id, path = %stored.path.display(), "media record committed");
        Ok(stored)
    }
}

impl Drop for FsPendingMedia<'_> {
    fn drop(&mut self) {
        // Committed handles have already given up their record.
        if self.record.is_none() {
            return;
        }
        drop(self.writer.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "discarded pending media record"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to discard pending media")
            },
        }
    }
}
