//! Save orchestration: read source, correct orientation, insert into the
//! media store.
//!
//! Every request runs read, rotate and insert as one unit on tokio's
//! blocking pool and reports a single boolean. A started save cannot be
//! cancelled: dropping the future returned by [`GallerySaver::save_image`]
//! leaves the blocking unit running to completion.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    gallery_saver_config::GallerySaverConfig,
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result, image_ops, mime,
    orientation::{self, OrientationTag},
    permission::{AlwaysGranted, PermissionGate},
    record::{Destination, MediaKind, MediaRecord, PlatformCapabilities},
    rotate,
    store::{FsMediaStore, MediaStore, StoredMedia},
};

/// Read buffer used while streaming videos into the store.
pub const VIDEO_COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// One save request, as received from the application shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    /// Album folder; blank selects the configured default album.
    pub album_name: String,
    /// Save under DCIM instead of Pictures/Movies.
    pub to_dcim: bool,
}

impl SaveRequest {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, album_name: impl Into<String>, to_dcim: bool) -> Self {
        Self {
            path: path.into(),
            album_name: album_name.into(),
            to_dcim,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaverOptions {
    /// Root of the shared storage; legacy records carry paths below it.
    pub storage_root: PathBuf,
    pub default_album: String,
    pub jpeg_quality: u8,
    pub correct_orientation: bool,
    pub legacy_thumbnails: bool,
    pub capabilities: PlatformCapabilities,
}

impl SaverOptions {
    /// Options with default image handling for the given root and platform.
    #[must_use]
    pub fn new(storage_root: impl Into<PathBuf>, capabilities: PlatformCapabilities) -> Self {
        let defaults = GallerySaverConfig::default();
        Self {
            storage_root: storage_root.into(),
            default_album: defaults.storage.default_album,
            jpeg_quality: defaults.images.jpeg_quality,
            correct_orientation: defaults.images.correct_orientation,
            legacy_thumbnails: defaults.images.legacy_thumbnails,
            capabilities,
        }
    }

    /// Build options from loaded config. Without a configured root the user
    /// data directory's `media/` folder is used.
    pub fn from_config(config: &GallerySaverConfig) -> Result<Self> {
        let storage_root = config
            .storage
            .root
            .clone()
            .or_else(|| gallery_saver_config::data_dir().map(|d| d.join("media")))
            .ok_or_else(|| Error::invalid_input("no storage root configured"))?;
        Ok(Self {
            storage_root,
            default_album: config.storage.default_album.clone(),
            jpeg_quality: config.images.jpeg_quality,
            correct_orientation: config.images.correct_orientation,
            legacy_thumbnails: config.images.legacy_thumbnails,
            capabilities: PlatformCapabilities::from(&config.platform),
        })
    }
}

/// Entry point for saving images and videos into a media store.
#[derive(Clone)]
pub struct GallerySaver {
    store: Arc<dyn MediaStore>,
    permissions: Arc<dyn PermissionGate>,
    options: Arc<SaverOptions>,
}

impl GallerySaver {
    #[must_use]
    pub fn new(
        store: Arc<dyn MediaStore>,
        permissions: Arc<dyn PermissionGate>,
        options: SaverOptions,
    ) -> Self {
        Self {
            store,
            permissions,
            options: Arc::new(options),
        }
    }

    /// Saver backed by a [`FsMediaStore`] at the options' storage root, for
    /// hosts without a permission model.
    #[must_use]
    pub fn with_fs_store(options: SaverOptions) -> Self {
        let store = Arc::new(FsMediaStore::new(&options.storage_root));
        Self::new(store, Arc::new(AlwaysGranted), options)
    }

    #[must_use]
    pub fn options(&self) -> &SaverOptions {
        &self.options
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn MediaStore> {
        &self.store
    }

    /// Check the permission gate, then save the image on the blocking pool.
    pub async fn save_image(&self, request: SaveRequest) -> bool {
        self.save(MediaKind::Image, request).await
    }

    /// Check the permission gate, then save the video on the blocking pool.
    pub async fn save_video(&self, request: SaveRequest) -> bool {
        self.save(MediaKind::Video, request).await
    }

    async fn save(&self, kind: MediaKind, request: SaveRequest) -> bool {
        if let Err(e) = self.ensure_permission().await {
            warn!(?kind, path = %request.path.display(), error = %e, "save refused");
            return false;
        }

        let saver = self.clone();
        let worker = tokio::task::spawn_blocking(move || match kind {
            MediaKind::Image => saver.insert_image(&request),
            MediaKind::Video => saver.insert_video(&request),
        });
        match worker.await {
            Ok(saved) => saved,
            Err(e) => {
                error!(?kind, error = %e, "save worker did not complete");
                false
            },
        }
    }

    /// Legacy platforms need the write permission; scoped storage does not.
    pub async fn ensure_permission(&self) -> Result<()> {
        if self.options.capabilities.scoped_storage() || self.permissions.status().is_granted() {
            return Ok(());
        }
        debug!("requesting storage permission");
        if self.permissions.request().await.is_granted() {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    /// Save an image synchronously, collapsing any failure into `false`.
    pub fn insert_image(&self, request: &SaveRequest) -> bool {
        report(MediaKind::Image, request, self.try_insert_image(request))
    }

    /// Save a video synchronously, collapsing any failure into `false`.
    pub fn insert_video(&self, request: &SaveRequest) -> bool {
        report(MediaKind::Video, request, self.try_insert_video(request))
    }

    /// Save an image, surfacing the failure cause.
    ///
    /// A rotation that cannot decode the source is skipped and the original
    /// bytes are saved.
    pub fn try_insert_image(&self, request: &SaveRequest) -> Result<StoredMedia> {
        let destination = Destination::resolve(
            MediaKind::Image,
            request.to_dcim,
            &request.album_name,
            &self.options.default_album,
        )?;
        let mut display_name = display_name_of(&request.path)?;

        let mut buffer = std::fs::read(&request.path).map_err(|source| Error::SourceRead {
            path: request.path.clone(),
            source,
        })?;
        let mut mime_type = mime::mime_from_path(&request.path)
            .or_else(|| image_ops::sniff_media_type(&buffer))
            .unwrap_or(mime::OCTET_STREAM);

        if self.options.correct_orientation {
            let orientation = orientation::resolve_orientation(&request.path);
            if let Some(rotated) = self.rotate(&buffer, orientation, &request.path) {
                buffer = rotated;
                mime_type = "image/jpeg";
                display_name = jpeg_name(&display_name);
            }
        }

        let location = self.options.capabilities.locate(
            &self.options.storage_root,
            &destination,
            &display_name,
        );
        let record = MediaRecord::new(
            MediaKind::Image,
            display_name,
            mime_type,
            buffer.len() as u64,
            location,
        );
        let mut stored = self.write_record(record, buffer.as_slice())?;

        if self.options.legacy_thumbnails && !self.options.capabilities.scoped_storage() {
            stored.thumbnail = self.store_thumbnail(&stored, &buffer);
        }
        Ok(stored)
    }

    /// Save a video by streaming it into the store, surfacing the failure
    /// cause.
    pub fn try_insert_video(&self, request: &SaveRequest) -> Result<StoredMedia> {
        let destination = Destination::resolve(
            MediaKind::Video,
            request.to_dcim,
            &request.album_name,
            &self.options.default_album,
        )?;
        let display_name = display_name_of(&request.path)?;

        let source_err = |source: io::Error| Error::SourceRead {
            path: request.path.clone(),
            source,
        };
        let file = File::open(&request.path).map_err(source_err)?;
        let size = file.metadata().map_err(source_err)?.len();
        let mime_type = mime::mime_from_path(&request.path).unwrap_or(mime::OCTET_STREAM);

        let location = self.options.capabilities.locate(
            &self.options.storage_root,
            &destination,
            &display_name,
        );
        let record = MediaRecord::new(MediaKind::Video, display_name, mime_type, size, location);
        self.write_record(
            record,
            BufReader::with_capacity(VIDEO_COPY_BUFFER_SIZE, file),
        )
    }

    fn rotate(&self, buffer: &[u8], orientation: OrientationTag, path: &Path) -> Option<Vec<u8>> {
        if !orientation.needs_rotation() {
            return None;
        }
        let degrees = orientation.degrees();
        match rotate::rotate_if_needed_with_quality(buffer, degrees, self.options.jpeg_quality) {
            Ok(rotated) => {
                debug!(path = %path.display(), degrees, "applied orientation correction");
                rotated
            },
            Err(e) => {
                warn!(path = %path.display(), degrees, error = %e, "rotation failed, saving original bytes");
                None
            },
        }
    }

    fn write_record<R: Read>(&self, record: MediaRecord, mut content: R) -> Result<StoredMedia> {
        let mut pending = self.store.insert(record)?;
        io::copy(&mut content, &mut pending)
            .map_err(|e| Error::insertion("writing media content", e))?;
        pending.commit()
    }

    fn store_thumbnail(&self, stored: &StoredMedia, image: &[u8]) -> Option<PathBuf> {
        let result =
            image_ops::make_thumbnail(image).and_then(|jpeg| self.store.insert_thumbnail(stored, &jpeg));
        match result {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(id = stored.id, error = %e, "failed to store thumbnail");
                None
            },
        }
    }
}

fn report(kind: MediaKind, request: &SaveRequest, outcome: Result<StoredMedia>) -> bool {
    match outcome {
        Ok(stored) => {
            info!(
                ?kind,
                source = %request.path.display(),
                uri = %stored.uri,
                stored_at = %stored.path.display(),
                bytes = stored.record.size_bytes,
                "media saved"
            );
            true
        },
        Err(e) => {
            error!(
                ?kind,
                source = %request.path.display(),
                album = %request.album_name,
                to_dcim = request.to_dcim,
                error = %e,
                "failed to save media"
            );
            false
        },
    }
}

fn display_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_input(format!("{} has no file name", path.display())))
}

/// Display name for a buffer that has been re-encoded as JPEG.
fn jpeg_name(name: &str) -> String {
    match mime::extension(Path::new(name)).as_deref() {
        Some("jpg" | "jpeg" | "jpe") => name.to_string(),
        _ => Path::new(name).with_extension("jpg").to_string_lossy().into_owned(),
    }
}
