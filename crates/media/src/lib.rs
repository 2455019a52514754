//! Media pipeline: EXIF orientation, rotation, MIME detection, media-store
//! insertion for images and videos, and the method-channel bridge.

pub mod channel;
pub mod error;
pub mod image_ops;
pub mod mime;
pub mod orientation;
pub mod permission;
pub mod record;
pub mod rotate;
pub mod saver;
pub mod store;

#[cfg(test)]
mod test_support;

pub use {
    error::{Error, Result},
    orientation::{OrientationTag, resolve_orientation},
    permission::{AlwaysGranted, PermissionGate, PermissionStatus},
    record::{Destination, MediaKind, MediaLocation, MediaRecord, PlatformCapabilities},
    rotate::rotate_if_needed,
    saver::{GallerySaver, SaveRequest, SaverOptions},
    store::{FsMediaStore, MediaStore, PendingMedia, StoredMedia},
};
