use std::{error::Error as StdError, path::PathBuf};

/// Everything that can go wrong while saving media.
///
/// The boolean entry points on [`crate::GallerySaver`] collapse all of these
/// into `false`; the `try_*` variants surface them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read orientation metadata: {0}")]
    MetadataRead(String),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("{context}: {source}")]
    Insertion {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("storage permission denied")]
    PermissionDenied,
    #[error("{message}")]
    InvalidInput { message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn insertion<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Insertion {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn metadata(message: impl std::fmt::Display) -> Self {
        Self::MetadataRead(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
