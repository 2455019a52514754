//! Configuration loading, env substitution and env overrides.
//!
//! Config files: `gallery-saver.toml`, `gallery-saver.yaml` or
//! `gallery-saver.json`, searched in `./` then `~/.config/gallery-saver/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values and
//! `GALLERY_SAVER_*` overrides applied after parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, data_dir, discover_and_load, load_config},
    schema::{
        DEFAULT_ALBUM, GallerySaverConfig, ImageConfig, PlatformConfig, SCOPED_STORAGE_API_LEVEL,
        StorageConfig,
    },
};
