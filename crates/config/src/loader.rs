use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::GallerySaverConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "gallery-saver.toml",
    "gallery-saver.yaml",
    "gallery-saver.yml",
    "gallery-saver.json",
];

const APP_NAME: &str = "gallery-saver";

/// Load config from the given path (any supported format), then validate it.
pub fn load_config(path: &Path) -> Result<GallerySaverConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    let config = parse_config(&raw, path)?;
    config.validate()?;
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./gallery-saver.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/gallery-saver/gallery-saver.{toml,yaml,yml,json}` (user-global)
///
/// Returns `GallerySaverConfig::default()` if no usable config file is found.
pub fn discover_and_load() -> GallerySaverConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    GallerySaverConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/gallery-saver/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().to_path_buf())
}

/// Returns the user data directory, used as the storage root when none is
/// configured.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.data_dir().to_path_buf())
}

/// Apply `GALLERY_SAVER_*` environment overrides on top of a loaded config.
///
/// Recognised variables: `GALLERY_SAVER_ROOT`, `GALLERY_SAVER_DEFAULT_ALBUM`,
/// `GALLERY_SAVER_API_LEVEL`, `GALLERY_SAVER_JPEG_QUALITY`. Unparseable values
/// are ignored with a warning.
pub fn apply_env_overrides(config: GallerySaverConfig) -> GallerySaverConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: GallerySaverConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> GallerySaverConfig {
    if let Some(root) = lookup("GALLERY_SAVER_ROOT").filter(|v| !v.is_empty()) {
        config.storage.root = Some(PathBuf::from(root));
    }
    if let Some(album) = lookup("GALLERY_SAVER_DEFAULT_ALBUM").filter(|v| !v.trim().is_empty()) {
        config.storage.default_album = album;
    }
    if let Some(raw) = lookup("GALLERY_SAVER_API_LEVEL") {
        match raw.trim().parse() {
            Ok(level) => config.platform.api_level = level,
            Err(e) => warn!(value = %raw, error = %e, "ignoring GALLERY_SAVER_API_LEVEL"),
        }
    }
    if let Some(raw) = lookup("GALLERY_SAVER_JPEG_QUALITY") {
        match raw.trim().parse::<u8>() {
            Ok(q) if (1..=100).contains(&q) => config.images.jpeg_quality = q,
            _ => warn!(value = %raw, "ignoring GALLERY_SAVER_JPEG_QUALITY"),
        }
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> Result<GallerySaverConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}
