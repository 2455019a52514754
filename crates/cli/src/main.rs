mod save_commands;

use std::{path::PathBuf, process::ExitCode};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    gallery_saver_config::GallerySaverConfig,
    gallery_saver_media::{GallerySaver, SaverOptions},
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "gallery-saver", about = "Save images and videos into a shared media gallery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/gallery-saver/).
    #[arg(long, global = true, env = "GALLERY_SAVER_CONFIG")]
    config: Option<PathBuf>,

    /// Shared storage root (overrides config value).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Platform API level to emulate (overrides config value).
    #[arg(long, global = true)]
    api_level: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save an image, correcting its EXIF orientation.
    Image(save_commands::SaveArgs),
    /// Save a video.
    Video(save_commands::SaveArgs),
    /// Print the rotation an image needs, in degrees.
    Orientation {
        /// Image to inspect.
        path: PathBuf,
    },
    /// Answer one JSON method call read from stdin.
    Call,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only command output.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<GallerySaverConfig> {
    let config = match &cli.config {
        Some(path) => gallery_saver_config::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => gallery_saver_config::discover_and_load(),
    };
    let mut config = gallery_saver_config::apply_env_overrides(config);

    // CLI args override config values
    if let Some(root) = &cli.root {
        config.storage.root = Some(root.clone());
    }
    if let Some(level) = cli.api_level {
        config.platform.api_level = level;
    }
    config.validate()?;
    Ok(config)
}

fn exit_code(saved: bool) -> ExitCode {
    if saved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "gallery-saver starting");

    if let Commands::Orientation { path } = &cli.command {
        save_commands::handle_orientation(path);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let options = SaverOptions::from_config(&config)?;
    info!(
        root = %options.storage_root.display(),
        api_level = options.capabilities.api_level,
        "media store ready"
    );
    let saver = GallerySaver::with_fs_store(options);

    let saved = match cli.command {
        Commands::Image(args) => save_commands::handle_image(&saver, args).await,
        Commands::Video(args) => save_commands::handle_video(&saver, args).await,
        Commands::Call => save_commands::handle_call(&saver).await?,
        Commands::Orientation { .. } => true,
    };
    Ok(exit_code(saved))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("gallery-saver.toml");
        std::fs::write(
            &path,
            "[storage]\nroot = \"/from/file\"\ndefault_album = \"Camera\"\n\n[platform]\napi_level = 34\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn parses_image_command() {
        let cli = Cli::try_parse_from([
            "gallery-saver",
            "image",
            "photo.jpg",
            "--album",
            "Trips",
            "--dcim",
        ])
        .unwrap();
        match cli.command {
            Commands::Image(args) => {
                assert_eq!(args.path, PathBuf::from("photo.jpg"));
                assert_eq!(args.album, "Trips");
                assert!(args.dcim);
            },
            _ => panic!("expected image command"),
        }
    }

    #[test]
    fn album_defaults_to_blank() {
        let cli = Cli::try_parse_from(["gallery-saver", "video", "clip.mp4"]).unwrap();
        match cli.command {
            Commands::Video(args) => {
                assert_eq!(args.album, "");
                assert!(!args.dcim);
            },
            _ => panic!("expected video command"),
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let cli = Cli::try_parse_from([
            "gallery-saver",
            "--config",
            config_path.to_str().unwrap(),
            "--root",
            "/from/flag",
            "--api-level",
            "26",
            "image",
            "photo.jpg",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage.root, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.platform.api_level, 26);
        // Values without a flag still come from the file.
        assert_eq!(config.storage.default_album, "Camera");
    }

    #[test]
    fn config_file_applies_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let cli = Cli::try_parse_from([
            "gallery-saver",
            "--config",
            config_path.to_str().unwrap(),
            "call",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage.root, Some(PathBuf::from("/from/file")));
        assert_eq!(config.platform.api_level, 34);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from([
            "gallery-saver",
            "--config",
            "/nonexistent/gallery-saver.toml",
            "call",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn exit_code_follows_save_result() {
        assert_eq!(exit_code(true), ExitCode::SUCCESS);
        assert_eq!(exit_code(false), ExitCode::FAILURE);
    }
}
