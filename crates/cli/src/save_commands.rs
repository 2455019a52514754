//! CLI commands that save media or inspect it.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use {
    anyhow::Context,
    clap::Args,
    gallery_saver_media::{
        GallerySaver, SaveRequest,
        channel::{self, MethodCall},
        orientation,
    },
};

#[derive(Args)]
pub struct SaveArgs {
    /// File to save.
    pub path: PathBuf,
    /// Album folder; empty selects the configured default album.
    #[arg(long, default_value = "")]
    pub album: String,
    /// Save under DCIM instead of Pictures/Movies.
    #[arg(long)]
    pub dcim: bool,
}

impl From<SaveArgs> for SaveRequest {
    fn from(args: SaveArgs) -> Self {
        SaveRequest::new(args.path, args.album, args.dcim)
    }
}

pub async fn handle_image(saver: &GallerySaver, args: SaveArgs) -> bool {
    let saved = saver.save_image(args.into()).await;
    println!("{saved}");
    saved
}

pub async fn handle_video(saver: &GallerySaver, args: SaveArgs) -> bool {
    let saved = saver.save_video(args.into()).await;
    println!("{saved}");
    saved
}

pub fn handle_orientation(path: &Path) {
    let tag = orientation::resolve_orientation(path);
    println!("{}", tag.degrees());
}

/// Read one JSON method call from stdin and answer it.
pub async fn handle_call(saver: &GallerySaver) -> anyhow::Result<bool> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read method call from stdin")?;
    let call: MethodCall = serde_json::from_str(&raw).context("invalid method call JSON")?;
    let saved = channel::dispatch(saver, call).await?;
    println!("{saved}");
    Ok(saved)
}
