#![allow(clippy::unwrap_used, clippy::expect_used)]
use std::{io::Cursor, path::Path};

use {
    gallery_saver_media::{
        GallerySaver, MediaLocation, PlatformCapabilities, SaveRequest, SaverOptions,
        channel::{self, ChannelError, MethodCall},
        image_ops,
    },
    image::{DynamicImage, ImageFormat},
    serde_json::json,
};

fn png(path: &Path, width: u32, height: u32) {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    std::fs::write(path, out.into_inner()).unwrap();
}

fn saver(root: &Path, api_level: u32) -> GallerySaver {
    GallerySaver::with_fs_store(SaverOptions::new(root, PlatformCapabilities::new(api_level)))
}

#[tokio::test]
async fn save_image_call_stores_untagged_png_verbatim() {
    let src = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = src.path().join("shot.png");
    png(&source, 30, 10);

    let saver = saver(root.path(), 34);
    let call = MethodCall::new(
        channel::SAVE_IMAGE,
        json!({"path": source.to_str().unwrap(), "albumName": "Screens", "toDcim": false}),
    );
    assert!(channel::dispatch(&saver, call).await.unwrap());

    let records = saver.store().records();
    assert_eq!(records.len(), 1);
    let stored = &records[0];
    assert_eq!(stored.record.mime_type, "image/png");
    assert_eq!(stored.record.location, MediaLocation::Scoped {
        relative_path: "Pictures/Screens".into()
    });
    assert_eq!(
        std::fs::read(&stored.path).unwrap(),
        std::fs::read(&source).unwrap()
    );
    let meta = image_ops::get_image_metadata(&std::fs::read(&stored.path).unwrap()).unwrap();
    assert_eq!((meta.width, meta.height), (30, 10));
}

#[tokio::test]
async fn save_video_call_uses_movies_or_dcim() {
    let src = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = src.path().join("clip.webm");
    std::fs::write(&source, b"\x1a\x45\xdf\xa3 fake webm").unwrap();

    let saver = saver(root.path(), 34);
    for to_dcim in [false, true] {
        let call = MethodCall::new(
            channel::SAVE_VIDEO,
            json!({"path": source.to_str().unwrap(), "toDcim": to_dcim}),
        );
        assert!(channel::dispatch(&saver, call).await.unwrap());
    }

    assert!(root.path().join("Movies/GallerySaver/clip.webm").exists());
    assert!(root.path().join("DCIM/GallerySaver/clip.webm").exists());
    assert!(
        saver
            .store()
            .records()
            .iter()
            .all(|m| m.record.mime_type == "video/webm")
    );
}

#[tokio::test]
async fn missing_source_answers_false() {
    let root = tempfile::tempdir().unwrap();
    let saver = saver(root.path(), 34);
    let call = MethodCall::new(
        channel::SAVE_IMAGE,
        json!({"path": "/definitely/not/here.jpg", "albumName": "", "toDcim": false}),
    );
    assert!(!channel::dispatch(&saver, call).await.unwrap());
    assert!(saver.store().records().is_empty());
}

#[tokio::test]
async fn malformed_call_is_a_bridge_error() {
    let root = tempfile::tempdir().unwrap();
    let saver = saver(root.path(), 34);
    let err = channel::dispatch(&saver, MethodCall::new("saveAudio", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::NotImplemented(ref m) if m == "saveAudio"));
}
