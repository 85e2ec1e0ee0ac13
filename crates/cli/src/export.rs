//! Reading source photos and writing restored ones.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use rekindle_core::{Adjustments, ImagePayload, RestoredImage};

/// Mime type for a photo, from its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub async fn read_photo(path: &Path) -> Result<ImagePayload> {
    let Some(mime_type) = mime_for_path(path) else {
        bail!("Unsupported image type: {:?}", path);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    if bytes.is_empty() {
        bail!("Image file is empty: {:?}", path);
    }
    Ok(ImagePayload::new(mime_type, bytes))
}

/// Output name for each source, in order.
///
/// Sources sharing a file stem get `-2`, `-3`, ... appended so no output
/// overwrites another.
pub fn output_stems(sources: &[PathBuf]) -> Vec<String> {
    let mut used = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("photo");
            let mut candidate = stem.to_string();
            let mut n = 2;
            while !used.insert(candidate.clone()) {
                candidate = format!("{}-{}", stem, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Where the restored image and its sidecar go for output name `stem`.
pub fn output_paths(out_dir: &Path, stem: &str, image: &ImagePayload) -> (PathBuf, PathBuf) {
    let image_path = out_dir.join(format!("{}-restored.{}", stem, image.extension()));
    let sidecar_path = out_dir.join(format!("{}-restored.adjustments.json", stem));
    (image_path, sidecar_path)
}

/// Display settings stored next to a restored image.
#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    source: String,
    model: &'a str,
    mode: &'a str,
    adjustments: &'a Adjustments,
}

/// Write the restored image and its adjustments sidecar. Returns the image path.
pub async fn write_restored(
    out_dir: &Path,
    source: &Path,
    stem: &str,
    restored: &RestoredImage,
    adjustments: &Adjustments,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let (image_path, sidecar_path) = output_paths(out_dir, stem, &restored.image);
    tokio::fs::write(&image_path, restored.image.bytes())
        .await
        .with_context(|| format!("Failed to write {:?}", image_path))?;

    let sidecar = Sidecar {
        source: source.display().to_string(),
        model: &restored.model,
        mode: restored.mode.as_str(),
        adjustments,
    };
    let json = serde_json::to_string_pretty(&sidecar).context("Failed to serialize sidecar")?;
    tokio::fs::write(&sidecar_path, json)
        .await
        .with_context(|| format!("Failed to write {:?}", sidecar_path))?;

    Ok(image_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekindle_core::{Adjustment, RestorationMode};
    use tempfile::TempDir;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("dir/b.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("c.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[test]
    fn test_output_paths_use_result_extension() {
        let image = ImagePayload::new("image/png", vec![1]);
        let (img, sidecar) = output_paths(Path::new("out"), "grandma", &image);
        assert_eq!(img, PathBuf::from("out/grandma-restored.png"));
        assert_eq!(
            sidecar,
            PathBuf::from("out/grandma-restored.adjustments.json")
        );
    }

    #[test]
    fn test_output_stems_disambiguate_shared_names() {
        let sources = vec![
            PathBuf::from("a/x.jpg"),
            PathBuf::from("b/x.jpg"),
            PathBuf::from("x-2.png"),
            PathBuf::from("c/x.png"),
            PathBuf::from("y.jpg"),
        ];
        assert_eq!(output_stems(&sources), vec!["x", "x-2", "x-2-2", "x-3", "y"]);
    }

    #[tokio::test]
    async fn test_read_photo_rejects_unknown_and_empty() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("notes.txt");
        tokio::fs::write(&txt, b"hello").await.unwrap();
        assert!(read_photo(&txt).await.is_err());

        let empty = dir.path().join("empty.jpg");
        tokio::fs::write(&empty, b"").await.unwrap();
        assert!(read_photo(&empty).await.is_err());

        let photo = dir.path().join("ok.jpeg");
        tokio::fs::write(&photo, [0xFF, 0xD8]).await.unwrap();
        let payload = read_photo(&photo).await.unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
        assert_eq!(payload.len(), 2);
    }

    #[tokio::test]
    async fn test_write_restored() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let restored = RestoredImage {
            image: ImagePayload::new("image/png", vec![9, 8, 7]),
            model: "gemini-2.5-flash-image".to_string(),
            mode: RestorationMode::Standard,
        };
        let mut adjustments = Adjustments::default();
        adjustments.set(Adjustment::Contrast, 120.0);

        let path = write_restored(&out, Path::new("old.jpg"), "old", &restored, &adjustments)
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![9, 8, 7]);

        let sidecar = tokio::fs::read_to_string(out.join("old-restored.adjustments.json"))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
        assert_eq!(value["model"], "gemini-2.5-flash-image");
        assert_eq!(value["mode"], "standard");
        assert_eq!(value["adjustments"]["contrast"], 120.0);
    }

    #[tokio::test]
    async fn test_same_stem_from_different_directories_keeps_both() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let sources = vec![PathBuf::from("a/x.jpg"), PathBuf::from("b/x.jpg")];
        let stems = output_stems(&sources);

        let mut written = Vec::new();
        for (i, (source, stem)) in sources.iter().zip(&stems).enumerate() {
            let restored = RestoredImage {
                image: ImagePayload::new("image/png", vec![i as u8]),
                model: "m".to_string(),
                mode: RestorationMode::Standard,
            };
            let path = write_restored(&out, source, stem, &restored, &Adjustments::default())
                .await
                .unwrap();
            written.push(path);
        }

        assert_ne!(written[0], written[1]);
        assert_eq!(tokio::fs::read(&written[0]).await.unwrap(), vec![0]);
        assert_eq!(tokio::fs::read(&written[1]).await.unwrap(), vec![1]);
        assert!(out.join("x-restored.adjustments.json").exists());
        assert!(out.join("x-2-restored.adjustments.json").exists());
    }
}
