use anyhow::Context;
use base64::Engine;
use image::ImageFormat;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::request::ImageResponse;

pub const EXTENSION: &str = "jpg";

const COLLISION_SUFFIX: &str = "_1";

pub fn underscore_prompt(prompt: &str) -> String {
    prompt.replace(' ', "_").to_lowercase()
}

pub fn create_save_folder(path: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

fn existing_files(path: &Path) -> anyhow::Result<HashSet<String>> {
    let mut names = HashSet::new();
    let entries = fs::read_dir(path).with_context(|| format!("failed to read {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

fn decode(payload: &str) -> anyhow::Result<image::RgbImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("payload is not valid base64")?;
    let img = image::load_from_memory(&bytes).context("payload is not a supported image")?;
    Ok(img.to_rgb8())
}

fn write_jpeg(img: &image::RgbImage, path: &Path) -> anyhow::Result<()> {
    img.save_with_format(path, ImageFormat::Jpeg)
        .with_context(|| format!("failed to save {}", path.display()))
}

/// The first payload whose name is already taken is written with an extra
/// `_1` suffix and the rest of the batch is dropped.
pub fn save_images(
    save_path: &Path,
    prompt: &str,
    response: &ImageResponse,
) -> anyhow::Result<Vec<PathBuf>> {
    create_save_folder(save_path)?;
    let previous_contents = existing_files(save_path)?;

    log::info!("Writing image/s to disk...");
    let base = underscore_prompt(prompt);
    let mut written = Vec::with_capacity(response.payloads.len());

    for (idx, payload) in response.payloads.iter().enumerate() {
        let idx = idx + 1;
        log::info!("Saving image {}", idx);
        let img = decode(payload).with_context(|| format!("image {idx}"))?;

        let file_name = format!("{base}_{idx}");
        if previous_contents.contains(&format!("{file_name}.{EXTENSION}")) {
            let path = save_path.join(format!("{file_name}{COLLISION_SUFFIX}.{EXTENSION}"));
            log::debug!("{}.{} exists, writing {}", file_name, EXTENSION, path.display());
            write_jpeg(&img, &path)?;
            written.push(path);
            return Ok(written);
        }

        let path = save_path.join(format!("{file_name}.{EXTENSION}"));
        write_jpeg(&img, &path)?;
        written.push(path);
    }

    log::info!("Job finished!");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempdir::TempDir;

    fn payload() -> String {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(buf)
    }

    #[test]
    fn underscores_and_lowercases() {
        assert_eq!(underscore_prompt("A Cat"), "a_cat");
        assert_eq!(underscore_prompt("a Big  Dog"), "a_big__dog");
        assert_eq!(underscore_prompt("already_fine"), "already_fine");
    }

    #[test]
    fn save_folder_is_idempotent() {
        let tmp = TempDir::new("imagine").unwrap();
        let dir = tmp.path().join("export");
        create_save_folder(&dir).unwrap();
        assert!(dir.is_dir());
        fs::write(dir.join("keep.txt"), b"x").unwrap();
        create_save_folder(&dir).unwrap();
        assert!(dir.join("keep.txt").exists());
    }

    #[test]
    fn lists_only_files() {
        let tmp = TempDir::new("imagine").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        fs::create_dir(tmp.path().join("b.jpg")).unwrap();
        let names = existing_files(tmp.path()).unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("a.jpg"));
    }

    #[test]
    fn writes_jpeg() {
        let tmp = TempDir::new("imagine").unwrap();
        let response = ImageResponse {
            payloads: vec![payload()],
        };
        let paths = save_images(tmp.path(), "Red Square", &response).unwrap();
        assert_eq!(paths, vec![tmp.path().join("red_square_1.jpg")]);
        let format = image::io::Reader::open(&paths[0])
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Jpeg));
    }

    #[test]
    fn rejects_bad_base64() {
        let tmp = TempDir::new("imagine").unwrap();
        let response = ImageResponse {
            payloads: vec!["not base64!".to_string()],
        };
        assert!(save_images(tmp.path(), "x", &response).is_err());
        assert!(!tmp.path().join("x_1.jpg").exists());
    }

    #[test]
    fn collision_on_later_index() {
        let tmp = TempDir::new("imagine").unwrap();
        fs::write(tmp.path().join("a_cat_2.jpg"), b"old").unwrap();
        let response = ImageResponse {
            payloads: vec![payload(), payload(), payload()],
        };
        let paths = save_images(tmp.path(), "A Cat", &response).unwrap();
        assert_eq!(
            paths,
            vec![tmp.path().join("a_cat_1.jpg"), tmp.path().join("a_cat_2_1.jpg")]
        );
        assert_eq!(fs::read(tmp.path().join("a_cat_2.jpg")).unwrap(), b"old");
        assert!(!tmp.path().join("a_cat_3.jpg").exists());
    }
}
