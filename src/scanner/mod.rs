use crate::error::{DishMatchError, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// 検証済みのアップロード画像（JPEG/PNGのみ）
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// 画像を読み込み、中身の形式を判定する
///
/// 拡張子ではなく先頭バイトで判定し、JPEG/PNG以外は拒否する。
pub fn load_image(path: &Path) -> Result<UploadedImage> {
    if !path.is_file() {
        return Err(DishMatchError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes)
        .map_err(|_| DishMatchError::UnsupportedImage(path.display().to_string()))?;

    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(DishMatchError::UnsupportedImage(format!(
            "{} ({:?})",
            path.display(),
            format
        )));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::debug!(file = %file_name, ?format, size = bytes.len(), "画像読み込み");

    Ok(UploadedImage {
        path: path.to_path_buf(),
        file_name,
        format,
        bytes,
    })
}

/// フォルダ直下の画像候補を列挙（拡張子で判定、ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(DishMatchError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

#[cfg(test)]
fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}
