use base64::prelude::*;
use chrono::Utc;
use image::{DynamicImage, ImageFormat};
use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::config::MediaConfig;
use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_BYTES, MAX_IMAGE_DIMENSION};

/// Local-filesystem media store for item photos.
///
/// Oversized files and unexpected extensions are skipped rather than treated
/// as errors; item creation proceeds without a photo.
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

/// Result of an upload attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Image persisted; here is its public URL
    Stored { url: String },
    /// File failed the size or extension gate; nothing was written
    Skipped,
}

impl MediaStore {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            root: config.root,
            public_base_url: config.public_base_url,
        }
    }

    /// Create the media root if it is missing. Called once at startup.
    pub async fn ensure_root_exists(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create media root {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Gate, downsize and persist one uploaded image.
    ///
    /// Returns `Skipped` for files that fail the size/extension policy.
    /// Decode/encode/IO failures are real errors; the caller decides whether
    /// they abort the surrounding request.
    pub async fn store_image(
        &self,
        owner_uid: &str,
        original_filename: &str,
        data: Vec<u8>,
    ) -> Result<UploadOutcome> {
        if data.len() >= MAX_IMAGE_BYTES {
            debug!(
                "Skipping oversized upload ({} bytes) from {}",
                data.len(),
                owner_uid
            );
            return Ok(UploadOutcome::Skipped);
        }

        let ext = match allowed_extension(original_filename) {
            Some(ext) => ext,
            None => {
                debug!("Skipping upload with unexpected extension: {}", original_filename);
                return Ok(UploadOutcome::Skipped);
            }
        };

        let filename = media_filename(owner_uid, ext);
        let path = self.root.join(&filename);

        let format = ImageFormat::from_extension(ext.trim_start_matches('.'))
            .ok_or_else(|| AppError::Internal(format!("Unsupported image format: {}", ext)))?;

        // Decode, downsize and re-encode off the async runtime
        let write_path = path.clone();
        tokio::task::spawn_blocking(move || -> std::result::Result<(), image::ImageError> {
            let img = image::load_from_memory(&data)?;
            let img = downsize(img);
            img.save_with_format(&write_path, format)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Image task panicked: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Image processing failed: {}", e)))?;

        let url = format!("{}/img/{}", self.public_base_url, filename);
        info!("Stored image {} for user {}", filename, owner_uid);

        Ok(UploadOutcome::Stored { url })
    }
}

/// Shrink so neither dimension exceeds the cap, preserving aspect ratio.
/// Images already within bounds are returned untouched, never upscaled.
fn downsize(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_IMAGE_DIMENSION || img.height() > MAX_IMAGE_DIMENSION {
        img.thumbnail(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
    } else {
        img
    }
}

/// Match the trailing extension against the allow-list, case-sensitively.
fn allowed_extension(filename: &str) -> Option<&'static str> {
    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .find(|ext| filename.ends_with(*ext) && filename.len() > ext.len())
        .copied()
}

/// `<UTC date>-<owner uid>-<url-safe token><ext>`
fn media_filename(owner_uid: &str, ext: &str) -> String {
    format!(
        "{}-{}-{}{}",
        Utc::now().format("%Y-%m-%d"),
        owner_uid,
        url_safe_token(),
        ext
    )
}

fn url_safe_token() -> String {
    let mut bytes = [0u8; 10];
    rand::rng().fill(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_sensitive() {
        assert_eq!(allowed_extension("photo.jpg"), Some(".jpg"));
        assert_eq!(allowed_extension("photo.jpeg"), Some(".jpeg"));
        assert_eq!(allowed_extension("photo.png"), Some(".png"));
        assert_eq!(allowed_extension("photo.gif"), None);
        assert_eq!(allowed_extension("photo.JPG"), None);
        assert_eq!(allowed_extension("photo"), None);
        // bare extension with no stem is not a usable filename
        assert_eq!(allowed_extension(".jpg"), None);
    }

    #[test]
    fn filenames_embed_date_owner_and_token() {
        let name = media_filename("user-1", ".png");
        let date = Utc::now().format("%Y-%m-%d").to_string();
        assert!(name.starts_with(&format!("{}-user-1-", date)));
        assert!(name.ends_with(".png"));

        // tokens make names collision-resistant
        assert_ne!(name, media_filename("user-1", ".png"));
    }

    #[test]
    fn tokens_are_url_safe() {
        let token = url_safe_token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn large_images_shrink_within_bounds() {
        let img = DynamicImage::new_rgb8(2000, 2000);
        let out = downsize(img);
        assert_eq!(out.width(), 1024);
        assert_eq!(out.height(), 1024);
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let img = DynamicImage::new_rgb8(2048, 1024);
        let out = downsize(img);
        assert_eq!(out.width(), 1024);
        assert_eq!(out.height(), 512);
    }

    #[test]
    fn small_images_are_never_upscaled() {
        let img = DynamicImage::new_rgb8(800, 600);
        let out = downsize(img);
        assert_eq!((out.width(), out.height()), (800, 600));
    }
}
