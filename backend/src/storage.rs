//! # Blob storage for uploaded images
//!
//! Survey images and user avatars are written below a single root directory
//! that the server exposes read-only under [`PUBLIC_PREFIX`]. Files are
//! content-addressed: the name is the MD5 digest of the bytes plus the
//! image extension, so uploading the same picture twice reuses one file.
//!
//! The database stores the public URL (`/storage/surveys/<md5>.png`); the
//! same URL is handed back to [`Storage::delete`] when an image is replaced.

use crate::error::ApiError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// URL prefix under which the storage root is served.
pub const PUBLIC_PREFIX: &str = "/storage/";

pub const SURVEY_IMAGES: &str = "surveys";
pub const AVATARS: &str = "avatars";

#[derive(Clone)]
pub struct Storage {
    root: Arc<PathBuf>,
}

impl Storage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Creates the storage directories if they are missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [SURVEY_IMAGES, AVATARS] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    /// Writes `bytes` to `<dir>/<md5>.<extension>` and returns its public URL.
    pub async fn store(&self, dir: &str, extension: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let file_name = format!("{:x}.{}", md5::compute(bytes), extension);
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir).await?;
        tokio::fs::write(target_dir.join(&file_name), bytes).await?;

        let url = format!("{PUBLIC_PREFIX}{dir}/{file_name}");
        info!("Stored {} bytes at {}", bytes.len(), url);
        Ok(url)
    }

    /// Removes the file behind a public URL. Missing files and URLs outside
    /// the storage root are ignored.
    pub async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let Some(path) = self.resolve(url) else {
            warn!("Refusing to delete {url}: not a storage URL");
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", url);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(PUBLIC_PREFIX)?);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// An image decoded from a `data:` URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Image types accepted for survey images.
const DATA_URL_TYPES: [(&str, &str, ImageFormat); 4] = [
    ("jpg", "jpg", ImageFormat::Jpeg),
    ("jpeg", "jpg", ImageFormat::Jpeg),
    ("png", "png", ImageFormat::Png),
    ("gif", "gif", ImageFormat::Gif),
];

pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:image/")
}

/// Decodes `data:image/<type>;base64,<payload>`.
///
/// The declared type must be jpg, jpeg, png or gif and the decoded bytes must
/// actually be an image of that type.
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, &'static str> {
    let rest = data_url
        .strip_prefix("data:image/")
        .ok_or("Did not match data URI with image data")?;
    let (declared, payload) = rest
        .split_once(";base64,")
        .ok_or("Did not match data URI with image data")?;

    let (extension, format) = DATA_URL_TYPES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(declared))
        .map(|(_, extension, format)| (*extension, *format))
        .ok_or("The image must be a file of type: jpg, jpeg, gif, png.")?;

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| "The image could not be decoded.")?;

    match image::guess_format(&bytes) {
        Ok(actual) if actual == format => Ok(DecodedImage {
            extension,
            bytes,
        }),
        _ => Err("The image content does not match its declared type."),
    }
}
