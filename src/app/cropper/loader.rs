// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/cropper/loader.rs
//
// Source image loading for the crop tool.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::domain::media::{self, DataUrl, DataUrlError};

/// The source image could not be turned into paintable pixels.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid data URL: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// Decoded raster owned by one crop session.
#[derive(Debug, Clone)]
pub struct SourceImage {
    document: DynamicImage,
}

impl SourceImage {
    pub fn new(document: DynamicImage) -> Result<Self, DecodeError> {
        let (width, height) = document.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty);
        }
        Ok(Self { document })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::new(image::load_from_memory(bytes)?)
    }

    /// Returns the native pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.document.dimensions()
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        self.document.to_rgba8()
    }
}

/// Load and decode an image from a `data:` URL, an `http(s)` URL or a path.
///
/// Resolves only once the pixel dimensions are known.
pub async fn load_image(source: &str) -> Result<SourceImage, DecodeError> {
    let source = source.trim();

    let bytes = if media::is_data_url(source) {
        log::debug!("Decoding inline image ({} bytes of URL)", source.len());
        DataUrl::parse(source)?.bytes
    } else if source.starts_with("http://") || source.starts_with("https://") {
        log::debug!("Fetching image from {source}");
        fetch(source).await?
    } else {
        let path = Path::new(source);
        log::debug!("Reading image from {}", path.display());
        tokio::fs::read(path).await.map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };

    let image = SourceImage::from_bytes(&bytes)?;
    let (width, height) = image.dimensions();
    log::info!("Loaded source image {width}x{height}");
    Ok(image)
}

async fn fetch(url: &str) -> Result<Vec<u8>, DecodeError> {
    let wrap = |source| DecodeError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(wrap)?;
    let bytes = response.bytes().await.map_err(wrap)?;
    Ok(bytes.to_vec())
}
