// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/media.rs
//
// Inline media payloads: data URLs, base64 and mime sniffing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

/// Errors while unpacking a `data:` URL.
#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn parse(url: &str) -> Result<Self, DataUrlError> {
        let rest = url.trim().strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;

        Ok(Self {
            mime: mime.to_string(),
            bytes: STANDARD.decode(payload.trim())?,
        })
    }
}

pub fn is_data_url(url: &str) -> bool {
    url.trim_start().starts_with("data:")
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", to_base64(bytes))
}

/// Mime type of an encoded raster, guessed from its magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format: ImageFormat| format.to_mime_type())
}
