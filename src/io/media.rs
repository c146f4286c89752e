// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading and encoding.
//!
//! This module handles loading keyframe images, converting them to the
//! base64 payloads the backend expects, PNG-encoding exported keyframes,
//! and saving finished videos.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};

use crate::models::generation::ImagePayload;

/// Default filename suggested when downloading a finished clip.
pub const DEFAULT_VIDEO_FILENAME: &str = "keyframe-studio.mp4";

/// Errors raised while reading, decoding or encoding media.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to read media file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// A decoded keyframe plus its original encoded payload.
#[derive(Debug)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub image: RgbaImage,
    pub payload: ImagePayload,
}

/// Load an image file, keeping both the decoded pixels and the original bytes.
pub fn load_image(path: &Path) -> Result<LoadedImage, MediaError> {
    let bytes = std::fs::read(path)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes into a [`LoadedImage`].
pub fn decode_image_bytes(bytes: &[u8]) -> Result<LoadedImage, MediaError> {
    let format = image::guess_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        image,
        payload: ImagePayload {
            mime_type: format.to_mime_type().to_string(),
            data: STANDARD.encode(bytes),
        },
    })
}

/// PNG-encode an image as a backend payload.
pub fn encode_png_payload(image: &RgbaImage) -> Result<ImagePayload, MediaError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(ImagePayload {
        mime_type: "image/png".to_string(),
        data: STANDARD.encode(&bytes),
    })
}

/// Render a payload as a `data:` URL.
pub fn to_data_url(payload: &ImagePayload) -> String {
    format!("data:{};base64,{}", payload.mime_type, payload.data)
}

/// Copy a finished video to a user-chosen location.
pub fn save_video(source: &Path, destination: &Path) -> Result<u64, MediaError> {
    Ok(std::fs::copy(source, destination)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::Rgba;

    #[test]
    fn png_payload_round_trips_through_decoder() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let payload = encode_png_payload(&image).unwrap();
        let bytes = STANDARD.decode(&payload.data).unwrap();

        let loaded = decode_image_bytes(&bytes).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.payload.mime_type, "image/png");
        assert_eq!(loaded.image.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn data_url_carries_mime_type() {
        let payload = ImagePayload {
            mime_type: "image/jpeg".to_string(),
            data: "AAAA".to_string(),
        };
        assert_eq!(to_data_url(&payload), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert_matches!(decode_image_bytes(b"hello"), Err(MediaError::Image(_)));
    }
}
