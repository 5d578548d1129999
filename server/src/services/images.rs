//! Upload re-encoding for case images.
//!
//! Every uploaded picture is decoded, turned upright from its EXIF
//! orientation, resized to cover a 1024×768 box (centre crop), and written
//! back out as a quality-65 JPEG. Decoding and encoding are CPU-bound and run
//! on the blocking pool.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};

use super::auth::random_object_name;
use super::{ActionError, with_context};
use crate::backend::Backend;
use crate::backend::records::Caller;

pub const CASE_BUCKET: &str = "case-images";
pub const TARGET_WIDTH: u32 = 1024;
pub const TARGET_HEIGHT: u32 = 768;
pub const JPEG_QUALITY: u8 = 65;

/// Decode, re-orient, cover-resize, and re-encode as JPEG.
pub fn reencode(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);

    let resized = img.resize_to_fill(TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

/// Re-encode an upload and store it under the caller's folder.
///
/// Returns the public URL of the stored object.
pub async fn store_image(backend: &Backend, caller: &Caller, bytes: Vec<u8>) -> Result<String, ActionError> {
    let original_size = bytes.len();
    let jpeg = tokio::task::spawn_blocking(move || reencode(&bytes))
        .await
        .map_err(|e| ActionError::Image(format!("re-encode task failed: {e}")))?
        .map_err(|e| ActionError::Image(e.to_string()))?;

    let path = format!("{}/{}.jpg", caller.id, random_object_name());
    let stored_size = jpeg.len();
    backend
        .storage
        .upload(CASE_BUCKET, &path, jpeg, "image/jpeg")
        .await
        .map_err(with_context("failed to upload image"))?;

    tracing::info!(%path, original_size, stored_size, "case image stored");
    Ok(backend.storage.public_url(CASE_BUCKET, &path))
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
