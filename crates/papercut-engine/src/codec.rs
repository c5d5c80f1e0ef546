// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec boundary — decoding uploads into raster buffers and encoding
// results for display or storage. Everything past this module works on
// in-memory `DynamicImage`s only.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use papercut_core::{PapercutError, Result};
use tracing::{debug, info, instrument};

/// Decode raw encoded bytes (JPEG, PNG, TIFF, ...) into an image.
///
/// An image with zero width or height is reported as
/// [`PapercutError::EmptyImage`].
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| PapercutError::Decode(format!("failed to decode image: {err}")))?;
    ensure_non_empty(&image)?;
    debug!(width = image.width(), height = image.height(), "Image decoded from bytes");
    Ok(image)
}

/// Load an image from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let image = image::load_from_memory(&data).map_err(|err| {
        PapercutError::Decode(format!("failed to decode {}: {err}", path.display()))
    })?;
    ensure_non_empty(&image)?;
    info!(width = image.width(), height = image.height(), "Image loaded");
    Ok(image)
}

/// Reject zero-sized buffers before they reach the pipeline.
pub fn ensure_non_empty(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PapercutError::EmptyImage);
    }
    Ok(())
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    encode_to_format(image, ImageFormat::Png)
}

/// Encode an image as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| PapercutError::Encode(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}

/// Write an image to a file. The format is inferred from the file extension.
pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    image.save(path.as_ref()).map_err(|err| {
        PapercutError::Encode(format!(
            "failed to save image to {}: {err}",
            path.as_ref().display()
        ))
    })
}

fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| PapercutError::Encode(format!("image encoding failed: {err}")))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn png_encode_then_decode_keeps_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(31, 17, Luma([90u8])));
        let bytes = encode_png(&img).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (31, 17));
    }

    #[test]
    fn jpeg_encoding_produces_jfif_marker() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([200u8])));
        let bytes = encode_jpeg(&img, 80).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn empty_image_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 5));
        assert!(matches!(ensure_non_empty(&img), Err(PapercutError::EmptyImage)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = open("/nonexistent/papercut/photo.jpg").unwrap_err();
        assert!(matches!(err, PapercutError::Io(_)));
    }
}
