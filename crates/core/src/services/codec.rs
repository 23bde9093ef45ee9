//! Image codec abstraction over the raster pipeline.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};

use arbor_common::{AppError, AppResult};

/// Supported upload formats, keyed by file extension.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Raster operations the image pipeline needs.
///
/// All operations take and return encoded bytes; the output is encoded
/// in the same format the input decoded as. Quality applies to lossy
/// formats and is ignored for the rest.
pub trait ImageCodec: Send + Sync {
    /// Decoded pixel dimensions of an encoded image.
    fn dimensions(&self, data: &[u8]) -> AppResult<(u32, u32)>;

    /// Scale so the image covers the target box, then center-crop to
    /// exactly `width` x `height`.
    fn cover(&self, data: &[u8], width: u32, height: u32, quality: u8) -> AppResult<Vec<u8>>;

    /// Re-encode at the given quality without resizing.
    fn reencode(&self, data: &[u8], quality: u8) -> AppResult<Vec<u8>>;

    /// Shrink to fit within the target box without upscaling, then
    /// place on a black `width` x `height` canvas so the output has
    /// exact dimensions.
    fn thumbnail(&self, data: &[u8], width: u32, height: u32, quality: u8) -> AppResult<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Clone, Default)]
pub struct RasterCodec;

impl RasterCodec {
    /// Create a new raster codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn decode(data: &[u8]) -> AppResult<(DynamicImage, ImageFormat)> {
        let format = image::guess_format(data)
            .map_err(|e| AppError::UnsupportedImage(e.to_string()))?;
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| AppError::UnsupportedImage(e.to_string()))?;
        Ok((img, format))
    }

    fn encode(img: &DynamicImage, format: ImageFormat, quality: u8) -> AppResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        match format {
            ImageFormat::Jpeg => {
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
                img.to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| AppError::Internal(format!("Failed to encode image: {e}")))?;
            }
            _ => {
                img.write_to(&mut out, format)
                    .map_err(|e| AppError::Internal(format!("Failed to encode image: {e}")))?;
            }
        }
        Ok(out.into_inner())
    }
}

impl ImageCodec for RasterCodec {
    fn dimensions(&self, data: &[u8]) -> AppResult<(u32, u32)> {
        let (img, _) = Self::decode(data)?;
        Ok((img.width(), img.height()))
    }

    fn cover(&self, data: &[u8], width: u32, height: u32, quality: u8) -> AppResult<Vec<u8>> {
        let (img, format) = Self::decode(data)?;
        let cropped = img.resize_to_fill(width, height, FilterType::Lanczos3);
        Self::encode(&cropped, format, quality)
    }

    fn reencode(&self, data: &[u8], quality: u8) -> AppResult<Vec<u8>> {
        let (img, format) = Self::decode(data)?;
        Self::encode(&img, format, quality)
    }

    fn thumbnail(&self, data: &[u8], width: u32, height: u32, quality: u8) -> AppResult<Vec<u8>> {
        let (img, format) = Self::decode(data)?;

        let scaled = if img.width() > width || img.height() > height {
            img.resize(width, height, FilterType::Lanczos3)
        } else {
            img
        };

        // Pad undersized sources onto a black canvas so the output is
        // always exactly the requested box.
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        let x = i64::from((width - scaled.width()) / 2);
        let y = i64::from((height - scaled.height()) / 2);
        imageops::overlay(&mut canvas, &scaled.to_rgba8(), x, y);

        Self::encode(&DynamicImage::ImageRgba8(canvas), format, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 40, 200, 255]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_dimensions() {
        let codec = RasterCodec::new();
        assert_eq!(codec.dimensions(&png_bytes(64, 48)).unwrap(), (64, 48));
    }

    #[test]
    fn test_cover_crops_to_exact_box() {
        let codec = RasterCodec::new();
        let out = codec.cover(&png_bytes(1000, 1000), 350, 200, 50).unwrap();
        assert_eq!(codec.dimensions(&out).unwrap(), (350, 200));
    }

    #[test]
    fn test_thumbnail_shrinks_oversized_source() {
        let codec = RasterCodec::new();
        let out = codec.thumbnail(&png_bytes(800, 600), 200, 200, 75).unwrap();
        assert_eq!(codec.dimensions(&out).unwrap(), (200, 200));
    }

    #[test]
    fn test_thumbnail_pads_undersized_source() {
        let codec = RasterCodec::new();
        // 120x90 source must not be upscaled; the canvas brings the
        // output to the full box.
        let out = codec.thumbnail(&png_bytes(120, 90), 200, 200, 75).unwrap();
        assert_eq!(codec.dimensions(&out).unwrap(), (200, 200));
    }

    #[test]
    fn test_reencode_keeps_dimensions() {
        let codec = RasterCodec::new();
        let out = codec.reencode(&png_bytes(33, 77), 50).unwrap();
        assert_eq!(codec.dimensions(&out).unwrap(), (33, 77));
    }

    #[test]
    fn test_garbage_input_is_rejected() {
        let codec = RasterCodec::new();
        let err = codec.dimensions(b"not an image").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedImage(_)));
    }
}
