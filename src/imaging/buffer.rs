//! In-memory decoded raster image.
//!
//! [`ImageBuffer`] wraps an `image::DynamicImage` that is always normalized
//! to one of three 8-bit layouts (see [`ColorMode`]). Everything downstream
//! (filters, scaling, PNG encoding) can then assume those three layouts and
//! nothing else.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → PNG | `DynamicImage::write_to` |

use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("upload is empty")]
    Empty,
    #[error("upload is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("image has zero width or height")]
    ZeroSized,
    #[error("image is {width}x{height}, more than the {limit} pixel limit")]
    TooManyPixels { width: u32, height: u32, limit: u64 },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
#[error("PNG encode failed: {0}")]
pub struct EncodeError(#[from] image::ImageError);

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Pixel layout of an [`ImageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }
}

/// Guards applied to uploaded bytes before and during decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_bytes: usize,
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024 * 1024,
            max_pixels: 50_000_000,
        }
    }
}

/// A decoded image: dimensions, color mode and pixel data.
///
/// Width and height are always positive, and the raw byte length is always
/// `width * height * channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    inner: DynamicImage,
}

impl ImageBuffer {
    /// Decode uploaded bytes, sniffing the format from the content.
    pub fn decode(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if bytes.len() > limits.max_bytes {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                limit: limits.max_bytes,
            });
        }

        // Dimensions come from the header alone, so oversized images are
        // rejected before any pixel allocation.
        let (width, height) = guessed_reader(bytes)?.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(DecodeError::ZeroSized);
        }
        if u64::from(width) * u64::from(height) > limits.max_pixels {
            return Err(DecodeError::TooManyPixels {
                width,
                height,
                limit: limits.max_pixels,
            });
        }

        let decoded = guessed_reader(bytes)?.decode()?;
        Self::from_dynamic(decoded)
    }

    /// Wrap an already-decoded image, converting it to 8-bit Gray, RGB or RGBA.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, DecodeError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::ZeroSized);
        }
        Ok(Self::normalized(image))
    }

    pub fn from_gray(image: GrayImage) -> Result<Self, DecodeError> {
        Self::from_dynamic(DynamicImage::ImageLuma8(image))
    }

    pub fn from_rgb(image: RgbImage) -> Result<Self, DecodeError> {
        Self::from_dynamic(DynamicImage::ImageRgb8(image))
    }

    pub fn from_rgba(image: RgbaImage) -> Result<Self, DecodeError> {
        Self::from_dynamic(DynamicImage::ImageRgba8(image))
    }

    /// Rebuild a buffer from pixels derived from an existing buffer of the
    /// same dimensions, so the positive-size check already holds.
    pub(super) fn derived(image: DynamicImage) -> Self {
        Self::normalized(image)
    }

    fn normalized(image: DynamicImage) -> Self {
        let inner = match image.color() {
            ColorType::L8 | ColorType::Rgb8 | ColorType::Rgba8 => image,
            ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
            color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        };
        Self { inner }
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.inner.color() {
            ColorType::L8 => ColorMode::Gray,
            ColorType::Rgba8 => ColorMode::Rgba,
            _ => ColorMode::Rgb,
        }
    }

    /// Raw interleaved pixel bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.inner
    }

    /// Resample to exactly `width` x `height` with a Lanczos3 filter.
    /// Each edge is at least 1.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        Self {
            inner: self
                .inner
                .resize_exact(width.max(1), height.max(1), FilterType::Lanczos3),
        }
    }

    /// Encode as PNG, the lossless format handed back to the transport.
    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.inner
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| DecodeError::UnknownFormat)?;
    if reader.format().is_none() {
        return Err(DecodeError::UnknownFormat);
    }
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{encode_as, gradient_rgb};
    use image::{ImageBuffer as RawBuffer, LumaA, Rgb};

    #[test]
    fn decode_png_keeps_dimensions_and_mode() {
        let bytes = encode_as(&gradient_rgb(40, 30), ImageFormat::Png);
        let decoded = ImageBuffer::decode(&bytes, &DecodeLimits::default()).unwrap();

        assert_eq!(
            decoded.dimensions(),
            Dimensions {
                width: 40,
                height: 30
            }
        );
        assert_eq!(decoded.color_mode(), ColorMode::Rgb);
        assert_eq!(decoded.as_bytes().len(), 40 * 30 * 3);
    }

    #[test]
    fn decode_jpeg_sniffs_format() {
        let bytes = encode_as(&gradient_rgb(16, 16), ImageFormat::Jpeg);
        let decoded = ImageBuffer::decode(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn decode_garbage_is_unknown_format() {
        let result = ImageBuffer::decode(b"definitely not an image", &DecodeLimits::default());
        assert!(matches!(result, Err(DecodeError::UnknownFormat)));
    }

    #[test]
    fn decode_truncated_png_errors() {
        let bytes = encode_as(&gradient_rgb(32, 32), ImageFormat::Png);
        let result = ImageBuffer::decode(&bytes[..bytes.len() / 2], &DecodeLimits::default());
        assert!(result.is_err());
    }

    #[test]
    fn decode_empty_upload_errors() {
        let result = ImageBuffer::decode(&[], &DecodeLimits::default());
        assert!(matches!(result, Err(DecodeError::Empty)));
    }

    #[test]
    fn decode_rejects_oversized_upload() {
        let bytes = encode_as(&gradient_rgb(32, 32), ImageFormat::Png);
        let limits = DecodeLimits {
            max_bytes: 10,
            ..DecodeLimits::default()
        };
        let result = ImageBuffer::decode(&bytes, &limits);
        assert!(matches!(result, Err(DecodeError::TooLarge { limit: 10, .. })));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let bytes = encode_as(&gradient_rgb(100, 100), ImageFormat::Png);
        let limits = DecodeLimits {
            max_pixels: 9_999,
            ..DecodeLimits::default()
        };
        let result = ImageBuffer::decode(&bytes, &limits);
        assert!(matches!(
            result,
            Err(DecodeError::TooManyPixels {
                width: 100,
                height: 100,
                ..
            })
        ));
    }

    #[test]
    fn constructors_reject_zero_sized_images() {
        assert!(matches!(
            ImageBuffer::from_rgb(RgbImage::new(0, 0)),
            Err(DecodeError::ZeroSized)
        ));
        assert!(matches!(
            ImageBuffer::from_gray(GrayImage::new(5, 0)),
            Err(DecodeError::ZeroSized)
        ));
        assert!(matches!(
            ImageBuffer::from_rgba(RgbaImage::new(0, 3)),
            Err(DecodeError::ZeroSized)
        ));
        assert!(ImageBuffer::from_rgb(RgbImage::new(1, 1)).is_ok());
    }

    #[test]
    fn resize_never_reaches_zero_size() {
        let resized = gradient_rgb(10, 10).resize_exact(0, 0);
        assert_eq!(
            resized.dimensions(),
            Dimensions {
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn gray_alpha_normalizes_to_rgba() {
        let raw: RawBuffer<LumaA<u8>, Vec<u8>> = RawBuffer::from_pixel(3, 2, LumaA([90, 200]));
        let buffer = ImageBuffer::from_dynamic(DynamicImage::ImageLumaA8(raw)).unwrap();
        assert_eq!(buffer.color_mode(), ColorMode::Rgba);
        assert_eq!(&buffer.as_bytes()[..4], &[90, 90, 90, 200]);
    }

    #[test]
    fn sixteen_bit_rgb_normalizes_to_rgb8() {
        let raw: RawBuffer<Rgb<u16>, Vec<u16>> = RawBuffer::from_pixel(2, 2, Rgb([0, 65535, 0]));
        let buffer = ImageBuffer::from_dynamic(DynamicImage::ImageRgb16(raw)).unwrap();
        assert_eq!(buffer.color_mode(), ColorMode::Rgb);
        assert_eq!(&buffer.as_bytes()[..3], &[0, 255, 0]);
    }

    #[test]
    fn encode_png_decodes_back_identically() {
        let original = gradient_rgb(25, 17);
        let png = original.encode_png().unwrap();
        let decoded = ImageBuffer::decode(&png, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn resize_exact_keeps_color_mode() {
        let resized = gradient_rgb(20, 10).resize_exact(7, 3);
        assert_eq!(resized.width(), 7);
        assert_eq!(resized.height(), 3);
        assert_eq!(resized.color_mode(), ColorMode::Rgb);
    }

    #[test]
    fn channel_counts() {
        assert_eq!(ColorMode::Gray.channels(), 1);
        assert_eq!(ColorMode::Rgb.channels(), 3);
        assert_eq!(ColorMode::Rgba.channels(), 4);
    }
}
