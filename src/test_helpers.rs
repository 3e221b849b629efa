//! Shared test utilities for the image-styler test suite.
//!
//! Synthetic images are built in memory so no test depends on fixture files.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let source = gradient_rgb(200, 100);
//! let bytes = png_bytes(&source);
//! engine.upload_image(user, &bytes).unwrap();
//! ```

use crate::imaging::ImageBuffer;
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

/// RGB image with a horizontal red ramp, vertical green ramp and flat blue.
pub fn gradient_rgb(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_rgb(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
    .unwrap()
}

/// Grayscale image with a diagonal ramp.
pub fn gradient_gray(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_gray(GrayImage::from_fn(width, height, |x, y| {
        Luma([((x + y) % 256) as u8])
    }))
    .unwrap()
}

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> ImageBuffer {
    ImageBuffer::from_rgb(RgbImage::from_pixel(width, height, Rgb(color))).unwrap()
}

/// Encode `image` in `format`, as a transport would hand it over.
pub fn encode_as(image: &ImageBuffer, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .as_dynamic()
        .write_to(&mut Cursor::new(&mut out), format)
        .unwrap();
    out
}

pub fn png_bytes(image: &ImageBuffer) -> Vec<u8> {
    encode_as(image, ImageFormat::Png)
}
