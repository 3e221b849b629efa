//! Style filter library.
//!
//! Four pure, deterministic presets built from a handful of enhancement
//! primitives. Every function takes the source by reference and returns a
//! fresh [`ImageBuffer`]; the stored upload is never touched, so the same
//! source can be restyled any number of times.
//!
//! | Preset | Steps (in order) |
//! |---|---|
//! | Ghibli | saturation ×1.3 → Gaussian blur σ0.5 → brightness ×1.1 → contrast ×1.1 |
//! | Contour | 3×3 contour kernel (offset 255: flat areas go white, edges go dark; 1-px frame kept) |
//! | Vintage | luminance → `#704214`..`#C0A080` duotone → brightness ×0.85 |
//! | Watercolor | Gaussian blur σ1 → edge enhance → saturation ×1.4 |
//!
//! The enhancement primitives follow the usual "blend against a degenerate
//! image" definition: saturation blends against the pixel's luminance,
//! brightness against black, contrast against the mean luminance.
//!
//! Work happens on an RGBA copy; the result is converted back to the input's
//! [`ColorMode`], except Vintage, which always yields RGB.

use super::buffer::{ColorMode, ImageBuffer};
use super::params::Style;
use image::{GrayImage, Luma, RgbaImage, imageops};
use rayon::prelude::*;

pub const GHIBLI_SATURATION: f32 = 1.3;
pub const GHIBLI_BLUR_SIGMA: f32 = 0.5;
pub const GHIBLI_BRIGHTNESS: f32 = 1.1;
pub const GHIBLI_CONTRAST: f32 = 1.1;

/// Duotone shadow tone, dark brown `#704214`.
pub const SEPIA_SHADOW: [u8; 3] = [0x70, 0x42, 0x14];
/// Duotone highlight tone, light tan `#C0A080`.
pub const SEPIA_HIGHLIGHT: [u8; 3] = [0xC0, 0xA0, 0x80];
pub const VINTAGE_BRIGHTNESS: f32 = 0.85;

pub const WATERCOLOR_BLUR_SIGMA: f32 = 1.0;
pub const WATERCOLOR_SATURATION: f32 = 1.4;

/// A 3×3 convolution: `sum(weights * pixels) / scale + offset`, clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3x3 {
    pub weights: [i32; 9],
    pub scale: i32,
    pub offset: i32,
}

pub const CONTOUR_KERNEL: Kernel3x3 = Kernel3x3 {
    weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 255,
};

pub const EDGE_ENHANCE_KERNEL: Kernel3x3 = Kernel3x3 {
    weights: [-1, -1, -1, -1, 10, -1, -1, -1, -1],
    scale: 2,
    offset: 0,
};

/// Run the preset for `style` against `source`.
pub fn apply(style: Style, source: &ImageBuffer) -> ImageBuffer {
    match style {
        Style::Ghibli => ghibli(source),
        Style::Contour => contour(source),
        Style::Vintage => vintage(source),
        Style::Watercolor => watercolor(source),
    }
}

/// Soft, saturated, slightly brighter rendering.
///
/// The blur runs before brightness/contrast so the tone pass does not
/// amplify the blur's edge artifacts.
pub fn ghibli(source: &ImageBuffer) -> ImageBuffer {
    let working = source.as_dynamic().to_rgba8();
    let working = enhance_color(&working, GHIBLI_SATURATION);
    let working = gaussian_blur(&working, GHIBLI_BLUR_SIGMA);
    let working = enhance_brightness(&working, GHIBLI_BRIGHTNESS);
    let working = enhance_contrast(&working, GHIBLI_CONTRAST);
    restore(working, source.color_mode())
}

/// Outline rendering from the contour kernel.
pub fn contour(source: &ImageBuffer) -> ImageBuffer {
    let working = source.as_dynamic().to_rgba8();
    restore(convolve3x3(&working, &CONTOUR_KERNEL), source.color_mode())
}

/// Sepia duotone with reduced brightness. Output is always RGB.
pub fn vintage(source: &ImageBuffer) -> ImageBuffer {
    let working = source.as_dynamic().to_rgba8();
    let toned = duotone(&working, SEPIA_SHADOW, SEPIA_HIGHLIGHT);
    let toned = enhance_brightness(&toned, VINTAGE_BRIGHTNESS);
    restore(toned, ColorMode::Rgb)
}

/// Blurred, edge-enhanced, saturated rendering.
///
/// The blur has to come first: enhancing edges on the raw upload would
/// sharpen sensor and compression noise instead of real boundaries.
pub fn watercolor(source: &ImageBuffer) -> ImageBuffer {
    let working = source.as_dynamic().to_rgba8();
    let working = gaussian_blur(&working, WATERCOLOR_BLUR_SIGMA);
    let working = convolve3x3(&working, &EDGE_ENHANCE_KERNEL);
    let working = enhance_color(&working, WATERCOLOR_SATURATION);
    restore(working, source.color_mode())
}

// =========================================================================
// Primitives
// =========================================================================

/// ITU-R 601 luminance in 16-bit fixed point, rounded.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
    (l >> 16) as u8
}

/// Scale saturation: blend each pixel against its own luminance.
pub fn enhance_color(image: &RgbaImage, factor: f32) -> RgbaImage {
    map_pixels(image, |[r, g, b, a]| {
        let gray = luma(r, g, b);
        [
            blend(gray, r, factor),
            blend(gray, g, factor),
            blend(gray, b, factor),
            a,
        ]
    })
}

/// Scale brightness: blend against black.
pub fn enhance_brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    map_pixels(image, |[r, g, b, a]| {
        [blend(0, r, factor), blend(0, g, factor), blend(0, b, factor), a]
    })
}

/// Scale contrast: blend against the image's mean luminance.
pub fn enhance_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_luma(image);
    map_pixels(image, |[r, g, b, a]| {
        [
            blend(mean, r, factor),
            blend(mean, g, factor),
            blend(mean, b, factor),
            a,
        ]
    })
}

pub fn gaussian_blur(image: &RgbaImage, sigma: f32) -> RgbaImage {
    imageops::blur(image, sigma)
}

/// Map luminance onto the gradient from `shadow` (black) to `highlight` (white).
pub fn duotone(image: &RgbaImage, shadow: [u8; 3], highlight: [u8; 3]) -> RgbaImage {
    map_pixels(image, |[r, g, b, _]| {
        let t = f32::from(luma(r, g, b)) / 255.0;
        let lerp = |i: usize| {
            let lo = f32::from(shadow[i]);
            let hi = f32::from(highlight[i]);
            (lo + (hi - lo) * t).round().clamp(0.0, 255.0) as u8
        };
        [lerp(0), lerp(1), lerp(2), 255]
    })
}

/// Convolve the color channels with a 3×3 kernel; alpha passes through.
///
/// The 1-px frame has no full neighbourhood and is copied from the input
/// unfiltered, matching Pillow's `ImageFilter` kernels. Rows are processed
/// in parallel.
pub fn convolve3x3(image: &RgbaImage, kernel: &Kernel3x3) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }
    let stride = width as usize * 4;
    let scale = kernel.scale.max(1) as f32;

    out.par_chunks_mut(stride)
        .enumerate()
        .skip(1)
        .take(height as usize - 2)
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in 1..width - 1 {
                let mut sums = [0i32; 3];
                for (i, weight) in kernel.weights.iter().enumerate() {
                    let sx = x + i as u32 % 3 - 1;
                    let sy = y + i as u32 / 3 - 1;
                    let px = image.get_pixel(sx, sy).0;
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += weight * i32::from(px[c]);
                    }
                }
                let idx = x as usize * 4;
                for (c, sum) in sums.iter().enumerate() {
                    let value = *sum as f32 / scale + kernel.offset as f32;
                    row[idx + c] = value.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    out
}

fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let d = f32::from(degenerate);
    (d + (f32::from(value) - d) * factor)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn mean_luma(image: &RgbaImage) -> u8 {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return 0;
    }
    let total: u64 = image
        .par_chunks(4)
        .map(|px| u64::from(luma(px[0], px[1], px[2])))
        .sum();
    ((total + pixels / 2) / pixels) as u8
}

fn map_pixels<F>(image: &RgbaImage, f: F) -> RgbaImage
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let mut out = image.clone();
    out.par_chunks_mut(4).for_each(|px| {
        let mapped = f([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&mapped);
    });
    out
}

/// Convert the RGBA working copy back to `mode`.
///
/// Gray inputs stay neutral through every preset that preserves mode, so the
/// red channel already carries the exact gray value.
fn restore(working: RgbaImage, mode: ColorMode) -> ImageBuffer {
    match mode {
        ColorMode::Rgba => ImageBuffer::derived(image::DynamicImage::ImageRgba8(working)),
        ColorMode::Rgb => {
            let rgb = image::DynamicImage::ImageRgba8(working).to_rgb8();
            ImageBuffer::derived(image::DynamicImage::ImageRgb8(rgb))
        }
        ColorMode::Gray => {
            let gray = GrayImage::from_fn(working.width(), working.height(), |x, y| {
                Luma([working.get_pixel(x, y).0[0]])
            });
            ImageBuffer::derived(image::DynamicImage::ImageLuma8(gray))
        }
    }
}
