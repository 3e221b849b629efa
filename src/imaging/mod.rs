//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Blur** | `image::imageops::blur` |
//! | **Contour / edge enhance** | custom 3×3 convolution, rows in parallel via `rayon` |
//! | **Scale** | `resize_exact` with `Lanczos3` |
//! | **Encode → PNG** | `DynamicImage::write_to` |
//!
//! The module is split into:
//! - **Buffer**: [`ImageBuffer`], the decoded raster every stage passes around
//! - **Parameters**: [`Style`], [`StyleRequest`], [`QualityTier`]
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Filters**: the four presets and their enhancement primitives
//! - **Operations**: quality scaling and style rendering

pub mod buffer;
mod calculations;
pub mod filters;
pub mod operations;
mod params;

pub use buffer::{ColorMode, DecodeError, DecodeLimits, Dimensions, EncodeError, ImageBuffer};
pub use calculations::{calculate_scaled_dimensions, needs_resize};
pub use operations::{apply_quality, render_style};
pub use params::{ParseStyleError, ParseTierError, QualityTier, Style, StyleRequest};
