//! High-level image operations.
//!
//! These functions combine the filter library with the dimension math:
//! render a style, then bring the result down to the requested quality tier.

use super::buffer::ImageBuffer;
use super::calculations::{calculate_scaled_dimensions, needs_resize};
use super::filters;
use super::params::{QualityTier, Style};

/// Scale a styled image to `tier`.
///
/// High is identity and hands the buffer straight back without resampling.
/// Lower tiers resample with Lanczos3 to `floor(edge * factor)`, at least
/// one pixel per edge.
pub fn apply_quality(image: ImageBuffer, tier: QualityTier) -> ImageBuffer {
    let factor = tier.scale_factor();
    if !needs_resize(factor) {
        return image;
    }
    let (width, height) = calculate_scaled_dimensions((image.width(), image.height()), factor);
    image.resize_exact(width, height)
}

/// Render `style` from `source`, then scale to `tier`. `source` is not modified.
pub fn render_style(source: &ImageBuffer, style: Style, tier: QualityTier) -> ImageBuffer {
    apply_quality(filters::apply(style, source), tier)
}
