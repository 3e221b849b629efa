//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output dimensions for a quality scale factor.
///
/// Each edge is `floor(edge * factor)`, never less than one pixel.
///
/// # Examples
/// ```
/// # use image_styler::imaging::calculate_scaled_dimensions;
/// assert_eq!(calculate_scaled_dimensions((200, 100), 0.5), (100, 50));
/// assert_eq!(calculate_scaled_dimensions((200, 100), 0.75), (150, 75));
/// assert_eq!(calculate_scaled_dimensions((1, 1), 0.5), (1, 1));
/// ```
pub fn calculate_scaled_dimensions(source: (u32, u32), factor: f64) -> (u32, u32) {
    let scale = |edge: u32| ((f64::from(edge) * factor).floor() as u32).max(1);
    (scale(source.0), scale(source.1))
}

/// Whether a scale factor requires resampling at all.
///
/// Factors at or above 1.0 are identity: the scaler never upsamples.
pub fn needs_resize(factor: f64) -> bool {
    factor < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn half_scale() {
        assert_eq!(calculate_scaled_dimensions((200, 100), 0.5), (100, 50));
    }

    #[test]
    fn three_quarter_scale() {
        assert_eq!(calculate_scaled_dimensions((200, 100), 0.75), (150, 75));
    }

    #[test]
    fn odd_edges_floor() {
        // 401 * 0.5 = 200.5 → 200; 301 * 0.75 = 225.75 → 225
        assert_eq!(calculate_scaled_dimensions((401, 301), 0.5), (200, 150));
        assert_eq!(calculate_scaled_dimensions((401, 301), 0.75), (300, 225));
    }

    #[test]
    fn never_below_one_pixel() {
        assert_eq!(calculate_scaled_dimensions((1, 3), 0.5), (1, 1));
    }

    #[test]
    fn full_scale_is_identity() {
        assert_eq!(calculate_scaled_dimensions((640, 480), 1.0), (640, 480));
        assert!(!needs_resize(1.0));
        assert!(needs_resize(0.75));
    }

    proptest! {
        #[test]
        fn scaled_edges_stay_within_bounds(
            w in 1u32..10_000,
            h in 1u32..10_000,
            factor in prop::sample::select(vec![0.5f64, 0.75, 1.0]),
        ) {
            let (sw, sh) = calculate_scaled_dimensions((w, h), factor);
            prop_assert!(sw >= 1 && sw <= w);
            prop_assert!(sh >= 1 && sh <= h);
            prop_assert!(f64::from(sw) <= (f64::from(w) * factor).max(1.0));
        }
    }
}
