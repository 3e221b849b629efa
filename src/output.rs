//! CLI output formatting.
//!
//! Formatting functions return lines instead of printing so they can be
//! tested; the `print_*` wrappers write them to stdout.
//!
//! ## Styles
//!
//! ```text
//! Available styles
//!     ghibli      Ghibli (soft, dreamlike aesthetic)
//!     contour     Contour (outlined edges)
//!     ...
//!     random      Random Style
//!
//! Quality tiers
//!     low         Low (50% resolution)
//! ```
//!
//! ## Apply
//!
//! ```text
//! Vintage (randomly selected) → vintage_image.png
//!     Source: 400x300
//!     Output: 200x150, Low quality
//! ```

use crate::engine::StyledImage;
use crate::imaging::{Dimensions, QualityTier, Style, StyleRequest};
use std::path::Path;

/// Format the style catalog and quality tiers.
pub fn format_catalog() -> Vec<String> {
    let mut lines = vec!["Available styles".to_string()];
    for style in Style::ALL {
        lines.push(format!(
            "    {:<11} {} ({})",
            style.name(),
            style.display_name(),
            style.description()
        ));
    }
    lines.push(format!(
        "    {:<11} {}",
        "random",
        StyleRequest::Random.display_name()
    ));
    lines.push(String::new());
    lines.push("Quality tiers".to_string());
    for tier in QualityTier::ALL {
        lines.push(format!(
            "    {:<11} {} ({}% resolution)",
            tier.name(),
            tier.display_name(),
            (tier.scale_factor() * 100.0).round() as u32
        ));
    }
    lines
}

pub fn print_catalog() {
    for line in format_catalog() {
        println!("{line}");
    }
}

/// Format the summary of one applied style.
pub fn format_apply_result(styled: &StyledImage, source: Dimensions, output: &Path) -> Vec<String> {
    let picked = if styled.randomized {
        " (randomly selected)"
    } else {
        ""
    };
    vec![
        format!("{}{} → {}", styled.style, picked, output.display()),
        format!("    Source: {}x{}", source.width, source.height),
        format!(
            "    Output: {}x{}, {} quality",
            styled.image.width(),
            styled.image.height(),
            styled.quality
        ),
    ]
}

pub fn print_apply_result(styled: &StyledImage, source: Dimensions, output: &Path) {
    for line in format_apply_result(styled, source, output) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_rgb;

    #[test]
    fn catalog_lists_every_style_and_tier() {
        let lines = format_catalog();
        for style in Style::ALL {
            assert!(
                lines.iter().any(|l| l.contains(style.description())),
                "missing {style}"
            );
        }
        assert!(lines.iter().any(|l| l.contains("Random Style")));
        assert!(lines.iter().any(|l| l.contains("Medium (75% resolution)")));
    }

    #[test]
    fn apply_result_mentions_random_pick() {
        let styled = StyledImage {
            image: gradient_rgb(200, 150),
            style: Style::Vintage,
            randomized: true,
            quality: QualityTier::Low,
        };
        let source = Dimensions {
            width: 400,
            height: 300,
        };
        let lines = format_apply_result(&styled, source, Path::new("vintage_image.png"));
        assert_eq!(lines[0], "Vintage (randomly selected) → vintage_image.png");
        assert_eq!(lines[2], "    Output: 200x150, Low quality");
    }

    #[test]
    fn apply_result_plain_style() {
        let styled = StyledImage {
            image: gradient_rgb(10, 10),
            style: Style::Ghibli,
            randomized: false,
            quality: QualityTier::High,
        };
        let source = Dimensions {
            width: 10,
            height: 10,
        };
        let lines = format_apply_result(&styled, source, Path::new("out.png"));
        assert_eq!(lines[0], "Ghibli → out.png");
    }
}
