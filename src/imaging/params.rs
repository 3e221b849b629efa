//! Closed vocabularies for style selection and output quality.
//!
//! These types describe *what* the caller asked for. They are the interface
//! between the engine boundary (which receives loosely-typed names from the
//! transport) and the pixel work in [`filters`](super::filters) and
//! [`operations`](super::operations).
//!
//! ## Types
//!
//! - [`Style`]: one of the four presets. Matching on it is exhaustive.
//! - [`StyleRequest`]: a concrete [`Style`] or the `random` sentinel.
//! - [`QualityTier`]: Low / Medium / High, each bound to a fixed scale factor.
//!
//! Names parse case-insensitively, ignore surrounding whitespace, and accept
//! the `style_` / `quality_` prefixes used by inline keyboard callbacks.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown style `{0}`; expected one of ghibli, contour, vintage, watercolor, random")]
pub struct ParseStyleError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown quality tier `{0}`; expected one of low, medium, high")]
pub struct ParseTierError(pub String);

/// A visual style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Ghibli,
    Contour,
    Vintage,
    Watercolor,
}

impl Style {
    /// Every preset, in catalog order. The random draw is uniform over this.
    pub const ALL: [Style; 4] = [
        Style::Ghibli,
        Style::Contour,
        Style::Vintage,
        Style::Watercolor,
    ];

    /// Machine name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Style::Ghibli => "ghibli",
            Style::Contour => "contour",
            Style::Vintage => "vintage",
            Style::Watercolor => "watercolor",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Style::Ghibli => "Ghibli",
            Style::Contour => "Contour",
            Style::Vintage => "Vintage",
            Style::Watercolor => "Watercolor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Style::Ghibli => "soft, dreamlike aesthetic",
            Style::Contour => "outlined edges",
            Style::Vintage => "old-time feel",
            Style::Watercolor => "painterly effect",
        }
    }

    /// Suggested file name for an encoded result, e.g. `vintage_image.png`.
    pub fn output_file_name(self) -> String {
        format!("{}_image.png", self.name())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s, "style_");
        Style::ALL
            .into_iter()
            .find(|style| style.name() == token)
            .ok_or_else(|| ParseStyleError(s.to_string()))
    }
}

/// What the caller asked for: a specific preset or a random one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleRequest {
    Style(Style),
    Random,
}

impl StyleRequest {
    pub fn display_name(self) -> &'static str {
        match self {
            StyleRequest::Style(style) => style.display_name(),
            StyleRequest::Random => "Random Style",
        }
    }
}

impl From<Style> for StyleRequest {
    fn from(style: Style) -> Self {
        StyleRequest::Style(style)
    }
}

impl FromStr for StyleRequest {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if normalize_token(s, "style_") == "random" {
            return Ok(StyleRequest::Random);
        }
        s.parse().map(StyleRequest::Style)
    }
}

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] = [QualityTier::Low, QualityTier::Medium, QualityTier::High];

    /// Linear scale applied to both edges. Always in `(0, 1]`.
    pub fn scale_factor(self) -> f64 {
        match self {
            QualityTier::Low => 0.5,
            QualityTier::Medium => 0.75,
            QualityTier::High => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            QualityTier::Low => "Low",
            QualityTier::Medium => "Medium",
            QualityTier::High => "High",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for QualityTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s, "quality_");
        QualityTier::ALL
            .into_iter()
            .find(|tier| tier.name() == token)
            .ok_or_else(|| ParseTierError(s.to_string()))
    }
}

fn normalize_token(raw: &str, prefix: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match lowered.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}
