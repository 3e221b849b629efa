//! Style transformation engine.
//!
//! The engine is the boundary the transport talks to. It owns no pixel state
//! of its own: uploads and preferences go into the injected [`SessionStore`],
//! and [`StyleEngine::apply`] is a pure function of that store's contents at
//! call time plus one draw from the injected [`StylePicker`] for `random`.
//!
//! ```text
//! upload_image(user, bytes)  →  decode  →  SessionStore::put_image
//! select_quality(user, name) →  parse   →  SessionStore::set_quality
//! apply_style(user, name)    →  stored image → parse → resolve random
//!                            →  filter → stored tier → scale → StyledImage
//! ```
//!
//! Style work runs on an `Arc` snapshot of the stored image with no session
//! lock held, and never writes back to the session. Dropping the returned
//! [`StyledImage`] is therefore a complete cancellation.

use crate::config::StylerConfig;
use crate::imaging::{
    DecodeError, DecodeLimits, Dimensions, EncodeError, ImageBuffer, ParseStyleError,
    ParseTierError, QualityTier, Style, StyleRequest, apply_quality, filters,
};
use crate::picker::{StylePicker, ThreadRngPicker};
use crate::session::{SessionStore, UserId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no image uploaded yet for user {0}")]
    NoImage(UserId),
    #[error(transparent)]
    InvalidStyle(#[from] ParseStyleError),
    #[error(transparent)]
    InvalidTier(#[from] ParseTierError),
    #[error("could not decode upload: {0}")]
    Decode(#[from] DecodeError),
}

/// Output of a style request, ready for the transport to encode.
#[derive(Debug, Clone)]
pub struct StyledImage {
    pub image: ImageBuffer,
    /// The concrete style that was rendered.
    pub style: Style,
    /// True when `style` came from a `random` request.
    pub randomized: bool,
    pub quality: QualityTier,
}

impl StyledImage {
    /// Suggested file name for the encoded result, e.g. `ghibli_image.png`.
    pub fn file_name(&self) -> String {
        self.style.output_file_name()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        self.image.encode_png()
    }
}

/// Applies styles to the images held in a [`SessionStore`].
pub struct StyleEngine<P = ThreadRngPicker> {
    sessions: Arc<SessionStore>,
    picker: P,
    limits: DecodeLimits,
    idle_ttl: Option<Duration>,
}

impl StyleEngine<ThreadRngPicker> {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self::with_picker(sessions, ThreadRngPicker)
    }

    /// Engine with decode limits and eviction policy taken from `config`.
    pub fn from_config(sessions: Arc<SessionStore>, config: &StylerConfig) -> Self {
        Self::new(sessions)
            .with_limits(config.decode_limits())
            .with_idle_ttl(config.idle_ttl())
    }
}

impl<P: StylePicker> StyleEngine<P> {
    pub fn with_picker(sessions: Arc<SessionStore>, picker: P) -> Self {
        Self {
            sessions,
            picker,
            limits: DecodeLimits::default(),
            idle_ttl: None,
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// `None` keeps sessions for the lifetime of the process.
    pub fn with_idle_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.idle_ttl = ttl;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Decode `bytes` and store the result as the user's current image.
    ///
    /// A failed decode leaves any previously stored image in place.
    pub fn upload_image(&self, user: UserId, bytes: &[u8]) -> Result<Dimensions, EngineError> {
        let image = ImageBuffer::decode(bytes, &self.limits).inspect_err(|e| {
            warn!(%user, bytes = bytes.len(), error = %e, "rejected upload");
        })?;
        let dims = image.dimensions();
        debug!(
            %user,
            width = dims.width,
            height = dims.height,
            mode = ?image.color_mode(),
            "stored upload"
        );
        self.sessions.put_image(user, image);
        Ok(dims)
    }

    /// Parse a tier name (`low`, `medium`, `high`) and store it.
    pub fn select_quality(&self, user: UserId, name: &str) -> Result<QualityTier, EngineError> {
        let tier: QualityTier = name.parse()?;
        self.set_quality(user, tier);
        Ok(tier)
    }

    pub fn set_quality(&self, user: UserId, tier: QualityTier) {
        debug!(%user, %tier, "quality preference set");
        self.sessions.set_quality(user, tier);
    }

    /// Parse a style name (`ghibli`, `contour`, `vintage`, `watercolor`,
    /// `random`) and apply it to the user's stored image.
    ///
    /// A user with no upload gets [`EngineError::NoImage`] whatever the name.
    pub fn apply_style(&self, user: UserId, name: &str) -> Result<StyledImage, EngineError> {
        let source = self.stored_image(user)?;
        let request: StyleRequest = name.parse()?;
        Ok(self.render(user, &source, request))
    }

    /// Apply `request` to the user's stored image at their quality tier.
    ///
    /// Fails with [`EngineError::NoImage`] before any filter work if the user
    /// has not uploaded anything.
    pub fn apply(&self, user: UserId, request: StyleRequest) -> Result<StyledImage, EngineError> {
        let source = self.stored_image(user)?;
        Ok(self.render(user, &source, request))
    }

    fn stored_image(&self, user: UserId) -> Result<Arc<ImageBuffer>, EngineError> {
        self.sessions
            .get_image(user)
            .ok_or(EngineError::NoImage(user))
    }

    fn render(&self, user: UserId, source: &ImageBuffer, request: StyleRequest) -> StyledImage {
        let (style, randomized) = self.resolve(request);
        debug!(%user, %style, randomized, "applying style");

        let styled = filters::apply(style, source);
        let quality = self.sessions.get_quality(user);
        let image = apply_quality(styled, quality);
        debug!(
            %user,
            %quality,
            width = image.width(),
            height = image.height(),
            "style applied"
        );

        StyledImage {
            image,
            style,
            randomized,
            quality,
        }
    }

    /// Turn a request into a concrete style, drawing from the picker for `random`.
    pub fn resolve(&self, request: StyleRequest) -> (Style, bool) {
        match request {
            StyleRequest::Style(style) => (style, false),
            StyleRequest::Random => (self.picker.pick(), true),
        }
    }

    /// Evict sessions idle longer than the configured TTL. No-op without one.
    pub fn evict_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let removed = self.sessions.evict_idle(ttl);
        if removed > 0 {
            info!(removed, remaining = self.sessions.len(), "evicted idle sessions");
        }
        removed
    }
}
