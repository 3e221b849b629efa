//! # Image Styler
//!
//! Upload an image, pick a named visual style, get a transformed copy back at
//! the resolution tier you asked for.
//!
//! This crate is the engine behind a chat-bot style front end. The transport
//! (receiving photos, showing style buttons, sending results back) is an
//! external collaborator; it calls into [`engine::StyleEngine`] through three
//! operations:
//!
//! ```text
//! upload_image(user, bytes)   → Ok(dimensions) | Decode
//! select_quality(user, tier)  → Ok(tier)       | InvalidTier
//! apply_style(user, style)    → StyledImage    | NoImage | InvalidStyle
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Image buffer, style/quality vocabularies, the four filters, quality scaling |
//! | [`session`] | Per-user store of the last upload and quality preference |
//! | [`picker`] | Injected random source for the `random` style |
//! | [`engine`] | Orchestrates session lookup → filter → scale |
//! | [`config`] | `config.toml` loading, validation, stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Style and Tier Enums
//!
//! Styles and tiers arrive as strings from keyboard callbacks. They are parsed
//! once at the boundary into [`imaging::Style`], [`imaging::StyleRequest`] and
//! [`imaging::QualityTier`]; everything past that point matches exhaustively,
//! so adding a preset is a compile error until every dispatch handles it.
//!
//! ## Sessions Are Injected, Not Ambient
//!
//! The engine holds an `Arc<SessionStore>` handed to it at construction.
//! Hosts can share one store between several engines, and tests build a fresh
//! store per case.
//!
//! ## Filters Never Hold a Lock
//!
//! The store hands out `Arc<ImageBuffer>` snapshots. Filter and scaling work
//! runs on the snapshot after the shard lock is released, so a slow
//! watercolor on a large photo never blocks another user, and a concurrent
//! re-upload simply replaces the `Arc` for the next request.
//!
//! ## Randomness Is a Capability
//!
//! The `random` style draws from a [`picker::StylePicker`]. Production uses
//! the thread RNG; tests inject a seeded or scripted picker.

pub mod config;
pub mod engine;
pub mod imaging;
pub mod output;
pub mod picker;
pub mod session;

pub use engine::{EngineError, StyleEngine, StyledImage};
pub use session::{SessionStore, UserId};

#[cfg(test)]
pub(crate) mod test_helpers;
