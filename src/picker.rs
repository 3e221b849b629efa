//! Random source for the `random` style request.
//!
//! The engine never reaches for a global RNG directly; it asks an injected
//! [`StylePicker`]. Production uses [`ThreadRngPicker`] (unseeded, so every
//! call may differ). Tests swap in [`SeededPicker`] or [`SequencePicker`]
//! for reproducible picks.

use crate::imaging::Style;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Chooses a concrete style when the caller asked for a random one.
pub trait StylePicker: Send + Sync {
    fn pick(&self) -> Style;
}

/// Uniform draw from [`Style::ALL`] using the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPicker;

impl StylePicker for ThreadRngPicker {
    fn pick(&self) -> Style {
        Style::ALL[rand::rng().random_range(0..Style::ALL.len())]
    }
}

/// Uniform draw from a seeded RNG. Same seed, same sequence.
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl StylePicker for SeededPicker {
    fn pick(&self) -> Style {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Style::ALL[rng.random_range(0..Style::ALL.len())]
    }
}

/// Cycles through a fixed list of styles.
#[derive(Debug)]
pub struct SequencePicker {
    styles: Vec<Style>,
    next: AtomicUsize,
}

impl SequencePicker {
    /// An empty list falls back to cycling through [`Style::ALL`].
    pub fn new(styles: impl Into<Vec<Style>>) -> Self {
        let styles = styles.into();
        Self {
            styles: if styles.is_empty() {
                Style::ALL.to_vec()
            } else {
                styles
            },
            next: AtomicUsize::new(0),
        }
    }
}

impl StylePicker for SequencePicker {
    fn pick(&self) -> Style {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.styles[i % self.styles.len()]
    }
}
