//! Per-user session store.
//!
//! Each user has at most one stored image (the last upload) and at most one
//! quality preference. Sessions are created lazily by the first upload or
//! preference change and are overwritten in place afterwards; there is no
//! history.
//!
//! # Concurrency
//!
//! The store is a sharded concurrent map. Every operation holds one shard
//! lock for the duration of a single read or write, so:
//!
//! - two users never wait on each other for more than a map lookup, and
//! - an upload racing a style request for the same user resolves to one
//!   order or the other, never a half-written image.
//!
//! Stored images are `Arc`-shared. A read copies the pointer out and drops
//! the lock; filter work then runs on that snapshot with no lock held. A
//! later upload swaps in a new `Arc` and leaves in-flight readers untouched.
//!
//! # Lifetime
//!
//! By default sessions live for the lifetime of the process. Hosts that want
//! bounded memory can call [`SessionStore::evict_idle`] periodically.

use crate::imaging::{ImageBuffer, QualityTier};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Opaque user identifier supplied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Session {
    image: Option<Arc<ImageBuffer>>,
    quality: Option<QualityTier>,
    /// Last upload or preference change. Reads do not refresh it.
    last_touched: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            image: None,
            quality: None,
            last_touched: Instant::now(),
        }
    }
}

/// Process-wide mapping from user to their last image and quality tier.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `image` as the user's last upload, replacing any previous one.
    pub fn put_image(&self, user: UserId, image: ImageBuffer) {
        let mut session = self.sessions.entry(user).or_insert_with(Session::new);
        session.image = Some(Arc::new(image));
        session.last_touched = Instant::now();
    }

    /// The user's last upload, or `None` if they never uploaded.
    pub fn get_image(&self, user: UserId) -> Option<Arc<ImageBuffer>> {
        self.sessions
            .get(&user)
            .and_then(|session| session.image.clone())
    }

    /// Store the user's quality preference, replacing any previous one.
    pub fn set_quality(&self, user: UserId, tier: QualityTier) {
        let mut session = self.sessions.entry(user).or_insert_with(Session::new);
        session.quality = Some(tier);
        session.last_touched = Instant::now();
    }

    /// The user's quality preference; [`QualityTier::High`] if never set.
    pub fn get_quality(&self, user: UserId) -> QualityTier {
        self.sessions
            .get(&user)
            .and_then(|session| session.quality)
            .unwrap_or_default()
    }

    /// Drop a user's session entirely. Returns whether one existed.
    pub fn remove(&self, user: UserId) -> bool {
        self.sessions.remove(&user).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove sessions untouched for at least `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(Instant::now(), ttl)
    }

    fn evict_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let keep = now.saturating_duration_since(session.last_touched) < ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}
