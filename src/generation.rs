//! Generation tokens: the cooperative cancellation primitive shared by every capture loop.
//!
//! A [`GenerationClock`] hands out monotonically increasing [`Generation`] values. Each async
//! activity keeps the value it minted and compares it against the clock before every side
//! effect. A mismatch means a newer activity has taken over and the holder must stop quietly.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one asynchronous activity. `Generation(0)` is never minted.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Generation(pub u64);

/// Monotonic counter of the current generation.
#[derive(Debug, Default)]
pub struct GenerationClock {
    current: AtomicU64,
}

impl GenerationClock {
    /// A clock at generation zero (nothing minted yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock, superseding every previously minted generation.
    pub fn mint(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// The most recently minted generation.
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// `true` while `held` is still the newest generation.
    pub fn is_current(&self, held: Generation) -> bool {
        self.current() == held
    }
}
