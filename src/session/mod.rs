//! Capture sessions: the studio that owns the surface, and the orchestrators it starts.

/// Session data model, requests and outcomes.
pub mod model;
/// Progress snapshots published by running sessions.
pub mod progress;
pub(crate) mod scope;
/// Single high-resolution still renders.
pub mod still;
/// Surface ownership, session start and cancellation.
pub mod studio;
/// 360° turntable captures.
pub mod turntable;

#[cfg(test)]
#[path = "../../tests/unit/session/fake_surface.rs"]
pub(crate) mod fake_surface;
