use crate::foundation::error::CaptureResult;
use crate::generation::{Generation, GenerationClock};
use crate::session::model::{StillConfig, TurntableConfig};
use crate::session::progress::{Progress, ProgressReporter};
use crate::session::still::StillSession;
use crate::session::turntable::TurntableSession;
use crate::surface::RenderSurface;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

/// Entry point of the capture core: owns the surface handle and serializes sessions over it.
///
/// Starting a session mints a new [`Generation`], which immediately supersedes any older
/// session. The returned session object does nothing until it is `run`. Running sessions wait
/// for exclusive ownership of the surface, so a new session only touches the surface after the
/// previous one has restored it.
pub struct CaptureStudio<S: RenderSurface> {
    surface: S,
    clock: GenerationClock,
    cancel_requested: AtomicU64,
    progress: ProgressReporter,
    pub(crate) owner: Mutex<()>,
}

impl<S: RenderSurface> CaptureStudio<S> {
    /// Wrap a rendering surface.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            clock: GenerationClock::new(),
            cancel_requested: AtomicU64::new(0),
            progress: ProgressReporter::new(),
            owner: Mutex::new(()),
        }
    }

    /// The wrapped surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The generation clock shared by every session.
    pub fn clock(&self) -> &GenerationClock {
        &self.clock
    }

    /// Progress reporter fed by running sessions.
    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Subscribe to progress snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Validate `config` and mint a turntable session.
    pub fn start_turntable(&self, config: TurntableConfig) -> CaptureResult<TurntableSession<'_, S>> {
        config.validate()?;
        let generation = self.clock.mint();
        tracing::debug!(generation = generation.0, kind = ?config.kind(), "turntable session minted");
        Ok(TurntableSession::new(self, config, generation))
    }

    /// Validate `config` and mint a still-render session.
    pub fn start_still_render(&self, config: StillConfig) -> CaptureResult<StillSession<'_, S>> {
        config.validate()?;
        let generation = self.clock.mint();
        tracing::debug!(generation = generation.0, "still session minted");
        Ok(StillSession::new(self, config, generation))
    }

    /// Ask the session owning `generation` to stop at its next check.
    ///
    /// Returns `false` (and records nothing) when `generation` is no longer current.
    pub fn cancel(&self, generation: Generation) -> bool {
        if !self.clock.is_current(generation) {
            return false;
        }
        self.cancel_requested.store(generation.0, Ordering::Release);
        tracing::debug!(generation = generation.0, "cancel requested");
        true
    }

    pub(crate) fn is_cancel_requested(&self, generation: Generation) -> bool {
        self.cancel_requested.load(Ordering::Acquire) == generation.0
    }

    /// `true` while a session owns the surface.
    pub fn is_busy(&self) -> bool {
        self.owner.try_lock().is_err()
    }

    /// Live orbit/preview write of the subject azimuth.
    ///
    /// Suppressed while a capture session owns the surface; returns whether it was applied.
    pub fn try_set_azimuth(&self, radians: f64) -> bool {
        match self.owner.try_lock() {
            Ok(_guard) => {
                self.surface.set_azimuth(radians);
                true
            }
            Err(_) => false,
        }
    }
}
