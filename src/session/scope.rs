use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{CaptureError, ErrorKind};
use crate::session::model::{CaptureOutcome, CaptureSession, SessionState};
use crate::session::progress::{Progress, percent};
use crate::session::studio::CaptureStudio;
use crate::surface::{RenderSurface, SurfaceLease};
use tokio::sync::MutexGuard;

/// Why a capture loop stopped.
#[derive(Debug)]
pub(crate) enum LoopExit {
    Completed,
    Cancelled,
    Superseded,
    Failed(CaptureError),
}

/// Exclusive, scoped ownership of the studio surface for one session.
///
/// Holds the ownership lock and the surface lease. Field order matters: the lease is dropped
/// (surface restored) before the lock is released. A scope dropped without `close` (the
/// session future was dropped) still restores the surface and resets progress.
pub(crate) struct CaptureScope<'s, S: RenderSurface> {
    studio: &'s CaptureStudio<S>,
    session: CaptureSession,
    closed: bool,
    lease: Option<SurfaceLease<'s, S>>,
    _owner: MutexGuard<'s, ()>,
}

impl<'s, S: RenderSurface> CaptureScope<'s, S> {
    /// Wait for the surface, then confirm `session` is still current.
    ///
    /// Returns `None` without touching anything when a newer session was minted meanwhile.
    pub(crate) async fn enter(
        studio: &'s CaptureStudio<S>,
        session: CaptureSession,
    ) -> Option<Self> {
        let owner = studio.owner.lock().await;
        if !studio.clock().is_current(session.generation) {
            tracing::debug!(generation = session.generation.0, "superseded before start");
            return None;
        }
        Some(Self {
            studio,
            session,
            closed: false,
            lease: None,
            _owner: owner,
        })
    }

    pub(crate) fn surface(&self) -> &'s S {
        self.studio.surface()
    }

    pub(crate) fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub(crate) fn is_current(&self) -> bool {
        self.studio.clock().is_current(self.session.generation)
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.studio.is_cancel_requested(self.session.generation)
    }

    /// Token check first, then the user cancel flag.
    pub(crate) fn interrupted(&self) -> Option<LoopExit> {
        if !self.is_current() {
            return Some(LoopExit::Superseded);
        }
        if self.cancel_requested() {
            return Some(LoopExit::Cancelled);
        }
        None
    }

    /// Snapshot the surface and apply the session size at the session pixel density.
    pub(crate) fn acquire_surface(&mut self) {
        let size: SurfaceSize = self.session.size();
        self.lease = Some(SurfaceLease::acquire(
            self.studio.surface(),
            size,
            self.session.pixel_density,
        ));
    }

    pub(crate) fn transition(&mut self, state: SessionState) {
        tracing::debug!(
            generation = self.session.generation.0,
            from = ?self.session.state,
            to = ?state,
            "session transition"
        );
        self.session.state = state;
        if self.is_current() {
            let latest = self.studio.progress().latest();
            let (frame, pct) = if latest.generation == self.session.generation {
                (latest.frame, latest.percent)
            } else {
                (0, 0)
            };
            self.studio.progress().publish(Progress {
                generation: self.session.generation,
                state,
                frame,
                percent: pct,
            });
        }
    }

    /// Publish `done` of `total` units of work. Stale sessions publish nothing.
    pub(crate) fn publish(&self, done: u64, total: u64) {
        if !self.is_current() {
            return;
        }
        self.studio.progress().publish(Progress {
            generation: self.session.generation,
            state: self.session.state,
            frame: done,
            percent: percent(done, total),
        });
    }

    /// Restore the surface, publish the terminal state and reset progress.
    pub(crate) fn close(mut self, terminal: SessionState) {
        self.closed = true;
        if let Some(lease) = self.lease.take() {
            lease.restore();
        }
        self.transition(terminal);
        if self.is_current() {
            self.studio.progress().reset(self.session.generation);
        }
        tracing::debug!(
            generation = self.session.generation.0,
            state = ?terminal,
            "session closed"
        );
    }

    /// Close as `Failed` and report the error kind.
    pub(crate) fn fail(self, err: CaptureError) -> CaptureOutcome {
        tracing::warn!(generation = self.session.generation.0, error = %err, "capture failed");
        let kind = err.kind().unwrap_or(ErrorKind::EncoderWriteFailed);
        self.close(SessionState::Failed);
        CaptureOutcome::Failed(kind)
    }
}

impl<S: RenderSurface> Drop for CaptureScope<'_, S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Some(lease) = self.lease.take() {
            lease.restore();
        }
        if self.is_current() {
            self.studio.progress().reset(self.session.generation);
        }
        tracing::debug!(
            generation = self.session.generation.0,
            "session dropped before closing"
        );
    }
}
