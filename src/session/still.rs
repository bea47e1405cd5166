use crate::encode::encoder::Artifact;
use crate::encode::still::encode_still;
use crate::foundation::core::SurfaceSize;
use crate::generation::Generation;
use crate::session::model::{
    CaptureOutcome, CaptureSession, SessionHandle, SessionKind, SessionState, StillConfig,
};
use crate::session::scope::{CaptureScope, LoopExit};
use crate::session::studio::CaptureStudio;
use crate::surface::RenderSurface;
use tracing::Instrument as _;

/// A minted high-resolution still render, ready to run.
///
/// Waits for `sample_count` composited frames so the renderer can accumulate, then reads the
/// surface back once and encodes it.
pub struct StillSession<'s, S: RenderSurface> {
    studio: &'s CaptureStudio<S>,
    config: StillConfig,
    generation: Generation,
}

impl<'s, S: RenderSurface> StillSession<'s, S> {
    pub(crate) fn new(
        studio: &'s CaptureStudio<S>,
        config: StillConfig,
        generation: Generation,
    ) -> Self {
        Self {
            studio,
            config,
            generation,
        }
    }

    /// Handle for cancelling this session.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            generation: self.generation,
            kind: SessionKind::Still,
        }
    }

    /// The session's request.
    pub fn config(&self) -> &StillConfig {
        &self.config
    }

    /// Accumulate, read back and encode.
    pub async fn run(self) -> CaptureOutcome {
        let span = tracing::debug_span!("still", generation = self.generation.0);
        self.drive().instrument(span).await
    }

    async fn drive(self) -> CaptureOutcome {
        let cfg = &self.config;
        let size = SurfaceSize {
            width: cfg.width,
            height: cfg.height,
        };
        let session = CaptureSession::new(self.generation, SessionKind::Still, size, 1);
        let Some(mut scope) = CaptureScope::enter(self.studio, session).await else {
            return CaptureOutcome::Superseded;
        };

        scope.transition(SessionState::Preparing);
        scope.acquire_surface();
        scope.transition(SessionState::Running);

        let exit = accumulate(&scope, u64::from(cfg.sample_count)).await;
        match exit {
            LoopExit::Completed => {}
            LoopExit::Cancelled => {
                scope.transition(SessionState::Finalizing);
                scope.close(SessionState::Cancelled);
                return CaptureOutcome::Cancelled;
            }
            LoopExit::Superseded => {
                scope.close(SessionState::Cancelled);
                return CaptureOutcome::Superseded;
            }
            LoopExit::Failed(err) => return scope.fail(err),
        }

        let pixels = scope.surface().read_pixels();
        scope.transition(SessionState::Finalizing);
        match encode_still(&pixels, cfg.format, cfg.quality) {
            Ok(bytes) => {
                let artifact = Artifact {
                    bytes,
                    suggested_name: format!(
                        "{}_{}x{}.{}",
                        cfg.filename_hint,
                        pixels.width,
                        pixels.height,
                        cfg.format.extension()
                    ),
                    frame_count_delivered: 1,
                    was_partial: false,
                };
                scope.close(SessionState::Done);
                CaptureOutcome::Completed(artifact)
            }
            Err(err) => scope.fail(err),
        }
    }
}

/// One composite wait per accumulation tick.
async fn accumulate<S: RenderSurface>(scope: &CaptureScope<'_, S>, sample_count: u64) -> LoopExit {
    let surface = scope.surface();
    for tick in 1..=sample_count {
        if let Some(exit) = scope.interrupted() {
            return exit;
        }
        surface.next_composited_frame().await;
        if let Some(exit) = scope.interrupted() {
            return exit;
        }
        tracing::trace!(tick, sample_count, "accumulation tick");
        scope.publish(tick, sample_count);
    }
    LoopExit::Completed
}

#[cfg(test)]
#[path = "../../tests/unit/session/still.rs"]
mod tests;
