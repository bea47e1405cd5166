use crate::encode::encoder::{EncoderConfig, FrameEncoder};
use crate::foundation::core::SurfaceSize;
use crate::generation::Generation;
use crate::schedule::{Pacer, TurntablePath};
use crate::session::model::{
    CaptureOutcome, CaptureSession, SessionHandle, SessionState, TurntableConfig,
};
use crate::session::scope::{CaptureScope, LoopExit};
use crate::session::studio::CaptureStudio;
use crate::surface::RenderSurface;
use tracing::Instrument as _;

/// A minted turntable capture, ready to run.
///
/// Drives `Preparing → Running → Finalizing → Done | Cancelled | Failed`. The surface size,
/// pixel density and subject azimuth are restored on every exit path, including when the
/// `run` future is dropped mid-capture.
pub struct TurntableSession<'s, S: RenderSurface> {
    studio: &'s CaptureStudio<S>,
    config: TurntableConfig,
    generation: Generation,
}

impl<'s, S: RenderSurface> TurntableSession<'s, S> {
    pub(crate) fn new(
        studio: &'s CaptureStudio<S>,
        config: TurntableConfig,
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
            kind: self.config.kind(),
        }
    }

    /// The session's request.
    pub fn config(&self) -> &TurntableConfig {
        &self.config
    }

    /// Run with the encoder matching the configured format.
    pub async fn run(self) -> CaptureOutcome {
        let mut encoder = self.config.format.build_encoder(self.config.quality);
        self.run_with(encoder.as_mut()).await
    }

    /// Run, feeding frames into `encoder`.
    pub async fn run_with(self, encoder: &mut dyn FrameEncoder) -> CaptureOutcome {
        let span = tracing::debug_span!("turntable", generation = self.generation.0);
        self.drive(encoder).instrument(span).await
    }

    async fn drive(self, encoder: &mut dyn FrameEncoder) -> CaptureOutcome {
        let cfg = &self.config;
        let session = CaptureSession::new(
            self.generation,
            cfg.kind(),
            SurfaceSize {
                width: cfg.width,
                height: cfg.height,
            },
            cfg.total_frames,
        );
        let Some(mut scope) = CaptureScope::enter(self.studio, session).await else {
            return CaptureOutcome::Superseded;
        };

        scope.transition(SessionState::Preparing);
        let start_angle = scope.surface().azimuth();
        scope.acquire_surface();
        let path = TurntablePath {
            total_frames: cfg.total_frames,
            start_angle,
            direction: cfg.direction,
            easing: cfg.easing,
        };
        let encoder_cfg = EncoderConfig {
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            total_frames: cfg.total_frames,
            name_hint: cfg.filename_hint.clone(),
        };
        if let Err(err) = encoder.start(encoder_cfg) {
            scope.transition(SessionState::Finalizing);
            discard_finish(encoder);
            return scope.fail(err);
        }

        scope.transition(SessionState::Running);
        let pacer = cfg.format.is_stream().then(|| Pacer::new(cfg.fps));
        let exit = capture_frames(&scope, encoder, &path, pacer).await;

        scope.transition(SessionState::Finalizing);
        match exit {
            LoopExit::Completed => match encoder.finish(false) {
                Ok(artifact) => {
                    scope.close(SessionState::Done);
                    CaptureOutcome::Completed(artifact)
                }
                Err(err) => scope.fail(err),
            },
            LoopExit::Cancelled => match encoder.finish(true) {
                Ok(artifact) if artifact.frame_count_delivered == 0 => {
                    scope.close(SessionState::Cancelled);
                    CaptureOutcome::Cancelled
                }
                Ok(mut artifact) => {
                    artifact.was_partial = true;
                    scope.close(SessionState::Cancelled);
                    CaptureOutcome::Partial(artifact)
                }
                Err(err) => scope.fail(err),
            },
            LoopExit::Superseded => {
                discard_finish(encoder);
                scope.close(SessionState::Cancelled);
                CaptureOutcome::Superseded
            }
            LoopExit::Failed(err) => {
                discard_finish(encoder);
                scope.fail(err)
            }
        }
    }
}

/// Close the backend on a path that hands off no artifact.
fn discard_finish(encoder: &mut dyn FrameEncoder) {
    if let Err(err) = encoder.finish(true) {
        tracing::debug!(error = %err, "discarded encoder finish failed");
    }
}

/// The frame loop. One composite wait per frame, plus a pacing wait for streams.
async fn capture_frames<S: RenderSurface>(
    scope: &CaptureScope<'_, S>,
    encoder: &mut dyn FrameEncoder,
    path: &TurntablePath,
    mut pacer: Option<Pacer>,
) -> LoopExit {
    let surface = scope.surface();
    let total = scope.session().total_frames;
    for request in path.requests() {
        if let Some(exit) = scope.interrupted() {
            return exit;
        }
        if let Some(p) = pacer.as_mut() {
            p.begin_frame(tokio::time::Instant::now());
        }

        surface.set_azimuth(request.angle_radians);
        surface.next_composited_frame().await;
        if let Some(exit) = scope.interrupted() {
            return exit;
        }

        let pixels = surface.read_pixels();
        if let Err(err) = encoder.submit_frame(request.index, &pixels) {
            return LoopExit::Failed(err);
        }
        tracing::trace!(
            frame = request.index.0,
            angle = request.angle_radians,
            "frame submitted"
        );
        scope.publish(request.index.0 + 1, total);

        if let Some(p) = pacer.as_mut() {
            p.wait().await;
        }
    }
    LoopExit::Completed
}

#[cfg(test)]
#[path = "../../tests/unit/session/turntable.rs"]
mod tests;
