//! Orbitcap takes over a live rendering surface to produce deterministic offline captures.
//!
//! The external renderer keeps drawing; the capture core only resizes the surface, changes its
//! pixel density, rotates the subject and reads pixels back. The public API is
//! session-oriented:
//!
//! - Wrap a [`RenderSurface`] in a [`CaptureStudio`]
//! - Start a [`TurntableSession`] or [`StillSession`] and `run` it
//! - Cancel by [`Generation`], watch [`Progress`], collect the [`CaptureOutcome`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Built-in software rendering surface.
pub mod demo;
/// Stream, sequence and still encoders.
pub mod encode;
/// Generation tokens for cooperative cancellation.
pub mod generation;
/// JSON capture presets.
pub mod preset;
/// Frame index to angle mapping and stream pacing.
pub mod schedule;
/// Capture studio and session orchestrators.
pub mod session;
/// Renderer boundary and scoped surface reconfiguration.
pub mod surface;

pub use crate::foundation::core::{Fps, FrameIndex, PixelBuffer, SurfaceSize};
pub use crate::foundation::error::{CaptureError, CaptureResult, ErrorKind};

pub use crate::demo::SoftwareSurface;
pub use crate::encode::TurntableFormat;
pub use crate::encode::encoder::{Artifact, EncoderConfig, FrameEncoder};
pub use crate::encode::memory::InMemoryEncoder;
pub use crate::encode::sequence::SequenceEncoder;
pub use crate::encode::still::{StillFormat, encode_still};
pub use crate::encode::stream::{StreamEncoder, StreamEncoderOpts, VideoContainer};
pub use crate::generation::{Generation, GenerationClock};
pub use crate::preset::CapturePreset;
pub use crate::schedule::{Direction, Easing, FrameRequest, Pacer, TurntablePath, angle_at};
pub use crate::session::model::{
    CaptureOutcome, CaptureSession, SessionHandle, SessionKind, SessionState, StillConfig,
    TurntableConfig,
};
pub use crate::session::progress::Progress;
pub use crate::session::still::StillSession;
pub use crate::session::studio::CaptureStudio;
pub use crate::session::turntable::TurntableSession;
pub use crate::surface::{RenderSurface, SurfaceLease, SurfaceSnapshot};
