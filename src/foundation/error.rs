/// Result alias used throughout the crate.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors raised by capture sessions, encoders and configuration loading.
///
/// Cancellation and supersession are not errors; they surface as
/// [`CaptureOutcome`](crate::CaptureOutcome) variants.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// Invalid request or configuration, rejected before a session starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// The encoder backend could not begin a stream or sequence encode.
    #[error("encoder init error: {0}")]
    EncoderInit(String),

    /// A frame submission or finalization failed mid-session.
    #[error("encoder write error: {0}")]
    EncoderWrite(String),

    /// Anything else, usually I/O with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal error kinds reported to the UI boundary as a session's terminal event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Backend could not start; no artifact.
    EncoderInitFailed,
    /// A submit (or the final flush) failed; buffered frames are discarded.
    EncoderWriteFailed,
}

impl CaptureError {
    /// Build a [`CaptureError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptureError::EncoderInit`].
    pub fn encoder_init(msg: impl Into<String>) -> Self {
        Self::EncoderInit(msg.into())
    }

    /// Build a [`CaptureError::EncoderWrite`].
    pub fn encoder_write(msg: impl Into<String>) -> Self {
        Self::EncoderWrite(msg.into())
    }

    /// Terminal kind for errors that end a running session.
    ///
    /// `Other` errors raised by an encoder are treated as write failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Validation(_) => None,
            Self::EncoderInit(_) => Some(ErrorKind::EncoderInitFailed),
            Self::EncoderWrite(_) | Self::Other(_) => Some(ErrorKind::EncoderWriteFailed),
        }
    }
}
