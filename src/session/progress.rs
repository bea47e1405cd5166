use crate::generation::Generation;
use crate::session::model::SessionState;
use tokio::sync::watch;

/// Snapshot of capture progress, as seen by the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Progress {
    /// Session that published this snapshot.
    pub generation: Generation,
    /// Lifecycle state.
    pub state: SessionState,
    /// Number of frames (or accumulation ticks) completed.
    pub frame: u64,
    /// Rounded completion percentage, 0..=100.
    pub percent: u8,
}

/// `round(100 * done / total)`, clamped to 100.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((100.0 * done as f64 / total as f64).round() as u64).min(100) as u8
}

/// Latest-value progress channel fed by the orchestrators.
///
/// Subscribers see the most recent snapshot; intermediate values may be skipped.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<Progress>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Reporter starting at idle / zero.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Progress::default());
        Self { tx }
    }

    /// New receiver observing future snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Progress {
        *self.tx.borrow()
    }

    pub(crate) fn publish(&self, progress: Progress) {
        self.tx.send_replace(progress);
    }

    pub(crate) fn reset(&self, generation: Generation) {
        self.publish(Progress {
            generation,
            ..Progress::default()
        });
    }
}
