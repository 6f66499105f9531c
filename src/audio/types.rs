//! Audio-related small types shared between the controller, the poller and
//! the UI thread.

/// The playback state of the player. Only the controller mutates it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// A point-in-time read of elapsed and total playback time, in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub elapsed: f64,
    pub total: f64,
}

impl ProgressSnapshot {
    pub fn new(elapsed: f64, total: f64) -> Self {
        Self { elapsed, total }
    }

    /// Elapsed share of the track in `[0, 1]`. A zero (or unknown) total yields 0.
    pub fn fraction(&self) -> f64 {
        if self.total > 0.0 && self.elapsed.is_finite() {
            (self.elapsed / self.total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Messages sent from the background poller to the UI thread.
///
/// `generation` identifies the poller that produced the event; the controller
/// drops events from pollers it has already replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A fresh progress reading for the current track.
    Progress {
        generation: u64,
        snapshot: ProgressSnapshot,
    },
    /// The engine went idle: the current track played to its end.
    Finished { generation: u64 },
    /// Reading from the engine failed; the poll loop has ended.
    Failed { generation: u64, reason: String },
}

impl PlayerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Progress { generation, .. }
            | Self::Finished { generation }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}
