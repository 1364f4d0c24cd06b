// Audio playback sessions for the greeting card
// A sequential player for the background clips and a seekable transport
// player for the gift recording. Both run on a dedicated thread and are
// controlled cooperatively from the UI side.

pub mod output;
pub mod sequential;
pub mod source;
pub mod transport;

pub use output::{AudioSink, CpalSinkFactory, SinkFactory};
pub use sequential::SequentialPlayer;
pub use transport::{TransportPlayer, TransportSnapshot, TransportState};

use std::path::PathBuf;
use thiserror::Error;

/// Frames moved per read/write cycle.
pub const CHUNK_FRAMES: usize = 1024;

/// Errors raised while setting up a playback session. Once a session is
/// running, failures are logged and end the session instead of propagating.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("no audio output device available")]
    NoDevice,
    #[error("failed to query output config: {0}")]
    OutputConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported output sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("failed to spawn playback thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Minimal control surface shared by both player kinds.
pub trait PlaybackControl {
    /// Request cooperative termination. Observed at chunk granularity.
    fn stop(&self);
    /// Whether the session thread is still running.
    fn is_active(&self) -> bool;
}

/// Transport controls offered by the seekable player on top of
/// [`PlaybackControl`]. Redundant transitions and out-of-range positions
/// are silent no-ops.
pub trait TransportControl: PlaybackControl {
    fn pause(&self);
    fn resume(&self);
    fn fast_forward(&self, seconds: u32);
    fn rewind(&self, seconds: u32);
    fn set_position(&self, frame: u64);
}
