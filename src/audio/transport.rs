// Seekable single-file player for the gift recording
// One dedicated thread plays one WAV file with pause/resume/seek and live
// position telemetry. Pause and stop are signaled through a condition
// variable, so the thread blocks instead of busy-polling while paused.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::{debug, warn};

use super::output::SinkFactory;
use super::source::WavSource;
use super::{AudioError, PlaybackControl, TransportControl, CHUNK_FRAMES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Playing,
    Paused,
    /// Terminal: reached on stop request, end of data, or read failure.
    Stopped,
}

struct Control {
    state: TransportState,
    /// Seek target applied by the session thread at the next chunk boundary.
    pending_seek: Option<u64>,
}

struct Shared {
    control: Mutex<Control>,
    wakeup: Condvar,
    /// Current read offset in frames. Written by the session thread,
    /// polled by the controller; brief staleness is fine for a progress bar.
    position: AtomicU64,
    total_frames: u64,
    sample_rate: u32,
}

/// Point-in-time view of a session, shaped for a polling progress display.
#[derive(Debug, Clone, Serialize)]
pub struct TransportSnapshot {
    pub playing: bool,
    pub paused: bool,
    pub position: u64,
    pub total_frames: u64,
    pub sample_rate: u32,
    pub percent: u32,
    pub elapsed: String,
    pub total: String,
}

pub struct TransportPlayer {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl TransportPlayer {
    /// Open `path`, capture its header metadata, and start playing on a
    /// dedicated thread. Open and stream failures end the session here;
    /// there is no fallback file.
    pub fn start<F>(path: impl AsRef<Path>, factory: F) -> Result<Self, AudioError>
    where
        F: SinkFactory + 'static,
    {
        let path = path.as_ref().to_path_buf();
        let source = WavSource::open(&path)?;

        let shared = Arc::new(Shared {
            control: Mutex::new(Control {
                state: TransportState::Playing,
                pending_seek: None,
            }),
            wakeup: Condvar::new(),
            position: AtomicU64::new(0),
            total_frames: source.total_frames(),
            sample_rate: source.spec().sample_rate,
        });

        let session = shared.clone();
        let session_path = path.clone();
        let thread = std::thread::Builder::new()
            .name("wishcard-gift".into())
            .spawn(move || run_session(source, factory, session, session_path))?;

        Ok(Self {
            shared,
            thread: Some(thread),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> TransportState {
        self.shared.control.lock().state
    }

    /// Current read offset in frames. May lag the control calls by up to
    /// one chunk.
    pub fn position(&self) -> u64 {
        self.shared.position.load(Ordering::Relaxed)
    }

    pub fn total_frames(&self) -> u64 {
        self.shared.total_frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        let state = self.state();
        let position = self.position();
        let total_frames = self.shared.total_frames;
        let sample_rate = self.shared.sample_rate;
        TransportSnapshot {
            playing: state == TransportState::Playing,
            paused: state == TransportState::Paused,
            position,
            total_frames,
            sample_rate,
            percent: progress_percent(position, total_frames),
            elapsed: format_clock(position, sample_rate),
            total: format_clock(total_frames, sample_rate),
        }
    }

    /// Block until the session thread exits. Used by the pre-flight check
    /// and the tests; a UI caller polls instead.
    pub fn wait(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn request_seek(&self, target: u64) {
        let mut control = self.shared.control.lock();
        if control.state == TransportState::Stopped {
            return;
        }
        control.pending_seek = Some(target);
        self.shared.wakeup.notify_one();
    }

    fn seek_by(&self, delta_frames: i64) {
        let control = self.shared.control.lock();
        if control.state == TransportState::Stopped {
            return;
        }
        let base = control
            .pending_seek
            .unwrap_or_else(|| self.shared.position.load(Ordering::Relaxed));
        drop(control);
        let target = (base as i64 + delta_frames).clamp(0, self.shared.total_frames as i64);
        self.request_seek(target as u64);
    }
}

impl PlaybackControl for TransportPlayer {
    fn stop(&self) {
        let mut control = self.shared.control.lock();
        if control.state != TransportState::Stopped {
            control.state = TransportState::Stopped;
            self.shared.wakeup.notify_one();
        }
    }

    fn is_active(&self) -> bool {
        self.state() != TransportState::Stopped
    }
}

impl TransportControl for TransportPlayer {
    fn pause(&self) {
        let mut control = self.shared.control.lock();
        if control.state == TransportState::Playing {
            control.state = TransportState::Paused;
            self.shared.wakeup.notify_one();
        }
    }

    fn resume(&self) {
        let mut control = self.shared.control.lock();
        if control.state == TransportState::Paused {
            control.state = TransportState::Playing;
            self.shared.wakeup.notify_one();
        }
    }

    fn fast_forward(&self, seconds: u32) {
        self.seek_by(seconds as i64 * self.shared.sample_rate as i64);
    }

    fn rewind(&self, seconds: u32) {
        self.seek_by(-(seconds as i64 * self.shared.sample_rate as i64));
    }

    /// Absolute positioning for a slider drag. Out-of-range requests and
    /// requests against a finished session are ignored.
    fn set_position(&self, frame: u64) {
        if frame > self.shared.total_frames {
            return;
        }
        self.request_seek(frame);
    }
}

impl Drop for TransportPlayer {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

fn run_session(
    mut source: WavSource,
    factory: impl SinkFactory,
    shared: Arc<Shared>,
    path: PathBuf,
) {
    debug!(?path, frames = shared.total_frames, "gift session started");

    let mut sink = match factory.open(source.spec()) {
        Ok(sink) => sink,
        Err(e) => {
            warn!(?path, error = %e, "could not open output stream, ending session");
            shared.control.lock().state = TransportState::Stopped;
            return;
        }
    };

    loop {
        // Apply repositioning and wait out pauses before touching the file.
        {
            let mut control = shared.control.lock();
            loop {
                if let Some(frame) = control.pending_seek.take() {
                    match source.seek(frame) {
                        Ok(()) => shared.position.store(source.position(), Ordering::Relaxed),
                        Err(e) => warn!(?path, frame, error = %e, "seek failed"),
                    }
                }
                match control.state {
                    TransportState::Stopped => return,
                    TransportState::Paused => shared.wakeup.wait(&mut control),
                    TransportState::Playing => break,
                }
            }
        }

        let chunk = match source.read_chunk(CHUNK_FRAMES) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(?path, error = %e, "read failed, ending session");
                break;
            }
        };
        if chunk.is_empty() {
            break;
        }

        sink.write(&chunk);
        shared.position.store(source.position(), Ordering::Relaxed);
    }

    shared.control.lock().state = TransportState::Stopped;
    debug!(?path, "gift session ended");
    // source and sink drop here, releasing the file and the stream
}

/// Integer progress percentage, rounded down.
pub fn progress_percent(position: u64, total_frames: u64) -> u32 {
    if total_frames == 0 {
        return 0;
    }
    (position * 100 / total_frames) as u32
}

/// `minutes:seconds` display for a frame count at the given rate.
pub fn format_clock(frames: u64, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return "0:00".to_string();
    }
    let seconds = frames / sample_rate as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
