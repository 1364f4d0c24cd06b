// Sequential file player for the background clips
// Plays an ordered list of WAV files back-to-back on a dedicated thread
// with a fixed delay between files. A bad file is logged and skipped,
// never aborting the rest of the sequence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};

use super::output::SinkFactory;
use super::source::WavSource;
use super::{PlaybackControl, CHUNK_FRAMES};

struct Shared {
    stop: Mutex<bool>,
    wakeup: Condvar,
    done: AtomicBool,
}

impl Shared {
    fn stopped(&self) -> bool {
        *self.stop.lock()
    }

    /// Wait out the inter-file delay, returning early if stop is requested.
    /// Returns whether the session was stopped.
    fn wait_delay(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut stop = self.stop.lock();
        while !*stop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.wakeup.wait_for(&mut stop, deadline - now);
        }
        *stop
    }
}

pub struct SequentialPlayer {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl SequentialPlayer {
    /// Begin playing `paths` in order on a dedicated thread and return
    /// immediately. Per-file failures are logged and skipped; the session
    /// itself never reports an error.
    pub fn start<F>(paths: Vec<PathBuf>, inter_file_delay: Duration, factory: F) -> Self
    where
        F: SinkFactory + 'static,
    {
        let shared = Arc::new(Shared {
            stop: Mutex::new(false),
            wakeup: Condvar::new(),
            done: AtomicBool::new(false),
        });

        let session = shared.clone();
        let thread = std::thread::Builder::new()
            .name("wishcard-background".into())
            .spawn(move || run_sequence(paths, inter_file_delay, factory, session));

        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(e) => {
                error!(error = %e, "could not spawn playback thread");
                shared.done.store(true, Ordering::SeqCst);
                None
            }
        };

        Self { shared, thread }
    }

    /// Block until the sequence finishes. Used by the pre-flight check
    /// and the tests.
    pub fn wait(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl PlaybackControl for SequentialPlayer {
    fn stop(&self) {
        let mut stop = self.shared.stop.lock();
        if !*stop {
            *stop = true;
            self.shared.wakeup.notify_all();
        }
    }

    fn is_active(&self) -> bool {
        !self.shared.done.load(Ordering::SeqCst)
    }
}

impl Drop for SequentialPlayer {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

fn run_sequence(
    paths: Vec<PathBuf>,
    inter_file_delay: Duration,
    factory: impl SinkFactory,
    shared: Arc<Shared>,
) {
    debug!(files = paths.len(), "background sequence started");

    let mut first = true;
    for path in &paths {
        if shared.stopped() {
            break;
        }
        if !first && shared.wait_delay(inter_file_delay) {
            break;
        }
        first = false;
        play_file(path, &factory, &shared);
    }

    shared.done.store(true, Ordering::SeqCst);
    debug!("background sequence ended");
}

fn play_file(path: &std::path::Path, factory: &impl SinkFactory, shared: &Shared) {
    let mut source = match WavSource::open(path) {
        Ok(source) => source,
        Err(e) => {
            warn!(?path, error = %e, "skipping file");
            return;
        }
    };

    let mut sink = match factory.open(source.spec()) {
        Ok(sink) => sink,
        Err(e) => {
            warn!(?path, error = %e, "could not open output stream, skipping file");
            return;
        }
    };

    loop {
        if shared.stopped() {
            break;
        }
        let chunk = match source.read_chunk(CHUNK_FRAMES) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(?path, error = %e, "read failed, skipping rest of file");
                break;
            }
        };
        if chunk.is_empty() {
            break;
        }
        sink.write(&chunk);
    }
    // source and sink drop here before the inter-file delay
}
