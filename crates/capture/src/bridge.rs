//! The capture bridge: surface → frame stream.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use paircast_common::{frame_interval, PaircastError, PaircastResult};
use paircast_compositor::{CompositeSurface, Frame};
use tokio::sync::mpsc;

/// Queue depth between the sampler and the recorder. When the encoder
/// falls behind, the newest samples are dropped and counted; chunk
/// order is unaffected because the recorder is the only consumer.
const STREAM_CAPACITY: usize = 8;

/// Runtime statistics from the capture bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeStats {
    /// Frames sampled from the surface.
    pub frames_sampled: u64,

    /// Frames dropped because the stream queue was full.
    pub frames_dropped: u64,
}

impl BridgeStats {
    /// Drop rate as a percentage.
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_sampled + self.frames_dropped;
        if total == 0 {
            return 0.0;
        }
        self.frames_dropped as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct StatsCounters {
    sampled: AtomicU64,
    dropped: AtomicU64,
}

/// An ordered stream of frames sampled from the composite surface.
#[derive(Debug)]
pub struct SurfaceStream {
    rx: mpsc::Receiver<Frame>,
}

impl SurfaceStream {
    /// Create a stream fed manually through the returned sender.
    /// The bridge uses this internally; tests use it to inject frames.
    pub fn channel() -> (mpsc::Sender<Frame>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        (tx, Self { rx })
    }

    /// Next sampled frame, or `None` once the bridge has stopped.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Next sampled frame if one is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.rx.try_recv().ok()
    }
}

/// Samples the composite surface at a fixed frame rate into a
/// [`SurfaceStream`].
///
/// Must be created only after the surface has frozen dimensions, and
/// may begin capture exactly once; a second `begin_capture` fails with
/// `CaptureInit`.
pub struct CaptureBridge {
    frame_rate: u32,
    started: bool,
    stop_flag: Arc<AtomicBool>,
    counters: Arc<StatsCounters>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl CaptureBridge {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate,
            started: false,
            stop_flag: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(StatsCounters::default()),
            task: None,
        }
    }

    /// Begin continuously sampling `surface` into a frame stream.
    ///
    /// The sampling timer is independent of the draw loop; each tick
    /// snapshots whatever is currently on the surface.
    pub fn begin_capture(
        &mut self,
        surface: Arc<Mutex<CompositeSurface>>,
    ) -> PaircastResult<SurfaceStream> {
        if self.started {
            return Err(PaircastError::capture_init(
                "capture stream already exists; re-creating it mid-session is unsupported",
            ));
        }
        self.started = true;

        let (tx, stream) = SurfaceStream::channel();
        let stop_flag = Arc::clone(&self.stop_flag);
        let counters = Arc::clone(&self.counters);
        let interval = frame_interval(self.frame_rate);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Best-effort pacing: missed ticks are delayed, not replayed.
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }

                let snapshot = match surface.lock() {
                    Ok(guard) => guard.snapshot(),
                    Err(_) => break,
                };

                match tx.try_send(snapshot) {
                    Ok(()) => {
                        counters.sampled.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        counters.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
            // Sender drops here; the stream ends for its consumer.
        });

        self.task = Some(task);
        tracing::info!(frame_rate = self.frame_rate, "Capture bridge started");
        Ok(stream)
    }

    /// Stop sampling and close the stream.
    pub async fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Capture bridge task join failed");
            }
        }
        let stats = self.stats();
        tracing::info!(
            frames_sampled = stats.frames_sampled,
            frames_dropped = stats.frames_dropped,
            "Capture bridge stopped"
        );
    }

    /// Sampling statistics so far.
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            frames_sampled: self.counters.sampled.load(Ordering::Relaxed),
            frames_dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}
