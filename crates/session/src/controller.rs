//! The session controller.

use std::sync::{Arc, Mutex};

use paircast_capture::{Artifact, CaptureBridge, ChunkEncoder, Recorder};
use paircast_common::{frame_interval, PaircastError, PaircastResult, RecordingDefaults};
use paircast_compositor::{CompositeSurface, SurfaceSize};
use paircast_media_source::{wait_all_ready, FrameSource, SourceRegistry, SourceSlot};
use tokio::sync::watch;

/// Lifecycle of a session.
///
/// ```text
/// Waiting ──(both slots loaded)──► Ready ──start──► Playing ──stop──► Ended
///                                    │                                  ▲
///                                    └────────────stop─────────────────-┘
/// ```
///
/// `Ended` is terminal; a new session requires a new controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Fewer than two sources loaded.
    Waiting,
    /// Both sources loaded; playback not started.
    Ready,
    /// Drawing, capturing, and recording.
    Playing,
    /// Stopped. The artifact (if any) has been announced.
    Ended,
}

/// Builds the encoder once the surface dimensions are known.
pub type EncoderFactory =
    Box<dyn Fn(SurfaceSize, u32) -> PaircastResult<Box<dyn ChunkEncoder>> + Send>;

/// Orchestrates one recording session end to end.
///
/// Owns the registry, the surface, the draw loop, the capture bridge,
/// and the recorder. Everything is single-shot: `start` happens at
/// most once, and `stop` tears the whole pipeline down.
pub struct SessionController {
    registry: Arc<Mutex<SourceRegistry>>,
    defaults: RecordingDefaults,
    state: SessionState,
    surface: Option<Arc<Mutex<CompositeSurface>>>,
    bridge: Option<CaptureBridge>,
    recorder: Recorder,
    encoder_factory: EncoderFactory,
    draw_task: Option<tokio::task::JoinHandle<()>>,
}

impl SessionController {
    pub fn new(defaults: RecordingDefaults, encoder_factory: EncoderFactory) -> Self {
        let recorder = Recorder::new(defaults.output_name.clone());
        Self {
            registry: Arc::new(Mutex::new(SourceRegistry::new())),
            defaults,
            state: SessionState::Waiting,
            surface: None,
            bridge: None,
            recorder,
            encoder_factory,
            draw_task: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frozen surface dimensions, available once playback has started.
    pub fn surface_size(&self) -> Option<SurfaceSize> {
        let surface = self.surface.as_ref()?;
        let guard = surface.lock().ok()?;
        Some(guard.size())
    }

    /// Watch channel that fires once with the finished artifact.
    pub fn artifact_watch(&self) -> watch::Receiver<Option<Artifact>> {
        self.recorder.artifact_watch()
    }

    /// Assign a source to a slot. Re-assigning a slot replaces its
    /// source. Moves the session from `Waiting` to `Ready` once both
    /// slots are occupied; has no state effect after that.
    pub fn load_source(
        &mut self,
        slot: SourceSlot,
        source: Box<dyn FrameSource>,
    ) -> PaircastResult<()> {
        let both_loaded = {
            let mut registry = self
                .registry
                .lock()
                .map_err(|_| PaircastError::session("source registry lock poisoned"))?;
            registry.load_source(slot, source);
            registry.both_loaded()
        };

        if self.state == SessionState::Waiting && both_loaded {
            self.state = SessionState::Ready;
            tracing::info!("Both sources loaded; session ready");
        }
        Ok(())
    }

    /// Start synchronized playback and recording.
    ///
    /// Silently does nothing unless the session is `Ready`. Waits for
    /// both sources to report metadata before sizing the surface, so a
    /// start issued right after loading never races the decoders.
    pub async fn start(&mut self) -> PaircastResult<()> {
        if self.state != SessionState::Ready {
            tracing::debug!(state = ?self.state, "Start ignored");
            return Ok(());
        }

        // Clone the readiness signals out so the lock is not held
        // across the await.
        let signals = {
            let registry = self
                .registry
                .lock()
                .map_err(|_| PaircastError::session("source registry lock poisoned"))?;
            registry.metadata_signals()
        };
        wait_all_ready(signals).await?;

        let size = {
            let registry = self
                .registry
                .lock()
                .map_err(|_| PaircastError::session("source registry lock poisoned"))?;
            let left = registry
                .natural_size(SourceSlot::One)
                .ok_or_else(|| PaircastError::not_ready("left source has no dimensions"))?;
            let right = registry
                .natural_size(SourceSlot::Two)
                .ok_or_else(|| PaircastError::not_ready("right source has no dimensions"))?;
            SurfaceSize::compute(left, right)?
        };
        tracing::info!(
            width = size.width,
            height = size.height,
            left_width = size.left_width,
            "Surface sized"
        );

        let surface = Arc::new(Mutex::new(CompositeSurface::new(size)));
        self.surface = Some(Arc::clone(&surface));

        let frame_rate = self.defaults.frame_rate;
        let mut bridge = CaptureBridge::new(frame_rate);
        let stream = bridge.begin_capture(Arc::clone(&surface))?;
        self.bridge = Some(bridge);

        // Encoder setup failures here are fatal for the session.
        let encoder = (self.encoder_factory)(size, frame_rate)?;
        self.recorder.bind(stream, encoder);

        {
            let mut registry = self
                .registry
                .lock()
                .map_err(|_| PaircastError::session("source registry lock poisoned"))?;
            registry.play_all()?;
        }

        let registry = Arc::clone(&self.registry);
        let draw_surface = Arc::clone(&surface);
        let interval = frame_interval(frame_rate);
        let draw_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let (left, right) = {
                    let Ok(registry) = registry.lock() else { break };
                    registry.current_frames()
                };
                let Ok(mut surface) = draw_surface.lock() else { break };
                surface.draw_frame(left.as_ref(), right.as_ref());
            }
        });
        self.draw_task = Some(draw_task);

        self.recorder.start()?;
        self.state = SessionState::Playing;
        tracing::info!(frame_rate, "Session playing");
        Ok(())
    }

    /// Stop the session.
    ///
    /// From `Playing` this pauses both sources, closes the capture
    /// stream, and finalizes the recording; the artifact is announced
    /// on the watch channel. From `Ready` it just ends the session
    /// without producing an artifact. Otherwise a no-op. Idempotent.
    pub async fn stop(&mut self) -> PaircastResult<()> {
        match self.state {
            SessionState::Playing => {}
            SessionState::Ready => {
                self.state = SessionState::Ended;
                tracing::info!("Session ended before playback; no artifact");
                return Ok(());
            }
            SessionState::Waiting | SessionState::Ended => return Ok(()),
        }

        if let Some(draw_task) = self.draw_task.take() {
            draw_task.abort();
            let _ = draw_task.await;
        }

        if let Some(mut bridge) = self.bridge.take() {
            bridge.stop().await;
            let stats = bridge.stats();
            if stats.frames_dropped > 0 {
                tracing::warn!(
                    frames_dropped = stats.frames_dropped,
                    drop_rate = format!("{:.1}%", stats.drop_rate()),
                    "Capture dropped frames"
                );
            }
        }

        {
            let mut registry = self
                .registry
                .lock()
                .map_err(|_| PaircastError::session("source registry lock poisoned"))?;
            registry.pause_all()?;
        }

        self.recorder.stop().await;
        self.state = SessionState::Ended;
        tracing::info!("Session ended");
        Ok(())
    }
}
