//! The frame source contract.

use paircast_common::{PaircastError, PaircastResult};
use paircast_compositor::Frame;
use tokio::sync::watch;

/// Playback state of a single video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media bound yet.
    Unloaded,
    /// Media bound and prerolled; not advancing.
    Loaded,
    /// Frames advancing in real time.
    Playing,
    /// Suspended; the last decoded frame remains current.
    Paused,
}

/// Trait for a decodable video source.
///
/// Implementations wrap a GStreamer decode pipeline for files, or
/// generate frames procedurally for tests.
pub trait FrameSource: Send {
    /// Natural (intrinsic decoded) dimensions, available only after
    /// metadata readiness. `None` before then; callers should await
    /// [`FrameSource::metadata_ready`] instead of polling this.
    fn natural_size(&self) -> Option<(u32, u32)>;

    /// Current playback state.
    fn playback(&self) -> PlaybackState;

    /// Begin or resume real-time playback.
    fn play(&mut self) -> PaircastResult<()>;

    /// Suspend playback; the last decoded frame stays current.
    fn pause(&mut self) -> PaircastResult<()>;

    /// The most recently decoded frame, if any has arrived yet.
    fn current_frame(&self) -> Option<Frame>;

    /// Watch channel that flips to `true` once natural dimensions and
    /// the first decodable frame are available.
    fn metadata_ready(&self) -> watch::Receiver<bool>;
}

/// Await metadata readiness of every given source signal.
///
/// Resolves immediately for sources that are already ready. Fails if a
/// source is dropped before ever becoming ready.
pub async fn wait_all_ready(signals: Vec<watch::Receiver<bool>>) -> PaircastResult<()> {
    for mut signal in signals {
        while !*signal.borrow_and_update() {
            signal.changed().await.map_err(|_| {
                PaircastError::not_ready("source dropped before reporting metadata")
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_all_ready_resolves_for_ready_sources() {
        let (tx_a, rx_a) = watch::channel(true);
        let (tx_b, rx_b) = watch::channel(false);

        let waiter = tokio::spawn(wait_all_ready(vec![rx_a, rx_b]));
        tx_b.send(true).unwrap();
        waiter.await.unwrap().unwrap();
        drop(tx_a);
    }

    #[tokio::test]
    async fn wait_all_ready_fails_on_dropped_source() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        assert!(wait_all_ready(vec![rx]).await.is_err());
    }
}
