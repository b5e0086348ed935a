//! Deterministic test-pattern sources.
//!
//! Used by the integration tests and `paircast check` to exercise the
//! full pipeline without touching the media stack.

use std::time::Instant;

use paircast_common::{FramePacer, PaircastResult};
use paircast_compositor::Frame;
use tokio::sync::watch;

use crate::source::{FrameSource, PlaybackState};

/// What the synthetic source paints.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// Every frame is the same solid color.
    Solid([u8; 4]),
    /// A horizontal gradient that scrolls one pixel per frame tick.
    ScrollingGradient,
}

/// A procedural video source with known dimensions and content.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    pattern: Pattern,
    playback: PlaybackState,
    started: Option<Instant>,
    pacer: FramePacer,
    ready_tx: watch::Sender<bool>,
}

impl SyntheticSource {
    /// A source whose every frame is one solid color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(width, height, Pattern::Solid(rgba))
    }

    /// A source whose content visibly changes frame to frame.
    pub fn scrolling(width: u32, height: u32) -> Self {
        Self::new(width, height, Pattern::ScrollingGradient)
    }

    fn new(width: u32, height: u32, pattern: Pattern) -> Self {
        // Metadata is known at construction; the ready signal is
        // pre-resolved so waiters fall through immediately.
        let (ready_tx, _) = watch::channel(true);
        Self {
            width,
            height,
            pattern,
            playback: PlaybackState::Loaded,
            started: None,
            pacer: FramePacer::new(30),
            ready_tx,
        }
    }

    fn frame_index(&self) -> u64 {
        match self.started {
            Some(started) => self.pacer.ticks_elapsed(started.elapsed().as_nanos() as u64),
            None => 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn natural_size(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn playback(&self) -> PlaybackState {
        self.playback
    }

    fn play(&mut self) -> PaircastResult<()> {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        self.playback = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> PaircastResult<()> {
        self.playback = PlaybackState::Paused;
        Ok(())
    }

    fn current_frame(&self) -> Option<Frame> {
        match self.pattern {
            Pattern::Solid(rgba) => Some(Frame::solid(self.width, self.height, rgba)),
            Pattern::ScrollingGradient => {
                let shift = self.frame_index() as u32;
                let mut data =
                    Vec::with_capacity((self.width * self.height) as usize * Frame::BYTES_PER_PIXEL);
                for y in 0..self.height {
                    for x in 0..self.width {
                        let v = ((x + shift) % self.width) as f64 / self.width.max(1) as f64;
                        let level = (v * 255.0) as u8;
                        data.extend_from_slice(&[level, level, (y % 256) as u8, 255]);
                    }
                }
                Frame::from_rgba(self.width, self.height, data).ok()
            }
        }
    }

    fn metadata_ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_source_reports_metadata_immediately() {
        let source = SyntheticSource::solid(640, 360, [255, 0, 0, 255]);
        assert_eq!(source.natural_size(), Some((640, 360)));
        assert!(*source.metadata_ready().borrow());
        assert_eq!(source.playback(), PlaybackState::Loaded);
    }

    #[test]
    fn solid_source_frames_match_dimensions() {
        let source = SyntheticSource::solid(8, 4, [1, 2, 3, 255]);
        let frame = source.current_frame().unwrap();
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.pixel(7, 3), Some([1, 2, 3, 255]));
    }

    #[test]
    fn play_pause_transitions() {
        let mut source = SyntheticSource::scrolling(4, 4);
        source.play().unwrap();
        assert_eq!(source.playback(), PlaybackState::Playing);
        source.pause().unwrap();
        assert_eq!(source.playback(), PlaybackState::Paused);
    }
}
