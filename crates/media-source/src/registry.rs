//! The two-slot source registry.

use paircast_common::{PaircastError, PaircastResult};
use paircast_compositor::Frame;
use tokio::sync::watch;

use crate::source::{FrameSource, PlaybackState};

/// One of the two fixed positions a video source is assigned to.
/// Slot one renders at the left of the composite, slot two at the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSlot {
    One,
    Two,
}

impl SourceSlot {
    pub fn index(self) -> usize {
        match self {
            SourceSlot::One => 0,
            SourceSlot::Two => 1,
        }
    }
}

impl TryFrom<usize> for SourceSlot {
    type Error = PaircastError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SourceSlot::One),
            2 => Ok(SourceSlot::Two),
            slot => Err(PaircastError::InvalidSlot { slot }),
        }
    }
}

impl std::fmt::Display for SourceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSlot::One => write!(f, "1"),
            SourceSlot::Two => write!(f, "2"),
        }
    }
}

/// Holds the two user-selected sources and exposes their current
/// frames and dimensions to the rest of the pipeline.
#[derive(Default)]
pub struct SourceRegistry {
    slots: [Option<Box<dyn FrameSource>>; 2],
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a source to a slot, replacing and invalidating any prior
    /// source for that slot (the old pipeline is torn down on drop).
    pub fn load_source(&mut self, slot: SourceSlot, source: Box<dyn FrameSource>) {
        let replaced = self.slots[slot.index()].replace(source).is_some();
        tracing::info!(%slot, replaced, "Source loaded");
    }

    pub fn source(&self, slot: SourceSlot) -> Option<&dyn FrameSource> {
        self.slots[slot.index()].as_deref()
    }

    /// Number of occupied slots.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True once both slots hold a source. Metadata readiness is a
    /// separate, later condition.
    pub fn both_loaded(&self) -> bool {
        self.loaded_count() == 2
    }

    /// Natural dimensions for a slot, if the source is metadata-ready.
    pub fn natural_size(&self, slot: SourceSlot) -> Option<(u32, u32)> {
        self.source(slot).and_then(|s| s.natural_size())
    }

    /// Metadata-ready signals for every loaded source. Callers clone
    /// these out and await them without holding the registry lock.
    pub fn metadata_signals(&self) -> Vec<watch::Receiver<bool>> {
        self.slots
            .iter()
            .flatten()
            .map(|s| s.metadata_ready())
            .collect()
    }

    /// Begin playback of both sources together.
    pub fn play_all(&mut self) -> PaircastResult<()> {
        for source in self.slots.iter_mut().flatten() {
            source.play()?;
        }
        Ok(())
    }

    /// Pause both sources.
    pub fn pause_all(&mut self) -> PaircastResult<()> {
        for source in self.slots.iter_mut().flatten() {
            source.pause()?;
        }
        Ok(())
    }

    /// Current frames for the draw loop, left then right.
    ///
    /// A source that is not in the `Playing` state yields `None`,
    /// which tells the compositor to leave its region unchanged.
    pub fn current_frames(&self) -> (Option<Frame>, Option<Frame>) {
        let frame_of = |slot: &Option<Box<dyn FrameSource>>| {
            slot.as_deref()
                .filter(|s| s.playback() == PlaybackState::Playing)
                .and_then(|s| s.current_frame())
        };
        (frame_of(&self.slots[0]), frame_of(&self.slots[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSource;

    #[test]
    fn slot_conversion() {
        assert_eq!(SourceSlot::try_from(1).unwrap(), SourceSlot::One);
        assert_eq!(SourceSlot::try_from(2).unwrap(), SourceSlot::Two);
        assert!(SourceSlot::try_from(0).is_err());
        assert!(SourceSlot::try_from(3).is_err());
    }

    #[test]
    fn registry_counts_loaded_slots() {
        let mut registry = SourceRegistry::new();
        assert!(!registry.both_loaded());

        registry.load_source(
            SourceSlot::One,
            Box::new(SyntheticSource::solid(640, 360, [255, 0, 0, 255])),
        );
        assert_eq!(registry.loaded_count(), 1);
        assert!(!registry.both_loaded());

        registry.load_source(
            SourceSlot::Two,
            Box::new(SyntheticSource::solid(320, 240, [0, 0, 255, 255])),
        );
        assert!(registry.both_loaded());
        assert_eq!(registry.natural_size(SourceSlot::One), Some((640, 360)));
    }

    #[test]
    fn reloading_a_slot_replaces_the_source() {
        let mut registry = SourceRegistry::new();
        registry.load_source(
            SourceSlot::One,
            Box::new(SyntheticSource::solid(100, 100, [1, 1, 1, 255])),
        );
        registry.load_source(
            SourceSlot::One,
            Box::new(SyntheticSource::solid(200, 50, [2, 2, 2, 255])),
        );
        assert_eq!(registry.loaded_count(), 1);
        assert_eq!(registry.natural_size(SourceSlot::One), Some((200, 50)));
    }

    #[test]
    fn non_playing_sources_yield_no_frames() {
        let mut registry = SourceRegistry::new();
        registry.load_source(
            SourceSlot::One,
            Box::new(SyntheticSource::solid(4, 4, [9, 9, 9, 255])),
        );
        registry.load_source(
            SourceSlot::Two,
            Box::new(SyntheticSource::solid(4, 4, [8, 8, 8, 255])),
        );

        let (left, right) = registry.current_frames();
        assert!(left.is_none());
        assert!(right.is_none());

        registry.play_all().unwrap();
        let (left, right) = registry.current_frames();
        assert!(left.is_some());
        assert!(right.is_some());

        registry.pause_all().unwrap();
        let (left, _) = registry.current_frames();
        assert!(left.is_none());
    }
}
