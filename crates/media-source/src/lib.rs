//! Paircast Media Sources
//!
//! Loads the two user-selected video sources and exposes their current
//! decoded frames to the compositor. Each source decodes independently;
//! the registry assigns them to one of two fixed slots.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              SourceRegistry               │
//! │  ┌─────────────────┐ ┌─────────────────┐  │
//! │  │  Slot One       │ │  Slot Two       │  │
//! │  │  FrameSource    │ │  FrameSource    │  │
//! │  │  (file/synth)   │ │  (file/synth)   │  │
//! │  └────────┬────────┘ └────────┬────────┘  │
//! │           ▼                   ▼           │
//! │     latest decoded RGBA frame per slot    │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Natural dimensions become valid only after a source signals
//! metadata readiness; callers await [`source::wait_all_ready`] before
//! sizing the composite surface.

pub mod file;
pub mod registry;
pub mod source;
pub mod synthetic;

pub use file::MediaFileSource;
pub use registry::{SourceRegistry, SourceSlot};
pub use source::{wait_all_ready, FrameSource, PlaybackState};
pub use synthetic::SyntheticSource;
