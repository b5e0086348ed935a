//! Paircast Capture
//!
//! Bridges the composite surface into a fixed-rate frame stream and
//! records that stream into a single in-memory artifact.
//!
//! # Architecture
//!
//! ```text
//! CompositeSurface ──(sampled at frame_rate)──► SurfaceStream
//!                                                    │
//!                                                    ▼
//!                                               Recorder
//!                                          (Idle→Recording→Stopped)
//!                                                    │
//!                                    ChunkEncoder (VP8 → WebM chunks)
//!                                                    │
//!                                                    ▼
//!                                          Artifact (movie.webm)
//! ```
//!
//! The capture bridge's sampling timer is intentionally uncorrelated
//! with the compositor's draw timer: the bridge samples whatever is
//! currently on the surface.

pub mod bridge;
pub mod encoder;
pub mod recorder;

pub use bridge::{BridgeStats, CaptureBridge, SurfaceStream};
pub use encoder::{ChunkEncoder, PassthroughEncoder, WebmVp8Encoder};
pub use recorder::{Artifact, Recorder, RecorderState};
