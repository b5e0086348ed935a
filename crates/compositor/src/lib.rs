//! Paircast Compositor
//!
//! Combines the current frames of two video sources into a single
//! shared raster surface: source one at the left edge, source two
//! immediately to its right, both top-aligned and drawn at native
//! resolution. The surface's dimensions are frozen once, before the
//! first draw, by the sizing policy.
//!
//! This crate is pure computation: no I/O, no platform dependencies.

pub mod frame;
pub mod surface;

pub use frame::Frame;
pub use surface::{CompositeSurface, SurfaceSize};
