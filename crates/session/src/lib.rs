//! Paircast Session
//!
//! The top-level controller tying together the source registry, the
//! composite surface, the capture bridge, and the recorder. One
//! [`SessionController`] owns one side-by-side recording session from
//! source selection through the finished artifact.

pub mod controller;

pub use controller::{EncoderFactory, SessionController, SessionState};
