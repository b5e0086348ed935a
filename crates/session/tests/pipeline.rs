//! End-to-end pipeline tests using synthetic sources and a
//! passthrough encoder, so no GStreamer runtime is needed.

use std::time::Duration;

use paircast_capture::PassthroughEncoder;
use paircast_common::RecordingDefaults;
use paircast_media_source::{SourceSlot, SyntheticSource};
use paircast_session::{EncoderFactory, SessionController, SessionState};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn passthrough_factory() -> EncoderFactory {
    Box::new(|_size, _fps| Ok(Box::new(PassthroughEncoder::new("video/webm"))))
}

fn controller() -> SessionController {
    SessionController::new(RecordingDefaults::default(), passthrough_factory())
}

#[tokio::test]
async fn full_session_produces_an_artifact() {
    let mut session = controller();
    assert_eq!(session.state(), SessionState::Waiting);

    session
        .load_source(
            SourceSlot::One,
            Box::new(SyntheticSource::solid(640, 360, RED)),
        )
        .unwrap();
    assert_eq!(session.state(), SessionState::Waiting);

    session
        .load_source(
            SourceSlot::Two,
            Box::new(SyntheticSource::solid(320, 240, BLUE)),
        )
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);

    let size = session.surface_size().expect("surface sized on start");
    assert_eq!(size.width, 960);
    assert_eq!(size.height, 360);
    assert_eq!(size.left_width, 640);

    // Let a handful of frames flow through the pipeline.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut artifacts = session.artifact_watch();
    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Ended);

    artifacts.wait_for(|a| a.is_some()).await.unwrap();
    let artifact = artifacts.borrow().clone().unwrap();
    assert!(!artifact.is_empty());
    assert_eq!(artifact.mime_type(), "video/webm");
    assert_eq!(artifact.suggested_name(), "movie.webm");
    // Passthrough chunks are whole RGBA frames of the surface size.
    assert_eq!(artifact.len() % (960 * 360 * 4), 0);
}

#[tokio::test]
async fn start_has_no_effect_until_both_sources_load() {
    let mut session = controller();

    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Waiting);
    assert!(session.surface_size().is_none());

    session
        .load_source(SourceSlot::One, Box::new(SyntheticSource::solid(4, 4, RED)))
        .unwrap();
    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Waiting);
    assert!(session.surface_size().is_none());
}

#[tokio::test]
async fn stop_is_idempotent_and_announces_once() {
    let mut session = controller();
    session
        .load_source(SourceSlot::One, Box::new(SyntheticSource::solid(8, 8, RED)))
        .unwrap();
    session
        .load_source(
            SourceSlot::Two,
            Box::new(SyntheticSource::solid(8, 8, BLUE)),
        )
        .unwrap();

    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut artifacts = session.artifact_watch();
    session.stop().await.unwrap();
    artifacts.wait_for(|a| a.is_some()).await.unwrap();

    // A second stop must not re-announce the artifact.
    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Ended);
    let second = tokio::time::timeout(Duration::from_millis(200), artifacts.changed()).await;
    assert!(second.is_err(), "artifact announced more than once");
}

#[tokio::test]
async fn stop_from_ready_ends_without_an_artifact() {
    let mut session = controller();
    session
        .load_source(SourceSlot::One, Box::new(SyntheticSource::solid(4, 4, RED)))
        .unwrap();
    session
        .load_source(
            SourceSlot::Two,
            Box::new(SyntheticSource::solid(4, 4, BLUE)),
        )
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Ended);
    assert!(session.artifact_watch().borrow().is_none());

    // Ended is terminal; a late start stays a no-op.
    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Ended);
}

#[tokio::test]
async fn stop_from_waiting_is_a_no_op() {
    let mut session = controller();
    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Waiting);
}
