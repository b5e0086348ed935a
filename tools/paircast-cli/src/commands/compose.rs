//! Compose two videos side by side and record the result.

use std::path::PathBuf;
use std::time::Duration;

use paircast_capture::WebmVp8Encoder;
use paircast_common::RecordingDefaults;
use paircast_media_source::{MediaFileSource, SourceSlot};
use paircast_session::{SessionController, SessionState};

pub async fn run(
    left: PathBuf,
    right: PathBuf,
    output: PathBuf,
    fps: u32,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    println!("Composing side by side:");
    println!("  Left:   {}", left.display());
    println!("  Right:  {}", right.display());
    println!("  Output: {}", output.display());
    println!("  FPS: {fps}");
    println!();

    let defaults = RecordingDefaults {
        frame_rate: fps,
        ..RecordingDefaults::default()
    };
    let mut session = SessionController::new(
        defaults,
        Box::new(|size, fps| {
            Ok(Box::new(WebmVp8Encoder::new(size.width, size.height, fps)?))
        }),
    );

    session.load_source(SourceSlot::One, Box::new(MediaFileSource::load(&left)?))?;
    session.load_source(SourceSlot::Two, Box::new(MediaFileSource::load(&right)?))?;

    session.start().await?;
    anyhow::ensure!(
        session.state() == SessionState::Playing,
        "session failed to start"
    );

    if let Some(size) = session.surface_size() {
        println!(
            "Recording {}x{} composite (left region width {})",
            size.width, size.height, size.left_width
        );
    }

    match duration {
        Some(secs) => {
            println!("Recording for {secs}s...");
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
        None => {
            println!("Press Ctrl+C to stop recording...");
            tokio::signal::ctrl_c().await?;
            println!();
        }
    }

    let mut artifacts = session.artifact_watch();
    session.stop().await?;

    artifacts.wait_for(|a| a.is_some()).await?;
    let artifact = artifacts
        .borrow()
        .clone()
        .ok_or_else(|| anyhow::anyhow!("recording produced no artifact"))?;

    artifact.save(&output)?;
    println!(
        "Saved {} ({} bytes, {})",
        output.display(),
        artifact.len(),
        artifact.mime_type()
    );

    Ok(())
}
