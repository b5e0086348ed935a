//! The recorder state machine and the finished artifact.

use std::path::Path;
use std::sync::Arc;

use paircast_common::{PaircastError, PaircastResult};
use paircast_compositor::Frame;
use tokio::sync::watch;

use crate::bridge::SurfaceStream;
use crate::encoder::ChunkEncoder;

/// Lifecycle of a recorder. Single-shot: once `Stopped`, a recorder
/// never records again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
}

/// The finished recording, held entirely in memory.
#[derive(Debug, Clone)]
pub struct Artifact {
    data: Vec<u8>,
    mime_type: String,
    suggested_name: String,
}

impl Artifact {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, suggested_name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            suggested_name: suggested_name.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the artifact to disk.
    pub fn save(&self, path: &Path) -> PaircastResult<()> {
        std::fs::write(path, &self.data)?;
        tracing::info!(path = %path.display(), bytes = self.data.len(), "Artifact saved");
        Ok(())
    }
}

/// Consumes a [`SurfaceStream`] through a [`ChunkEncoder`] and
/// assembles the chunks, in arrival order, into one [`Artifact`].
///
/// The artifact is announced exactly once per recorder lifetime, on
/// the watch channel returned by [`Recorder::artifact_watch`].
pub struct Recorder {
    state: RecorderState,
    stream: Option<SurfaceStream>,
    encoder: Option<Box<dyn ChunkEncoder>>,
    output_name: String,
    stop_tx: Option<watch::Sender<bool>>,
    drain: Option<tokio::task::JoinHandle<()>>,
    artifact_tx: Arc<watch::Sender<Option<Artifact>>>,
}

impl Recorder {
    pub fn new(output_name: impl Into<String>) -> Self {
        let (artifact_tx, _) = watch::channel(None);
        Self {
            state: RecorderState::Idle,
            stream: None,
            encoder: None,
            output_name: output_name.into(),
            stop_tx: None,
            drain: None,
            artifact_tx: Arc::new(artifact_tx),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Watch channel that fires once with the finished artifact.
    pub fn artifact_watch(&self) -> watch::Receiver<Option<Artifact>> {
        self.artifact_tx.subscribe()
    }

    /// Attach the frame stream and encoder to record from. Must be
    /// called before `start`.
    pub fn bind(&mut self, stream: SurfaceStream, encoder: Box<dyn ChunkEncoder>) {
        self.stream = Some(stream);
        self.encoder = Some(encoder);
    }

    /// Begin recording.
    ///
    /// Calling this while already recording is a logged no-op; calling
    /// it after the recorder has stopped is an error, since a stopped
    /// recorder cannot be reused.
    pub fn start(&mut self) -> PaircastResult<()> {
        match self.state {
            RecorderState::Recording => {
                tracing::warn!("Recorder already running; start ignored");
                return Ok(());
            }
            RecorderState::Stopped => {
                return Err(PaircastError::not_ready(
                    "recorder has already produced its artifact",
                ));
            }
            RecorderState::Idle => {}
        }

        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| PaircastError::not_ready("no capture stream bound to the recorder"))?;
        let mut encoder = self
            .encoder
            .take()
            .ok_or_else(|| PaircastError::not_ready("no encoder bound to the recorder"))?;

        let mime_type = encoder.mime_type().to_string();
        let output_name = self.output_name.clone();
        let artifact_tx = Arc::clone(&self.artifact_tx);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);

        let drain = tokio::spawn(async move {
            let mut chunks: Vec<Vec<u8>> = Vec::new();

            fn encode_into(
                encoder: &mut Box<dyn ChunkEncoder>,
                chunks: &mut Vec<Vec<u8>>,
                frame: &Frame,
            ) -> bool {
                match encoder.push_frame(frame) {
                    Ok(produced) => {
                        chunks.extend(produced);
                        true
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Encoding failed; recording aborted");
                        false
                    }
                }
            }

            'drain: loop {
                tokio::select! {
                    frame = stream.recv() => match frame {
                        Some(frame) => {
                            if !encode_into(&mut encoder, &mut chunks, &frame) {
                                break 'drain;
                            }
                        }
                        None => break 'drain,
                    },
                    _ = stop_rx.changed() => {
                        // Frames sampled before the stop signal are part
                        // of the recording; flush the queue before ending.
                        while let Some(frame) = stream.try_recv() {
                            if !encode_into(&mut encoder, &mut chunks, &frame) {
                                break 'drain;
                            }
                        }
                        break 'drain;
                    }
                }
            }

            match encoder.finish() {
                Ok(tail) => chunks.extend(tail),
                Err(e) => tracing::error!(error = %e, "Encoder flush failed"),
            }

            let data: Vec<u8> = chunks.concat();
            tracing::info!(
                bytes = data.len(),
                chunks = chunks.len(),
                "Recording finished"
            );
            let artifact = Artifact::new(data, mime_type, output_name);
            // send_replace stores the artifact even with no receivers,
            // so subscribers arriving after stop() still observe it.
            artifact_tx.send_replace(Some(artifact));
        });

        self.drain = Some(drain);
        self.state = RecorderState::Recording;
        tracing::info!("Recorder started");
        Ok(())
    }

    /// Stop recording and wait for the artifact to be assembled.
    /// A no-op unless currently recording.
    pub async fn stop(&mut self) {
        if self.state != RecorderState::Recording {
            return;
        }
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(drain) = self.drain.take() {
            if let Err(e) = drain.await {
                tracing::warn!(error = %e, "Recorder drain task join failed");
            }
        }
        self.state = RecorderState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::SurfaceStream;
    use crate::encoder::PassthroughEncoder;

    #[tokio::test]
    async fn start_without_a_stream_fails() {
        let mut recorder = Recorder::new("movie.webm");
        assert!(recorder.start().is_err());
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn chunks_are_appended_in_arrival_order() {
        let (tx, stream) = SurfaceStream::channel();
        let mut recorder = Recorder::new("movie.webm");
        recorder.bind(stream, Box::new(PassthroughEncoder::new("video/webm")));

        let first = Frame::solid(2, 1, [1, 1, 1, 255]);
        let second = Frame::solid(2, 1, [2, 2, 2, 255]);

        recorder.start().unwrap();
        tx.send(first.clone()).await.unwrap();
        tx.send(second.clone()).await.unwrap();
        drop(tx);
        recorder.stop().await;

        let mut rx = recorder.artifact_watch();
        rx.wait_for(|a| a.is_some()).await.unwrap();
        let artifact = rx.borrow().clone().unwrap();

        let mut expected = first.data().to_vec();
        expected.extend_from_slice(second.data());
        assert_eq!(artifact.data(), expected.as_slice());
        assert_eq!(artifact.mime_type(), "video/webm");
        assert_eq!(artifact.suggested_name(), "movie.webm");
    }

    #[tokio::test]
    async fn artifact_outlives_stop_for_late_subscribers() {
        let (tx, stream) = SurfaceStream::channel();
        let mut recorder = Recorder::new("movie.webm");
        recorder.bind(stream, Box::new(PassthroughEncoder::new("video/webm")));

        recorder.start().unwrap();
        tx.send(Frame::solid(2, 2, [3, 3, 3, 255])).await.unwrap();
        drop(tx);
        recorder.stop().await;

        // No receiver existed while the recording ran; subscribing now
        // must still observe the artifact.
        let rx = recorder.artifact_watch();
        let artifact = rx.borrow().clone().expect("artifact retained");
        assert!(!artifact.is_empty());
    }

    #[tokio::test]
    async fn frames_queued_before_stop_are_flushed() {
        let (tx, stream) = SurfaceStream::channel();
        let mut recorder = Recorder::new("movie.webm");
        recorder.bind(stream, Box::new(PassthroughEncoder::new("video/webm")));
        recorder.start().unwrap();

        // Fill the queue before the drain task gets a chance to run,
        // then stop while the sender is still alive. Every queued frame
        // must end up in the artifact.
        let frame = Frame::solid(2, 2, [7, 7, 7, 255]);
        for _ in 0..5 {
            tx.send(frame.clone()).await.unwrap();
        }
        recorder.stop().await;

        let rx = recorder.artifact_watch();
        let artifact = rx.borrow().clone().unwrap();
        assert_eq!(artifact.len(), frame.data().len() * 5);
    }

    #[tokio::test]
    async fn double_start_is_a_no_op() {
        let (_tx, stream) = SurfaceStream::channel();
        let mut recorder = Recorder::new("movie.webm");
        recorder.bind(stream, Box::new(PassthroughEncoder::new("video/webm")));

        recorder.start().unwrap();
        recorder.start().unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);
        recorder.stop().await;
    }

    #[tokio::test]
    async fn stopped_recorder_refuses_restart() {
        let (tx, stream) = SurfaceStream::channel();
        let mut recorder = Recorder::new("movie.webm");
        recorder.bind(stream, Box::new(PassthroughEncoder::new("video/webm")));

        recorder.start().unwrap();
        drop(tx);
        recorder.stop().await;
        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert!(recorder.start().is_err());
    }

    #[tokio::test]
    async fn stop_from_idle_is_a_no_op() {
        let mut recorder = Recorder::new("movie.webm");
        recorder.stop().await;
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert!(recorder.artifact_watch().borrow().is_none());
    }
}
