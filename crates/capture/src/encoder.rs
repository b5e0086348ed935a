//! Chunk encoders: frames in, encoded container segments out.

use std::sync::OnceLock;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use paircast_common::{PaircastError, PaircastResult};
use paircast_compositor::Frame;

/// Trait for an incremental video encoder.
///
/// Frames are pushed one at a time; encoded output arrives as opaque
/// binary segments ("chunks") whose concatenation, in arrival order,
/// forms a playable file in the encoder's container format. The
/// format is fixed for the encoder's lifetime.
pub trait ChunkEncoder: Send {
    /// Encode one frame. Returns any chunks that became available.
    fn push_frame(&mut self, frame: &Frame) -> PaircastResult<Vec<Vec<u8>>>;

    /// Flush the encoder and return all remaining chunks.
    /// Idempotent; later calls return nothing.
    fn finish(&mut self) -> PaircastResult<Vec<Vec<u8>>>;

    /// MIME type of the concatenated output.
    fn mime_type(&self) -> &'static str;
}

/// VP8-in-WebM encoder backed by a GStreamer pipeline
/// (`appsrc ! videoconvert ! vp8enc ! webmmux ! appsink`).
pub struct WebmVp8Encoder {
    pipeline: gst::Pipeline,
    src: gst_app::AppSrc,
    sink: gst_app::AppSink,
    width: u32,
    height: u32,
    frame_duration_ns: u64,
    frames_pushed: u64,
    finished: bool,
}

impl WebmVp8Encoder {
    /// Build and start the encode pipeline for a fixed frame size and
    /// rate. The size must match the frozen surface dimensions.
    pub fn new(width: u32, height: u32, fps: u32) -> PaircastResult<Self> {
        init_gstreamer()?;

        if width == 0 || height == 0 {
            return Err(PaircastError::encoding(format!(
                "invalid encode dimensions {width}x{height}"
            )));
        }

        // streamable=true makes the muxer emit chunks progressively
        // instead of seeking back to finalize headers.
        let launch = "appsrc name=src format=time ! videoconvert ! \
                      vp8enc deadline=1 cpu-used=4 ! webmmux streamable=true ! \
                      appsink name=sink sync=false";

        let element = gst::parse::launch(launch)
            .map_err(|e| PaircastError::encoding(format!("failed to build encoder: {e}")))?;
        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| PaircastError::encoding("launch string did not produce a pipeline"))?;

        let src = pipeline
            .by_name("src")
            .ok_or_else(|| PaircastError::encoding("encoder pipeline has no appsrc"))?
            .dynamic_cast::<gst_app::AppSrc>()
            .map_err(|_| PaircastError::encoding("src element is not an appsrc"))?;
        let sink = pipeline
            .by_name("sink")
            .ok_or_else(|| PaircastError::encoding("encoder pipeline has no appsink"))?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(|_| PaircastError::encoding("sink element is not an appsink"))?;

        let fps = fps.max(1);
        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .field("width", width as i32)
            .field("height", height as i32)
            .field("framerate", gst::Fraction::new(fps as i32, 1))
            .build();
        src.set_caps(Some(&caps));

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| PaircastError::encoding(format!("failed to start encoder: {e:?}")))?;

        Ok(Self {
            pipeline,
            src,
            sink,
            width,
            height,
            frame_duration_ns: 1_000_000_000 / fps as u64,
            frames_pushed: 0,
            finished: false,
        })
    }

    /// Collect chunks the muxer has already produced, without blocking.
    fn drain_available(&self) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        while let Some(sample) = self.sink.try_pull_sample(gst::ClockTime::ZERO) {
            if let Some(chunk) = chunk_from_sample(&sample) {
                chunks.push(chunk);
            }
        }
        chunks
    }
}

impl ChunkEncoder for WebmVp8Encoder {
    fn push_frame(&mut self, frame: &Frame) -> PaircastResult<Vec<Vec<u8>>> {
        if self.finished {
            return Err(PaircastError::encoding("encoder already finished"));
        }
        if frame.dimensions() != (self.width, self.height) {
            return Err(PaircastError::encoding(format!(
                "frame is {}x{} but the encoder was sized for {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        let mut buffer = gst::Buffer::from_mut_slice(frame.data().to_vec());
        {
            let buffer_ref = buffer
                .get_mut()
                .ok_or_else(|| PaircastError::encoding("encode buffer is not writable"))?;
            // Monotonic frame-counter timestamps in 1/fps; the capture
            // clock never feeds the encoder directly.
            buffer_ref.set_pts(gst::ClockTime::from_nseconds(
                self.frames_pushed * self.frame_duration_ns,
            ));
            buffer_ref.set_duration(gst::ClockTime::from_nseconds(self.frame_duration_ns));
        }

        self.src
            .push_buffer(buffer)
            .map_err(|e| PaircastError::encoding(format!("appsrc rejected frame: {e:?}")))?;
        self.frames_pushed += 1;

        Ok(self.drain_available())
    }

    fn finish(&mut self) -> PaircastResult<Vec<Vec<u8>>> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.finished = true;

        self.src
            .end_of_stream()
            .map_err(|e| PaircastError::encoding(format!("failed to signal EOS: {e:?}")))?;

        // Drain until EOS propagates so the muxer can emit its tail.
        let mut chunks = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while !self.sink.is_eos() {
            match self
                .sink
                .try_pull_sample(gst::ClockTime::from_mseconds(100))
            {
                Some(sample) => {
                    if let Some(chunk) = chunk_from_sample(&sample) {
                        chunks.push(chunk);
                    }
                }
                None => {
                    if std::time::Instant::now() >= deadline {
                        tracing::warn!("Encoder EOS drain timed out; output may be truncated");
                        break;
                    }
                }
            }
        }
        chunks.extend(self.drain_available());

        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| PaircastError::encoding(format!("failed to stop encoder: {e:?}")))?;

        tracing::info!(
            frames = self.frames_pushed,
            tail_chunks = chunks.len(),
            "Encoder flushed"
        );
        Ok(chunks)
    }

    fn mime_type(&self) -> &'static str {
        "video/webm"
    }
}

impl Drop for WebmVp8Encoder {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

fn chunk_from_sample(sample: &gst::Sample) -> Option<Vec<u8>> {
    let buffer = sample.buffer()?;
    let map = buffer.map_readable().ok()?;
    Some(map.as_slice().to_vec())
}

fn init_gstreamer() -> PaircastResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(PaircastError::capture_init(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

/// Test encoder: each pushed frame becomes exactly one chunk holding
/// the frame's raw bytes, so output order is directly observable.
pub struct PassthroughEncoder {
    mime: &'static str,
    frames_pushed: u64,
    finished: bool,
}

impl PassthroughEncoder {
    pub fn new(mime: &'static str) -> Self {
        Self {
            mime,
            frames_pushed: 0,
            finished: false,
        }
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }
}

impl ChunkEncoder for PassthroughEncoder {
    fn push_frame(&mut self, frame: &Frame) -> PaircastResult<Vec<Vec<u8>>> {
        if self.finished {
            return Err(PaircastError::encoding("encoder already finished"));
        }
        self.frames_pushed += 1;
        Ok(vec![frame.data().to_vec()])
    }

    fn finish(&mut self) -> PaircastResult<Vec<Vec<u8>>> {
        self.finished = true;
        Ok(Vec::new())
    }

    fn mime_type(&self) -> &'static str {
        self.mime
    }
}
