//! GStreamer-backed file sources.
//!
//! Each file source owns a small decode pipeline that prerolls on
//! load (surfacing natural dimensions without advancing playback) and
//! keeps the most recently decoded frame in a shared slot for the
//! compositor to sample.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use paircast_common::{PaircastError, PaircastResult};
use paircast_compositor::Frame;
use tokio::sync::watch;

use crate::source::{FrameSource, PlaybackState};

/// A video source decoded from a local file.
pub struct MediaFileSource {
    pipeline: gst::Pipeline,
    playback: PlaybackState,
    latest: Arc<Mutex<Option<Frame>>>,
    dims: Arc<Mutex<Option<(u32, u32)>>>,
    ready_tx: Arc<watch::Sender<bool>>,
}

impl MediaFileSource {
    /// Load and preroll a video file.
    ///
    /// Blocks until the decoder has negotiated caps and delivered the
    /// first frame, or fails with `UnsupportedMedia` if the file is
    /// not decodable video. Replacing a source is done by dropping the
    /// old one; `Drop` tears the pipeline down.
    pub fn load(path: impl AsRef<Path>) -> PaircastResult<Self> {
        init_gstreamer()?;

        let path = path.as_ref();
        if !path.exists() {
            return Err(PaircastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let location = escape_path(path);
        // sync=true keeps the appsink delivering frames in real time
        // once playing, so "current frame" tracks the media clock.
        let launch = format!(
            "filesrc location=\"{location}\" ! decodebin ! videoconvert ! video/x-raw,format=RGBA ! appsink name=sink sync=true"
        );

        let element = gst::parse::launch(&launch).map_err(|e| {
            PaircastError::unsupported_media(format!("failed to build decode pipeline: {e}"))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            PaircastError::unsupported_media("launch string did not produce a pipeline")
        })?;

        let sink = pipeline
            .by_name("sink")
            .ok_or_else(|| PaircastError::unsupported_media("decode pipeline has no appsink"))?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(|_| PaircastError::unsupported_media("sink element is not an appsink"))?;

        let latest = Arc::new(Mutex::new(None));
        let dims = Arc::new(Mutex::new(None));
        let (ready_tx, _ready_rx) = watch::channel(false);
        let ready_tx = Arc::new(ready_tx);

        let preroll_latest = Arc::clone(&latest);
        let preroll_dims = Arc::clone(&dims);
        let preroll_ready = Arc::clone(&ready_tx);
        let sample_latest = Arc::clone(&latest);
        sink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_preroll(move |sink| {
                    let sample = sink.pull_preroll().map_err(|_| gst::FlowError::Error)?;
                    if let Some((frame, w, h)) = frame_from_sample(&sample) {
                        if let Ok(mut slot) = preroll_dims.lock() {
                            *slot = Some((w, h));
                        }
                        if let Ok(mut slot) = preroll_latest.lock() {
                            *slot = Some(frame);
                        }
                        let _ = preroll_ready.send(true);
                    }
                    Ok(gst::FlowSuccess::Ok)
                })
                .new_sample(move |sink| {
                    let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    if let Some((frame, _, _)) = frame_from_sample(&sample) {
                        if let Ok(mut slot) = sample_latest.lock() {
                            *slot = Some(frame);
                        }
                    }
                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );

        // Preroll: reach Paused so caps are negotiated and the first
        // frame is decodable before anyone reads natural dimensions.
        if pipeline.set_state(gst::State::Paused).is_err() {
            return Err(PaircastError::unsupported_media(format!(
                "failed to preroll {}",
                path.display()
            )));
        }

        let (result, state, _) = pipeline.state(gst::ClockTime::from_seconds(10));
        if result.is_err() || state != gst::State::Paused {
            let detail = bus_error_detail(&pipeline);
            let _ = pipeline.set_state(gst::State::Null);
            return Err(PaircastError::unsupported_media(format!(
                "{} is not decodable video{detail}",
                path.display()
            )));
        }

        let size = dims.lock().ok().and_then(|slot| *slot);
        tracing::info!(
            path = %path.display(),
            size = ?size,
            "Source prerolled"
        );

        Ok(Self {
            pipeline,
            playback: PlaybackState::Loaded,
            latest,
            dims,
            ready_tx,
        })
    }
}

impl FrameSource for MediaFileSource {
    fn natural_size(&self) -> Option<(u32, u32)> {
        self.dims.lock().ok().and_then(|slot| *slot)
    }

    fn playback(&self) -> PlaybackState {
        self.playback
    }

    fn play(&mut self) -> PaircastResult<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| PaircastError::session(format!("failed to start playback: {e:?}")))?;
        self.playback = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> PaircastResult<()> {
        self.pipeline
            .set_state(gst::State::Paused)
            .map_err(|e| PaircastError::session(format!("failed to pause playback: {e:?}")))?;
        self.playback = PlaybackState::Paused;
        Ok(())
    }

    fn current_frame(&self) -> Option<Frame> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }

    fn metadata_ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }
}

impl Drop for MediaFileSource {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

/// Convert an appsink sample to an owned tightly packed RGBA frame.
fn frame_from_sample(sample: &gst::Sample) -> Option<(Frame, u32, u32)> {
    let caps = sample.caps()?;
    let structure = caps.structure(0)?;
    let width = structure.get::<i32>("width").ok()?;
    let height = structure.get::<i32>("height").ok()?;
    if width <= 0 || height <= 0 {
        return None;
    }
    let (width, height) = (width as u32, height as u32);

    let buffer = sample.buffer()?;
    let map = buffer.map_readable().ok()?;
    let data = map.as_slice();

    let tight_stride = width as usize * Frame::BYTES_PER_PIXEL;
    let expected = tight_stride * height as usize;

    let frame = if data.len() == expected {
        Frame::from_rgba(width, height, data.to_vec()).ok()?
    } else if data.len() > expected && data.len() % height as usize == 0 {
        // Converter emitted padded rows; repack to a tight buffer.
        let stride = data.len() / height as usize;
        let mut packed = Vec::with_capacity(expected);
        for row in 0..height as usize {
            let start = row * stride;
            packed.extend_from_slice(&data[start..start + tight_stride]);
        }
        Frame::from_rgba(width, height, packed).ok()?
    } else {
        tracing::warn!(
            len = data.len(),
            width,
            height,
            "Dropping sample with unexpected buffer layout"
        );
        return None;
    };

    Some((frame, width, height))
}

fn bus_error_detail(pipeline: &gst::Pipeline) -> String {
    let Some(bus) = pipeline.bus() else {
        return String::new();
    };
    match bus.pop_filtered(&[gst::MessageType::Error]) {
        Some(msg) => match msg.view() {
            gst::MessageView::Error(e) => format!(" ({})", e.error()),
            _ => String::new(),
        },
        None => String::new(),
    }
}

pub(crate) fn init_gstreamer() -> PaircastResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(PaircastError::capture_init(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}
