//! Check GStreamer element availability.

use gstreamer as gst;

/// Elements the decode and encode pipelines are built from.
const REQUIRED_ELEMENTS: &[(&str, &str)] = &[
    ("filesrc", "file reading"),
    ("decodebin", "video decoding"),
    ("videoconvert", "pixel format conversion"),
    ("appsink", "frame extraction"),
    ("appsrc", "frame injection"),
    ("vp8enc", "VP8 encoding"),
    ("webmmux", "WebM muxing"),
];

pub fn run() -> anyhow::Result<()> {
    println!("Paircast System Check");
    println!("{}", "=".repeat(50));

    gst::init()?;
    let (major, minor, micro, _) = gst::version();
    println!("[OK] GStreamer {major}.{minor}.{micro}");

    let mut all_ok = true;
    for (name, purpose) in REQUIRED_ELEMENTS {
        if gst::ElementFactory::find(name).is_some() {
            println!("[OK] {name} ({purpose})");
        } else {
            println!("[MISSING] {name} ({purpose})");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All required elements are available. Paircast is ready.");
    } else {
        println!("Some elements are missing. Install the GStreamer base, good, and vpx plugin sets.");
    }

    Ok(())
}
