//! Show a video file's decoded dimensions.

use std::path::PathBuf;

use paircast_media_source::{FrameSource, MediaFileSource};

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    let source = MediaFileSource::load(&path)?;

    match source.natural_size() {
        Some((width, height)) => {
            println!("{}", path.display());
            println!("  Dimensions: {width}x{height}");
            println!("  Decodes to: RGBA");
        }
        None => {
            // Preroll succeeded but no frame surfaced; treat as undecodable.
            anyhow::bail!("{} prerolled without reporting dimensions", path.display());
        }
    }

    Ok(())
}
