//! The composite surface and its sizing policy.

use paircast_common::{PaircastError, PaircastResult};

use crate::frame::Frame;

/// Pixel dimensions of the composite surface, derived once per session
/// from the two sources' natural dimensions.
///
/// Policy: horizontal concatenation at native resolution. Width is the
/// sum of both natural widths; height is the max of both natural
/// heights. The shorter source is top-aligned, leaving a blank band
/// below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    /// Total surface width (`left_width + right width`).
    pub width: u32,

    /// Total surface height (max of both natural heights).
    pub height: u32,

    /// Width of the left source's region; the right region starts here.
    pub left_width: u32,
}

impl SurfaceSize {
    /// Compute the surface size from two sources' natural dimensions.
    ///
    /// Both sources must be metadata-ready (non-zero dimensions).
    /// Must be called exactly once per session, before the surface is
    /// created or the first frame drawn; the result is frozen.
    pub fn compute(left: (u32, u32), right: (u32, u32)) -> PaircastResult<Self> {
        let (lw, lh) = left;
        let (rw, rh) = right;
        if lw == 0 || lh == 0 || rw == 0 || rh == 0 {
            return Err(PaircastError::not_ready(format!(
                "source dimensions not available yet ({lw}x{lh}, {rw}x{rh})"
            )));
        }

        Ok(Self {
            width: lw + rw,
            height: lh.max(rh),
            left_width: lw,
        })
    }
}

/// The shared raster target both sources are drawn into.
///
/// Dimensions are fixed at construction. The left source's frame
/// occupies columns `[0, left_width)`, the right source's frame
/// occupies columns `[left_width, width)`; both are top-aligned and
/// blitted at native resolution with no interpolation or cropping.
#[derive(Debug, Clone)]
pub struct CompositeSurface {
    size: SurfaceSize,
    pixels: Frame,
}

impl CompositeSurface {
    /// Create a surface with frozen dimensions, cleared to opaque black.
    pub fn new(size: SurfaceSize) -> Self {
        let mut surface = Self {
            size,
            pixels: Frame::new(size.width, size.height),
        };
        // Opaque clear so encoders see a fully covered frame from tick one.
        surface.clear([0, 0, 0, 255]);
        surface
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Draw one tick of the composite.
    ///
    /// `None` for either side leaves that region unchanged from the
    /// previous draw (stale frame, not blank). Callers pass `None`
    /// when a source is not currently playing.
    pub fn draw_frame(&mut self, left: Option<&Frame>, right: Option<&Frame>) {
        if let Some(frame) = left {
            self.blit(frame, 0);
        }
        if let Some(frame) = right {
            self.blit(frame, self.size.left_width);
        }
    }

    /// Snapshot the current surface contents as an owned frame.
    pub fn snapshot(&self) -> Frame {
        self.pixels.clone()
    }

    /// Read a single pixel of the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.pixel(x, y)
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        for y in 0..self.size.height {
            for chunk in self.pixels.row_mut(y).chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Copy `frame` row-by-row into the surface at `(dst_x, 0)`,
    /// clipped to the surface bounds. No scaling.
    fn blit(&mut self, frame: &Frame, dst_x: u32) {
        if dst_x >= self.size.width {
            return;
        }

        let copy_width = frame.width().min(self.size.width - dst_x) as usize;
        let copy_height = frame.height().min(self.size.height);
        if copy_width == 0 || copy_height == 0 {
            return;
        }

        let bpp = Frame::BYTES_PER_PIXEL;
        for y in 0..copy_height {
            let src = &frame.row(y)[..copy_width * bpp];
            let dst_start = dst_x as usize * bpp;
            let dst = &mut self.pixels.row_mut(y)[dst_start..dst_start + copy_width * bpp];
            dst.copy_from_slice(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn size_requires_metadata() {
        assert!(SurfaceSize::compute((0, 0), (320, 240)).is_err());
        assert!(SurfaceSize::compute((640, 360), (320, 0)).is_err());
    }

    #[test]
    fn size_concatenates_horizontally() {
        let size = SurfaceSize::compute((640, 360), (320, 240)).unwrap();
        assert_eq!(size.width, 960);
        assert_eq!(size.height, 360);
        assert_eq!(size.left_width, 640);
    }

    proptest! {
        #[test]
        fn size_invariant_holds_for_all_positive_dimensions(
            w1 in 1u32..4096, h1 in 1u32..4096,
            w2 in 1u32..4096, h2 in 1u32..4096,
        ) {
            let size = SurfaceSize::compute((w1, h1), (w2, h2)).unwrap();
            prop_assert_eq!(size.width, w1 + w2);
            prop_assert_eq!(size.height, h1.max(h2));
            prop_assert_eq!(size.left_width, w1);
        }
    }

    #[test]
    fn draw_places_sources_in_disjoint_columns() {
        let size = SurfaceSize::compute((640, 360), (320, 240)).unwrap();
        let mut surface = CompositeSurface::new(size);

        let left = Frame::solid(640, 360, RED);
        let right = Frame::solid(320, 240, BLUE);
        surface.draw_frame(Some(&left), Some(&right));

        // Left region: columns [0, 640)
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(639, 359), Some(RED));
        // Right region: columns [640, 960)
        assert_eq!(surface.pixel(640, 0), Some(BLUE));
        assert_eq!(surface.pixel(959, 239), Some(BLUE));
        // Band below the shorter source stays at the clear color.
        assert_eq!(surface.pixel(640, 240), Some(BLACK));
        assert_eq!(surface.pixel(959, 359), Some(BLACK));
    }

    #[test]
    fn missing_side_leaves_region_stale() {
        let size = SurfaceSize::compute((4, 4), (4, 4)).unwrap();
        let mut surface = CompositeSurface::new(size);

        surface.draw_frame(Some(&Frame::solid(4, 4, RED)), Some(&Frame::solid(4, 4, BLUE)));
        // Right source pauses: its region must keep the previous frame.
        surface.draw_frame(Some(&Frame::solid(4, 4, BLACK)), None);

        assert_eq!(surface.pixel(0, 0), Some(BLACK));
        assert_eq!(surface.pixel(4, 0), Some(BLUE));
    }

    #[test]
    fn oversized_frame_is_clipped() {
        let size = SurfaceSize::compute((4, 4), (4, 2)).unwrap();
        let mut surface = CompositeSurface::new(size);

        // A frame taller/wider than its region must not spill past the
        // surface bounds or panic.
        surface.draw_frame(None, Some(&Frame::solid(16, 16, BLUE)));
        assert_eq!(surface.pixel(7, 3), Some(BLUE));
        assert_eq!(surface.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn snapshot_is_a_copy() {
        let size = SurfaceSize::compute((2, 2), (2, 2)).unwrap();
        let mut surface = CompositeSurface::new(size);
        let before = surface.snapshot();
        surface.draw_frame(Some(&Frame::solid(2, 2, RED)), None);
        assert_eq!(before.pixel(0, 0), Some(BLACK));
        assert_eq!(surface.pixel(0, 0), Some(RED));
    }
}
