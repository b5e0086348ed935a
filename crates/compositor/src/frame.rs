//! Owned RGBA frame buffers.

use paircast_common::{PaircastError, PaircastResult};

/// A single decoded or composited video frame, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Bytes per pixel (RGBA8).
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Create a zeroed (transparent black) frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * Self::BYTES_PER_PIXEL],
        }
    }

    /// Create a frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * Self::BYTES_PER_PIXEL);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing tightly packed RGBA buffer.
    ///
    /// Fails if the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> PaircastResult<Self> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(PaircastError::compositing(format!(
                "RGBA buffer length {} does not match {width}x{height} ({expected} bytes)",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The raw pixel buffer, row-major, no padding between rows.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame, yielding the pixel buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Read a single pixel. Returns `None` outside the frame bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[offset..offset + Self::BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// One row of pixels as raw bytes.
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * Self::BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.width as usize * Self::BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let frame = Frame::new(4, 2);
        assert_eq!(frame.data().len(), 4 * 2 * 4);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_solid_fill() {
        let frame = Frame::solid(2, 2, [10, 20, 30, 255]);
        assert_eq!(frame.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(frame.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_from_rgba_rejects_bad_length() {
        let err = Frame::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("does not match"));
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_ok());
    }
}
