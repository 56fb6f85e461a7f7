/// Errors raised when wrapping raw pixel buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid BGR buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

const CHANNELS: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct BgrFrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, B,G,R interleaved, len = w*h*3
}

/// Owned BGR frame, reused in place across iterations by one runner.
///
/// `Default` is an empty 0x0 frame, sized by the first
/// [`copy_from_rgb`](Self::copy_from_rgb).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BgrFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

fn checked_len(width: usize, height: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(FrameError::InvalidDimensions { width, height })
}

impl BgrFrame {
    /// All-black frame of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, FrameError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Wrap an existing BGR buffer.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> BgrFrameView<'_> {
        BgrFrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Overwrite this frame with the contents of an RGB image.
    ///
    /// The backing buffer is only reallocated when the image size differs
    /// from the current frame size.
    pub fn copy_from_rgb(&mut self, img: &::image::RgbImage) {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let len = w * h * CHANNELS;
        if self.width != w || self.height != h || self.data.len() != len {
            self.width = w;
            self.height = h;
            self.data.resize(len, 0);
        }
        for (dst, src) in self
            .data
            .chunks_exact_mut(CHANNELS)
            .zip(img.as_raw().chunks_exact(CHANNELS))
        {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }
    }

    /// Convert into an RGB image (for encoding / saving).
    pub fn to_rgb(&self) -> ::image::RgbImage {
        self.view()
            .to_rgb()
            .unwrap_or_else(|| ::image::RgbImage::new(self.width as u32, self.height as u32))
    }

    /// BGR triple at `(x, y)`; `None` outside the frame.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        let idx = self.index(x, y)?;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Write a BGR triple; coordinates outside the frame are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, bgr: [u8; 3]) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx..idx + CHANNELS].copy_from_slice(&bgr);
        }
    }

    /// Paint every pixel with the same BGR value.
    pub fn fill(&mut self, bgr: [u8; 3]) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&bgr);
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * CHANNELS)
    }
}

impl BgrFrameView<'_> {
    /// RGB copy; `None` when `data` does not match the dimensions.
    pub fn to_rgb(&self) -> Option<::image::RgbImage> {
        let mut rgb = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(CHANNELS) {
            rgb.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        ::image::RgbImage::from_raw(self.width as u32, self.height as u32, rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = BgrFrame::from_raw(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidBuffer {
                expected: 12,
                got: 11
            }
        );
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        assert!(matches!(
            BgrFrame::new(0, 4),
            Err(FrameError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rgb_round_trip_swaps_channels() {
        let mut img = ::image::RgbImage::new(2, 1);
        img.put_pixel(1, 0, ::image::Rgb([10, 20, 30]));

        let mut frame = BgrFrame::new(1, 1).unwrap();
        frame.copy_from_rgb(&img);

        assert_eq!((frame.width, frame.height), (2, 1));
        assert_eq!(frame.pixel(1, 0), Some([30, 20, 10]));
        assert_eq!(frame.to_rgb().get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn view_with_short_buffer_has_no_rgb() {
        let data = [0u8; 5];
        let view = BgrFrameView {
            width: 2,
            height: 1,
            data: &data,
        };
        assert!(view.to_rgb().is_none());
    }

    #[test]
    fn put_pixel_outside_is_ignored() {
        let mut frame = BgrFrame::new(3, 3).unwrap();
        frame.put_pixel(-1, 0, [255, 255, 255]);
        frame.put_pixel(3, 3, [255, 255, 255]);
        assert!(frame.data.iter().all(|&v| v == 0));
        assert_eq!(frame.pixel(5, 0), None);
    }
}
