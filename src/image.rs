use super::error::{Error, Result};

/// The number of bytes in one RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A rectangular buffer of 8-bit RGBA pixels, stored row by row with the
/// top row first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Box<[u8]>,
}

impl PixelBuffer {
    /// Creates a new buffer with all pixels set to transparent black.
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<PixelBuffer> {
        PixelBuffer::filled(width, height, [0, 0, 0, 0])
    }

    /// Creates a new buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4])
                  -> Result<PixelBuffer> {
        let num_bytes = data_length(width, height)?;
        let data = rgba.iter()
            .copied()
            .cycle()
            .take(num_bytes)
            .collect::<Vec<u8>>();
        Ok(PixelBuffer {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Wraps existing RGBA data.  Returns an error if either dimension is
    /// zero, or if `data` is not exactly `width * height * 4` bytes long.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>)
                     -> Result<PixelBuffer> {
        let expected = data_length(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Converts RGB data into a buffer with every pixel fully opaque.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8])
                    -> Result<PixelBuffer> {
        let expected = data_length(width, height)? / BYTES_PER_PIXEL * 3;
        if rgb.len() != expected {
            return Err(Error::BufferLength {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }
        let mut rgba = Vec::with_capacity(expected / 3 * BYTES_PER_PIXEL);
        for pixel in rgb.chunks_exact(3) {
            rgba.extend_from_slice(pixel);
            rgba.push(u8::MAX);
        }
        PixelBuffer::from_rgba(width, height, rgba)
    }

    /// Returns the width of the buffer, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the buffer, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw RGBA bytes for modification.  The length is fixed.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the bytes of row `y` (which must be less than the height).
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Returns the pixel at (`x`, `y`), or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let index = self.index(x, y)?;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[index..index + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Sets the pixel at (`x`, `y`).  Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(index) = self.index(x, y) {
            self.data[index..index + BYTES_PER_PIXEL].copy_from_slice(&rgba);
        }
    }

    /// Consumes the buffer, returning its raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data.into_vec()
    }

    /// The number of bytes in one row.
    fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.stride() + x as usize * BYTES_PER_PIXEL)
        } else {
            None
        }
    }
}

/// Returns the number of bytes a `width` by `height` RGBA image needs.
fn data_length(width: u32, height: u32) -> Result<usize> {
    let invalid = || Error::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(invalid)
}
