use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};
use tracing::debug;

use super::crc::Crc32;
use super::deflate::{deflate_compress, Compression};
use super::error::{Error, Result};
use super::image::{PixelBuffer, BYTES_PER_PIXEL};

/// The eight bytes every PNG file starts with.
pub const PNG_SIGNATURE: &'static [u8; 8] = b"\x89PNG\r\n\x1a\n";

/// The bit depth of every image this encoder writes.
pub const BIT_DEPTH: u8 = 8;

/// The PNG color type of every image this encoder writes (truecolor with
/// alpha).
pub const COLOR_TYPE_RGBA: u8 = 6;

// The length of the IHDR chunk's data field, in bytes:
const IHDR_LENGTH: usize = 13;

// PNG limits image dimensions to 2^31 - 1:
const MAX_DIMENSION: u32 = 0x7FFF_FFFF;

// Scanline filter type "none":
const FILTER_NONE: u8 = 0;

/// An encoded PNG file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PngImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PngImage {
    /// Returns the width of the encoded image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the encoded image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the encoded file contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the encoded file, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Consumes the image, returning the encoded file contents.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Writes the encoded file to a writer.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.data)
    }
}

/// Encodes pixel buffers as 8-bit RGBA, non-interlaced PNG files.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEncoder {
    compression: Compression,
}

impl PngEncoder {
    /// Creates an encoder using the default compression level.
    pub fn new() -> PngEncoder {
        PngEncoder::default()
    }

    /// Sets the compression level used for image data.
    pub fn compression(mut self, compression: Compression) -> PngEncoder {
        self.compression = compression;
        self
    }

    /// Encodes the buffer.  The output is a signature followed by exactly
    /// one IHDR, one IDAT and one IEND chunk.
    pub fn encode(&self, image: &PixelBuffer) -> Result<PngImage> {
        let (width, height) = (image.width(), image.height());
        check_dimensions(width, height)?;
        let idat = deflate_compress(&scanlines(image), self.compression);
        if idat.len() > u32::MAX as usize {
            return Err(Error::TooLarge("PNG image data"));
        }

        let mut ihdr = Vec::with_capacity(IHDR_LENGTH);
        ihdr.write_u32::<BigEndian>(width)?;
        ihdr.write_u32::<BigEndian>(height)?;
        ihdr.write_all(&[BIT_DEPTH, COLOR_TYPE_RGBA, 0, 0, 0])?;

        // Signature plus three 12-byte chunk frames:
        let mut data = Vec::with_capacity(8 + 36 + IHDR_LENGTH + idat.len());
        data.write_all(PNG_SIGNATURE)?;
        write_chunk(&mut data, b"IHDR", &ihdr)?;
        write_chunk(&mut data, b"IDAT", &idat)?;
        write_chunk(&mut data, b"IEND", &[])?;
        debug!(width,
               height,
               level = self.compression.level(),
               bytes = data.len(),
               "encoded PNG");
        Ok(PngImage {
            width,
            height,
            data,
        })
    }
}

/// Encodes the buffer as a PNG file using the default compression level.
pub fn encode_png(image: &PixelBuffer) -> Result<PngImage> {
    PngEncoder::new().encode(image)
}

/// Encodes raw RGBA bytes as a PNG file.  Returns an error if either
/// dimension is zero, or if `rgba` is not exactly `width * height * 4`
/// bytes long.
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<PngImage> {
    encode_png(&PixelBuffer::from_rgba(width, height, rgba.to_vec())?)
}

/// Writes one chunk: big-endian data length, type tag, data, then the
/// CRC-32 of tag and data.
pub fn write_chunk<W: Write>(mut writer: W,
                             chunk_type: &[u8; 4],
                             data: &[u8])
                             -> io::Result<()> {
    let length = u32::try_from(data.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "chunk data too long")
    })?;
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    writer.write_u32::<BigEndian>(length)?;
    writer.write_all(chunk_type)?;
    writer.write_all(data)?;
    writer.write_u32::<BigEndian>(crc.finalize())?;
    Ok(())
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::TooLarge("PNG image dimensions"));
    }
    Ok(())
}

/// Lays out the raw scanline stream: each row is a filter-type byte
/// followed by the row's pixels, unfiltered.
fn scanlines(image: &PixelBuffer) -> Vec<u8> {
    let stride = image.width() as usize * BYTES_PER_PIXEL;
    let mut raw = Vec::with_capacity((stride + 1) * image.height() as usize);
    for y in 0..image.height() {
        raw.push(FILTER_NONE);
        raw.extend_from_slice(image.row(y));
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    #[test]
    fn write_empty_chunk() {
        let mut output = Vec::new();
        write_chunk(&mut output, b"IEND", &[]).expect("write failed");
        assert_eq!(b"\0\0\0\0IEND\xae\x42\x60\x82", &output as &[u8]);
    }

    #[test]
    fn one_by_one_header() {
        let image = PixelBuffer::filled(1, 1, [0, 0, 0, 255]).unwrap();
        let png = encode_png(&image).expect("encode failed");
        let data = png.data();
        assert_eq!(&data[..8], PNG_SIGNATURE);
        assert_eq!(&data[8..16], b"\0\0\0\x0dIHDR");
        assert_eq!(&data[16..29],
                   b"\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0");
        assert_eq!(&data[29..33], b"\x1f\x15\xc4\x89");
        assert_eq!(&data[data.len() - 12..],
                   b"\0\0\0\0IEND\xae\x42\x60\x82");
        assert_eq!((png.width(), png.height()), (1, 1));
    }

    #[test]
    fn idat_holds_unfiltered_rows() {
        let mut image = PixelBuffer::new(2, 2).unwrap();
        image.set_pixel(1, 0, [1, 2, 3, 4]);
        image.set_pixel(0, 1, [5, 6, 7, 8]);
        let png = PngEncoder::new()
            .compression(Compression::NONE)
            .encode(&image)
            .unwrap();
        let data = png.data();
        let idat_start = 8 + 12 + IHDR_LENGTH;
        let length = u32::from_be_bytes([data[idat_start],
                                         data[idat_start + 1],
                                         data[idat_start + 2],
                                         data[idat_start + 3]]) as usize;
        assert_eq!(&data[idat_start + 4..idat_start + 8], b"IDAT");
        let payload = &data[idat_start + 8..idat_start + 8 + length];
        let raw = decompress_to_vec_zlib(payload).expect("inflate failed");
        assert_eq!(raw,
                   vec![0, 0, 0, 0, 0, 1, 2, 3, 4,
                        0, 5, 6, 7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn encode_rgba_validates_input() {
        assert!(matches!(encode_rgba(0, 1, &[]),
                         Err(Error::InvalidDimensions { .. })));
        assert!(matches!(encode_rgba(1, 1, &[0, 0, 0]),
                         Err(Error::BufferLength { .. })));
        assert!(encode_rgba(1, 1, &[0, 0, 0, 0]).is_ok());
    }

    #[test]
    fn dimensions_past_png_limit_are_too_large() {
        assert!(check_dimensions(MAX_DIMENSION, 1).is_ok());
        let err = check_dimensions(MAX_DIMENSION + 1, 1).unwrap_err();
        assert!(matches!(err, Error::TooLarge("PNG image dimensions")));
        assert!(err.is_invalid_input());
        assert!(check_dimensions(1, u32::MAX).is_err());
    }

    #[test]
    fn same_input_same_bytes() {
        let image = PixelBuffer::filled(9, 7, [12, 34, 56, 78]).unwrap();
        let encoder = PngEncoder::new().compression(Compression::BEST);
        assert_eq!(encoder.encode(&image).unwrap(),
                   encoder.encode(&image).unwrap());
    }
}
