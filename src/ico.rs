//! Windows icon (.ico) files holding PNG-compressed images.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};
use tracing::debug;

use super::error::{Error, Result};
use super::png::PngImage;

// The length of the ICONDIR header, in bytes:
const ICONDIR_HEADER_LENGTH: u32 = 6;

// The length of one ICONDIRENTRY, in bytes:
const ICONDIR_ENTRY_LENGTH: u32 = 16;

// Resource type 1 is an icon (2 would be a cursor):
const RESOURCE_TYPE_ICON: u16 = 1;

const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

const MAX_SIZE: u32 = 256;

/// One image in an ICO file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcoEntry {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl IcoEntry {
    /// Creates an entry for a PNG payload of the given dimensions.  Returns
    /// an error if either dimension is outside 1 to 256, or if the payload
    /// is empty.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<IcoEntry> {
        if width == 0 || height == 0 || width > MAX_SIZE || height > MAX_SIZE {
            return Err(Error::IcoDimensions { width, height });
        }
        if data.is_empty() {
            return Err(Error::EmptyPayload(format!("{}x{} ICO entry",
                                                   width,
                                                   height)));
        }
        if data.len() > u32::MAX as usize {
            return Err(Error::TooLarge("ICO entry"));
        }
        Ok(IcoEntry {
            width,
            height,
            data,
        })
    }

    /// Creates an entry holding an encoded PNG image.
    pub fn from_png(image: &PngImage) -> Result<IcoEntry> {
        IcoEntry::new(image.width(), image.height(), image.data().to_vec())
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel value recorded in the directory.
    pub fn bits_per_pixel(&self) -> u16 {
        BITS_PER_PIXEL
    }

    /// Returns the PNG payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A collection of images; the contents of a single ICO file.
#[derive(Clone, Debug, Default)]
pub struct IcoDir {
    entries: Vec<IcoEntry>,
}

impl IcoDir {
    /// Creates a new, empty collection of icons.
    pub fn new() -> IcoDir {
        IcoDir::default()
    }

    /// Returns the entries in this collection.
    pub fn entries(&self) -> &[IcoEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the collection holds no images.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry.  Returns an error if the directory is full or the
    /// file would outgrow its 32-bit offsets.
    pub fn add_entry(&mut self, entry: IcoEntry) -> Result<()> {
        if self.entries.len() >= u16::MAX as usize {
            return Err(Error::TooManyEntries(self.entries.len() + 1));
        }
        let length = u64::from(self.total_length()) +
                     u64::from(ICONDIR_ENTRY_LENGTH) +
                     entry.data.len() as u64;
        if length > u64::from(u32::MAX) {
            return Err(Error::TooLarge("ICO file"));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Appends an encoded PNG image.
    pub fn add_icon(&mut self, image: &PngImage) -> Result<()> {
        self.add_entry(IcoEntry::from_png(image)?)
    }

    /// Returns the encoded length of the file, in bytes.
    pub fn total_length(&self) -> u32 {
        self.entries.iter().fold(self.first_offset(), |length, entry| {
            length + entry.data.len() as u32
        })
    }

    /// The file offset of the first payload, right after the directory.
    fn first_offset(&self) -> u32 {
        ICONDIR_HEADER_LENGTH + ICONDIR_ENTRY_LENGTH * self.entries.len() as u32
    }

    /// Writes the ICO file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(RESOURCE_TYPE_ICON)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset = self.first_offset();
        for entry in &self.entries {
            writer.write_u8(size_byte(entry.width))?;
            writer.write_u8(size_byte(entry.height))?;
            writer.write_u8(0)?; // palette size
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(COLOR_PLANES)?;
            writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
            let data_size = entry.data.len() as u32;
            writer.write_u32::<LittleEndian>(data_size)?;
            writer.write_u32::<LittleEndian>(data_offset)?;
            data_offset += data_size;
        }
        for entry in &self.entries {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Serializes the directory and payloads into a new buffer.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.total_length() as usize);
        self.write(&mut output)?;
        debug!(entries = self.entries.len(),
               bytes = output.len(),
               "built ICO file");
        Ok(output)
    }
}

/// A directory entry stores 256 as 0.
fn size_byte(size: u32) -> u8 {
    if size == MAX_SIZE { 0 } else { size as u8 }
}

/// Builds an ICO file from `((width, height), PNG data)` pairs, keeping them
/// in the given order.
///
/// # Examples
/// ```
/// let ico = iconkit::build_ico(vec![((256, 256), &b"png"[..])]).unwrap();
/// assert_eq!(&ico[..6], b"\0\0\x01\0\x01\0");
/// assert_eq!(&ico[6..8], b"\0\0");
/// ```
pub fn build_ico<'a, I>(entries: I) -> Result<Vec<u8>>
    where I: IntoIterator<Item = ((u32, u32), &'a [u8])>
{
    let mut dir = IcoDir::new();
    for ((width, height), data) in entries {
        dir.add_entry(IcoEntry::new(width, height, data.to_vec())?)?;
    }
    Ok(dir.to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_empty_dir() {
        let dir = IcoDir::new();
        assert!(dir.is_empty());
        assert_eq!(dir.to_bytes().unwrap(), b"\0\0\x01\0\0\0".to_vec());
    }

    #[test]
    fn write_two_entries() {
        let mut dir = IcoDir::new();
        dir.add_entry(IcoEntry::new(16, 16, b"abc".to_vec()).unwrap())
            .unwrap();
        dir.add_entry(IcoEntry::new(256, 256, b"de".to_vec()).unwrap())
            .unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.total_length(), 6 + 32 + 5);
        let expected: &[u8] = b"\0\0\x01\0\x02\0\
                                \x10\x10\0\0\x01\0\x20\0\x03\0\0\0\x26\0\0\0\
                                \0\0\0\0\x01\0\x20\0\x02\0\0\0\x29\0\0\0\
                                abcde";
        assert_eq!(dir.to_bytes().unwrap(), expected.to_vec());
    }

    #[test]
    fn dimensions_are_checked() {
        for &(width, height) in &[(0, 16), (16, 0), (257, 16), (16, 300)] {
            match IcoEntry::new(width, height, vec![1]) {
                Err(Error::IcoDimensions { width: w, height: h }) => {
                    assert_eq!((w, h), (width, height));
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
        let entry = IcoEntry::new(255, 1, vec![1]).unwrap();
        assert_eq!((entry.width(), entry.height()), (255, 1));
        assert_eq!(entry.bits_per_pixel(), 32);
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(build_ico(vec![((32, 32), &b""[..])]),
                         Err(Error::EmptyPayload(_))));
    }

    #[test]
    fn size_byte_encoding() {
        assert_eq!(size_byte(1), 1);
        assert_eq!(size_byte(255), 255);
        assert_eq!(size_byte(256), 0);
    }
}
