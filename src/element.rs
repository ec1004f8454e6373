use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

use super::error::{Error, Result};
use super::icontype::{IconType, OSType};
use super::png::PngImage;

/// The length of an icon element header, in bytes:
pub const ICON_ELEMENT_HEADER_LENGTH: u32 = 8;

/// One entry in an ICNS file: an OSType tag and the PNG file stored under
/// it.  The payload is kept verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcnsEntry {
    ostype: OSType,
    data: Vec<u8>,
}

impl IcnsEntry {
    /// Creates an icon element with the given OSType and data payload.
    /// Returns an error if the OSType is not ASCII, if the payload is
    /// empty, or if the element would be too long to describe.
    pub fn new(ostype: OSType, data: Vec<u8>) -> Result<IcnsEntry> {
        let OSType(ref raw_ostype) = ostype;
        if !raw_ostype.is_ascii() {
            let lossy = String::from_utf8_lossy(raw_ostype).into_owned();
            return Err(Error::InvalidOSType(lossy));
        }
        if data.is_empty() {
            return Err(Error::EmptyPayload(format!("'{}' element", ostype)));
        }
        if data.len() > (u32::MAX - ICON_ELEMENT_HEADER_LENGTH) as usize {
            return Err(Error::TooLarge("ICNS element"));
        }
        Ok(IcnsEntry { ostype, data })
    }

    /// Creates an element holding `image` in the slot for `icon_type`.
    /// Returns an error if the image has the wrong dimensions for that slot.
    pub fn from_png(icon_type: IconType, image: &PngImage)
                    -> Result<IcnsEntry> {
        let expected = icon_type.pixel_width();
        if image.width() != expected || image.height() != expected {
            return Err(Error::WrongDimensions {
                ostype: icon_type.ostype(),
                expected,
                width: image.width(),
                height: image.height(),
            });
        }
        IcnsEntry::new(icon_type.ostype(), image.data().to_vec())
    }

    /// Returns the OSType for this element (e.g. `ic07` or `icp4`).
    pub fn ostype(&self) -> OSType {
        self.ostype
    }

    /// Returns the type of icon stored in this element, or `None` if the
    /// OSType is not one of the PNG slots this library knows about.
    pub fn icon_type(&self) -> Option<IconType> {
        IconType::from_ostype(self.ostype)
    }

    /// Returns the encoded data for this element.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the encoded length of the element, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u32 {
        ICON_ELEMENT_HEADER_LENGTH + (self.data.len() as u32)
    }

    /// Writes the icon element to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let OSType(ref raw_ostype) = self.ostype;
        writer.write_all(raw_ostype)?;
        writer.write_u32::<BigEndian>(self.total_length())?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::image::PixelBuffer;
    use super::super::png::encode_png;

    #[test]
    fn write_element() {
        let element = IcnsEntry::new(OSType(*b"quux"), b"foobar".to_vec())
            .unwrap();
        assert_eq!(element.total_length(), 14);
        let mut output: Vec<u8> = vec![];
        element.write(&mut output).expect("write failed");
        assert_eq!(b"quux\0\0\0\x0efoobar", &output as &[u8]);
    }

    #[test]
    fn empty_payload_is_rejected() {
        match IcnsEntry::new(OSType(*b"ic07"), Vec::new()) {
            Err(Error::EmptyPayload(what)) => {
                assert_eq!(what, "'ic07' element")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_ascii_ostype_is_rejected() {
        let result = IcnsEntry::new(OSType([b'i', b'c', 0xFF, b'7']),
                                    vec![1]);
        assert!(matches!(result, Err(Error::InvalidOSType(_))));
    }

    #[test]
    fn png_must_fit_slot() {
        let buffer = PixelBuffer::new(32, 32).unwrap();
        let png = encode_png(&buffer).unwrap();
        let element = IcnsEntry::from_png(IconType::RGBA32_16x16_2x, &png)
            .unwrap();
        assert_eq!(element.ostype(), OSType(*b"ic11"));
        assert_eq!(element.icon_type(), Some(IconType::RGBA32_16x16_2x));
        assert_eq!(element.data(), png.data());

        match IcnsEntry::from_png(IconType::RGBA32_128x128, &png) {
            Err(Error::WrongDimensions { ostype, expected, width, .. }) => {
                assert_eq!(ostype, OSType(*b"ic07"));
                assert_eq!(expected, 128);
                assert_eq!(width, 32);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
