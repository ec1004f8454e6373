use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};
use tracing::debug;

use super::element::IcnsEntry;
use super::error::{Error, Result};
use super::icontype::{IconType, OSType};
use super::png::PngImage;

/// The first four bytes of an ICNS file:
const ICNS_MAGIC_LITERAL: &'static [u8; 4] = b"icns";

/// The length of an icon family header, in bytes:
const ICON_FAMILY_HEADER_LENGTH: u32 = 8;

/// A set of icons stored in a single ICNS file.  Elements are written in the
/// order they were added, and each OSType appears at most once.
#[derive(Clone, Debug)]
pub struct IcnsFamily {
    elements: Vec<IcnsEntry>,
    total_length: u32,
}

impl IcnsFamily {
    /// Creates a new, empty icon family.
    pub fn new() -> IcnsFamily {
        IcnsFamily {
            elements: Vec::new(),
            total_length: ICON_FAMILY_HEADER_LENGTH,
        }
    }

    /// Returns true if the icon family contains no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the number of elements in the family.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns the elements, in file order.
    pub fn entries(&self) -> &[IcnsEntry] {
        &self.elements
    }

    /// Appends an element.  Returns an error if an element with the same
    /// OSType is already present, or if the file would grow past the 4 GiB
    /// its length field can describe.
    pub fn add_entry(&mut self, element: IcnsEntry) -> Result<()> {
        if self.find_element(element.ostype()).is_some() {
            return Err(Error::DuplicateOSType(element.ostype()));
        }
        self.total_length = self.total_length
            .checked_add(element.total_length())
            .ok_or(Error::TooLarge("ICNS file"))?;
        self.elements.push(element);
        Ok(())
    }

    /// Adds the image, automatically choosing an appropriate icon type based
    /// on its dimensions.  Returns an error if there is no supported icon
    /// type matching the image dimensions.
    pub fn add_icon(&mut self, image: &PngImage) -> Result<()> {
        match IconType::from_pixel_size(image.width(), image.height()) {
            Some(icon_type) => self.add_icon_with_type(image, icon_type),
            None => {
                Err(Error::UnsupportedSize {
                    width: image.width(),
                    height: image.height(),
                })
            }
        }
    }

    /// Adds the image using the given icon type.  Returns an error if the
    /// image has the wrong dimensions for the selected type.  The same image
    /// may be stored under several types.
    pub fn add_icon_with_type(&mut self,
                              image: &PngImage,
                              icon_type: IconType)
                              -> Result<()> {
        self.add_entry(IcnsEntry::from_png(icon_type, image)?)
    }

    /// Determines whether the icon family contains an element for the given
    /// icon type.
    pub fn has_icon_with_type(&self, icon_type: IconType) -> bool {
        self.find_element(icon_type.ostype()).is_some()
    }

    /// Returns the icon types present in the family, in file order.
    pub fn available_icons(&self) -> Vec<IconType> {
        self.elements.iter().filter_map(IcnsEntry::icon_type).collect()
    }

    /// Private helper method.
    fn find_element(&self, ostype: OSType) -> Option<&IcnsEntry> {
        self.elements.iter().find(|el| el.ostype() == ostype)
    }

    /// Writes the icon family to an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(ICNS_MAGIC_LITERAL)?;
        writer.write_u32::<BigEndian>(self.total_length())?;
        for element in &self.elements {
            element.write(writer.by_ref())?;
        }
        Ok(())
    }

    /// Serializes the icon family into a new buffer.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.total_length as usize);
        self.write(&mut output)?;
        debug!(elements = self.elements.len(),
               bytes = output.len(),
               "built ICNS file");
        Ok(output)
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u32 {
        self.total_length
    }
}

impl Default for IcnsFamily {
    fn default() -> IcnsFamily {
        IcnsFamily::new()
    }
}

/// Builds an ICNS file from `(OSType, PNG data)` pairs, keeping them in the
/// given order.  Returns an error if a tag is not exactly four ASCII bytes,
/// if a tag repeats, or if a payload is empty.
///
/// # Examples
/// ```
/// let icns = iconkit::build_icns(vec![("ic07", &b"fake png"[..])]).unwrap();
/// assert_eq!(&icns[..8], b"icns\0\0\0\x18");
/// assert_eq!(&icns[8..16], b"ic07\0\0\0\x10");
/// ```
pub fn build_icns<'a, I>(entries: I) -> Result<Vec<u8>>
    where I: IntoIterator<Item = (&'a str, &'a [u8])>
{
    let mut family = IcnsFamily::new();
    for (tag, data) in entries {
        let ostype = tag.parse::<OSType>()?;
        family.add_entry(IcnsEntry::new(ostype, data.to_vec())?)?;
    }
    Ok(family.to_bytes()?)
}
