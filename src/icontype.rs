use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Every icon type, in order of increasing pixel size.
const ALL_ICON_TYPES: [IconType; 11] = [IconType::RGBA32_16x16,
                                        IconType::RGBA32_16x16_2x,
                                        IconType::RGBA32_32x32,
                                        IconType::RGBA32_32x32_2x,
                                        IconType::RGBA32_64x64,
                                        IconType::RGBA32_128x128,
                                        IconType::RGBA32_128x128_2x,
                                        IconType::RGBA32_256x256,
                                        IconType::RGBA32_256x256_2x,
                                        IconType::RGBA32_512x512,
                                        IconType::RGBA32_512x512_2x];

/// The ICNS slots that hold PNG-encoded icons.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IconType {
    /// 16x16 32-bit icon.
    RGBA32_16x16,
    /// 16x16 32-bit icon at 2x "retina" density (so, 32 by 32 pixels).
    RGBA32_16x16_2x,
    /// 32x32 32-bit icon.
    RGBA32_32x32,
    /// 32x32 32-bit icon at 2x "retina" density (so, 64 by 64 pixels).
    RGBA32_32x32_2x,
    /// 64x64 32-bit icon.
    RGBA32_64x64,
    /// 128x128 32-bit icon.
    RGBA32_128x128,
    /// 128x128 32-bit icon at 2x "retina" density (so, 256 by 256 pixels).
    RGBA32_128x128_2x,
    /// 256x256 32-bit icon.
    RGBA32_256x256,
    /// 256x256 32-bit icon at 2x "retina" density (so, 512 by 512 pixels).
    RGBA32_256x256_2x,
    /// 512x512 32-bit icon.
    RGBA32_512x512,
    /// 512x512 32-bit icon at 2x "retina" density (so, 1024 by 1024 pixels).
    RGBA32_512x512_2x,
}

impl IconType {
    /// Get the icon type associated with the given OSType, if any.
    pub fn from_ostype(ostype: OSType) -> Option<IconType> {
        let OSType(raw_ostype) = ostype;
        match &raw_ostype {
            b"icp4" => Some(IconType::RGBA32_16x16),
            b"ic11" => Some(IconType::RGBA32_16x16_2x),
            b"icp5" => Some(IconType::RGBA32_32x32),
            b"ic12" => Some(IconType::RGBA32_32x32_2x),
            b"icp6" => Some(IconType::RGBA32_64x64),
            b"ic07" => Some(IconType::RGBA32_128x128),
            b"ic13" => Some(IconType::RGBA32_128x128_2x),
            b"ic08" => Some(IconType::RGBA32_256x256),
            b"ic14" => Some(IconType::RGBA32_256x256_2x),
            b"ic09" => Some(IconType::RGBA32_512x512),
            b"ic10" => Some(IconType::RGBA32_512x512_2x),
            _ => None,
        }
    }

    /// Get the OSType that represents this icon type.
    pub fn ostype(self) -> OSType {
        match self {
            IconType::RGBA32_16x16 => OSType(*b"icp4"),
            IconType::RGBA32_16x16_2x => OSType(*b"ic11"),
            IconType::RGBA32_32x32 => OSType(*b"icp5"),
            IconType::RGBA32_32x32_2x => OSType(*b"ic12"),
            IconType::RGBA32_64x64 => OSType(*b"icp6"),
            IconType::RGBA32_128x128 => OSType(*b"ic07"),
            IconType::RGBA32_128x128_2x => OSType(*b"ic13"),
            IconType::RGBA32_256x256 => OSType(*b"ic08"),
            IconType::RGBA32_256x256_2x => OSType(*b"ic14"),
            IconType::RGBA32_512x512 => OSType(*b"ic09"),
            IconType::RGBA32_512x512_2x => OSType(*b"ic10"),
        }
    }

    /// Returns the icon type whose pixel data has the given dimensions.
    /// Square sizes stored by both a 1x and a 2x slot resolve to the 1x
    /// slot.
    ///
    /// # Examples
    /// ```
    /// use iconkit::IconType;
    /// assert_eq!(IconType::from_pixel_size(32, 32),
    ///            Some(IconType::RGBA32_32x32));
    /// assert_eq!(IconType::from_pixel_size(1024, 1024),
    ///            Some(IconType::RGBA32_512x512_2x));
    /// assert_eq!(IconType::from_pixel_size(48, 48), None);
    /// ```
    pub fn from_pixel_size(width: u32, height: u32) -> Option<IconType> {
        if width != height {
            return None;
        }
        let matching = || {
            ALL_ICON_TYPES.iter()
                .copied()
                .filter(move |icon_type| icon_type.pixel_width() == width)
        };
        matching()
            .find(|icon_type| icon_type.pixel_density() == 1)
            .or_else(|| matching().next())
    }

    /// Returns every icon type, in order of increasing pixel size.
    pub fn all() -> &'static [IconType] {
        &ALL_ICON_TYPES
    }

    /// Returns the pixel data width of this icon type.  Normally this is the
    /// same as the screen width, but for 2x "retina" density icons, this will
    /// be twice that value.
    ///
    /// # Examples
    /// ```
    /// use iconkit::IconType;
    /// assert_eq!(IconType::RGBA32_64x64.pixel_width(), 64);
    /// assert_eq!(IconType::RGBA32_256x256.pixel_width(), 256);
    /// assert_eq!(IconType::RGBA32_256x256_2x.pixel_width(), 512);
    /// ```
    pub fn pixel_width(self) -> u32 {
        self.screen_width() * self.pixel_density()
    }

    /// Returns the pixel data height of this icon type.  ICNS icons are
    /// square, so this always equals the pixel width.
    pub fn pixel_height(self) -> u32 {
        self.pixel_width()
    }

    /// Returns the pixel density for this icon type -- that is, 2 for 2x
    /// "retina" density icons, or 1 for other icon types.
    pub fn pixel_density(self) -> u32 {
        match self {
            IconType::RGBA32_16x16_2x |
            IconType::RGBA32_32x32_2x |
            IconType::RGBA32_128x128_2x |
            IconType::RGBA32_256x256_2x |
            IconType::RGBA32_512x512_2x => 2,
            _ => 1,
        }
    }

    /// Returns the screen width of this icon type.  Normally this is the same
    /// as the pixel width, but for 2x "retina" density icons, this will be
    /// half that value.
    ///
    /// # Examples
    /// ```
    /// use iconkit::IconType;
    /// assert_eq!(IconType::RGBA32_16x16_2x.screen_width(), 16);
    /// assert_eq!(IconType::RGBA32_512x512_2x.screen_width(), 512);
    /// ```
    pub fn screen_width(self) -> u32 {
        match self {
            IconType::RGBA32_16x16 | IconType::RGBA32_16x16_2x => 16,
            IconType::RGBA32_32x32 | IconType::RGBA32_32x32_2x => 32,
            IconType::RGBA32_64x64 => 64,
            IconType::RGBA32_128x128 | IconType::RGBA32_128x128_2x => 128,
            IconType::RGBA32_256x256 | IconType::RGBA32_256x256_2x => 256,
            IconType::RGBA32_512x512 | IconType::RGBA32_512x512_2x => 512,
        }
    }
}

/// A Macintosh OSType (also known as a ResType), used in ICNS files to
/// identify the type of each icon element.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OSType(pub [u8; 4]);

impl fmt::Display for OSType {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let &OSType(raw) = self;
        for &byte in &raw {
            write!(out, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl FromStr for OSType {
    type Err = Error;

    fn from_str(input: &str) -> Result<OSType, Error> {
        let bytes = input.as_bytes();
        if bytes.len() != 4 || !bytes.is_ascii() {
            return Err(Error::InvalidOSType(input.to_string()));
        }
        let mut raw = [0u8; 4];
        raw.clone_from_slice(bytes);
        Ok(OSType(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_type_ostype_round_trip() {
        for icon_type in IconType::all() {
            let ostype = icon_type.ostype();
            let from = IconType::from_ostype(ostype);
            assert_eq!(Some(*icon_type), from);
        }
    }

    #[test]
    fn all_is_sorted_by_pixel_size() {
        let sizes: Vec<u32> =
            IconType::all().iter().map(|t| t.pixel_width()).collect();
        assert_eq!(sizes, vec![16, 32, 32, 64, 64, 128, 256, 256, 512, 512,
                               1024]);
    }

    #[test]
    fn pixel_size_prefers_single_density() {
        assert_eq!(IconType::from_pixel_size(64, 64),
                   Some(IconType::RGBA32_64x64));
        assert_eq!(IconType::from_pixel_size(256, 256),
                   Some(IconType::RGBA32_256x256));
        assert_eq!(IconType::from_pixel_size(512, 512),
                   Some(IconType::RGBA32_512x512));
        assert_eq!(IconType::from_pixel_size(64, 32), None);
        assert_eq!(IconType::from_pixel_size(22, 22), None);
    }

    #[test]
    fn ostype_to_and_from_str() {
        let ostype = "ic07".parse::<OSType>().expect("failed to parse OSType");
        assert_eq!(ostype.to_string(), "ic07".to_string());
        assert_eq!(IconType::from_ostype(ostype),
                   Some(IconType::RGBA32_128x128));
    }

    #[test]
    fn ostype_from_str_failure() {
        for input in &["abc", "abcde", "", "ic\u{e9}"] {
            match input.parse::<OSType>() {
                Err(Error::InvalidOSType(ref s)) => assert_eq!(s, input),
                other => panic!("{:?} parsed as {:?}", input, other),
            }
        }
    }
}
