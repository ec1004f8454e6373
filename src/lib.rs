//! Library for encoding application icons as PNG, Apple Icon Image (.icns)
//! and Windows icon (.ico) files.
//!
//! Everything here is write-only: RGBA pixel buffers go in, file bytes come
//! out.  The PNG encoder writes 8-bit RGBA, unfiltered, non-interlaced
//! images, and both container formats embed those PNG files verbatim.
//!
//! See https://en.wikipedia.org/wiki/Apple_Icon_Image_format and
//! https://en.wikipedia.org/wiki/ICO_(file_format) for more information
//! about the container formats.
//!
//! # Example
//! ```
//! use iconkit::{IcnsFamily, IcoDir, IconType, PixelBuffer, encode_png};
//!
//! let buffer = PixelBuffer::filled(32, 32, [255, 0, 0, 255]).unwrap();
//! let png = encode_png(&buffer).unwrap();
//!
//! let mut family = IcnsFamily::new();
//! family.add_icon_with_type(&png, IconType::RGBA32_32x32).unwrap();
//! family.add_icon_with_type(&png, IconType::RGBA32_16x16_2x).unwrap();
//! let icns = family.to_bytes().unwrap();
//! assert_eq!(icns.len(), 8 + 2 * (8 + png.len()));
//!
//! let mut dir = IcoDir::new();
//! dir.add_icon(&png).unwrap();
//! let ico = dir.to_bytes().unwrap();
//! assert_eq!(ico.len(), 6 + 16 + png.len());
//! ```

#![warn(missing_docs)]

mod crc;
mod deflate;
mod element;
mod error;
mod family;
mod ico;
mod icontype;
mod image;
pub mod iconset;
mod png;
mod source;

pub use self::crc::{crc32, Crc32};
pub use self::deflate::{deflate_compress, Compression};
pub use self::element::IcnsEntry;
pub use self::error::{Error, Result};
pub use self::family::{build_icns, IcnsFamily};
pub use self::ico::{build_ico, IcoDir, IcoEntry};
pub use self::icontype::{IconType, OSType};
pub use self::image::PixelBuffer;
pub use self::png::{encode_png, encode_rgba, write_chunk, PngEncoder,
                    PngImage, BIT_DEPTH, COLOR_TYPE_RGBA, PNG_SIGNATURE};
pub use self::source::{Glyph, IconRole, PixelSource, SolidColor};
