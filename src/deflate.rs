//! zlib-wrapped deflate compression for PNG image data.

use miniz_oxide::deflate::compress_to_vec_zlib;

// The highest level understood by miniz:
const MAX_LEVEL: u8 = 10;

/// A deflate compression level.  Higher levels trade speed for smaller
/// output; every level produces a stream any zlib inflater accepts.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Compression(u8);

impl Compression {
    /// Stored blocks only; no compression at all.
    pub const NONE: Compression = Compression(0);
    /// Fastest compression.
    pub const FAST: Compression = Compression(1);
    /// A balance between speed and size.
    pub const DEFAULT: Compression = Compression(6);
    /// Smallest output at the usual zlib levels.
    pub const BEST: Compression = Compression(9);

    /// Creates a compression level, clamping it to the supported range of
    /// 0 to 10.
    ///
    /// # Examples
    /// ```
    /// use iconkit::Compression;
    /// assert_eq!(Compression::new(6), Compression::DEFAULT);
    /// assert_eq!(Compression::new(200).level(), 10);
    /// ```
    pub fn new(level: u8) -> Compression {
        Compression(level.min(MAX_LEVEL))
    }

    /// Returns the numeric level.
    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Compression {
    fn default() -> Compression {
        Compression::DEFAULT
    }
}

/// Compresses `bytes` into a zlib stream (header, deflate blocks and
/// Adler-32 trailer).
pub fn deflate_compress(bytes: &[u8], compression: Compression) -> Vec<u8> {
    compress_to_vec_zlib(bytes, compression.level())
}
