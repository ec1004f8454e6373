use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::icontype::OSType;
use super::source::IconRole;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while encoding images, building containers
/// or writing an icon set to disk.
#[derive(Debug, Error)]
pub enum Error {
    /// An image was requested with a zero width or height, or with
    /// dimensions too large to address.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A raw pixel buffer did not hold exactly `width * height * 4` bytes.
    #[error("pixel buffer holds {actual} bytes, but a {width}x{height} RGBA \
             image needs {expected}")]
    BufferLength {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// The number of bytes the dimensions require.
        expected: usize,
        /// The number of bytes supplied.
        actual: usize,
    },

    /// An OSType was not exactly four ASCII bytes.
    #[error("OSType must be 4 ASCII bytes (was {0:?})")]
    InvalidOSType(String),

    /// The same OSType was added to an icon family twice.
    #[error("the icon family already contains a '{0}' element")]
    DuplicateOSType(OSType),

    /// A container entry was given no payload bytes.
    #[error("{0} has an empty payload")]
    EmptyPayload(String),

    /// An image does not have the dimensions its ICNS slot requires.
    #[error("'{ostype}' requires a {expected}x{expected} image \
             (got {width}x{height})")]
    WrongDimensions {
        /// The slot the image was meant for.
        ostype: OSType,
        /// The side length the slot requires, in pixels.
        expected: u32,
        /// Width of the offered image.
        width: u32,
        /// Height of the offered image.
        height: u32,
    },

    /// No ICNS slot stores images of the given size.
    #[error("no supported icon type has dimensions {width}x{height}")]
    UnsupportedSize {
        /// Width of the offered image.
        width: u32,
        /// Height of the offered image.
        height: u32,
    },

    /// An ICO directory entry cannot describe the given dimensions.
    #[error("ICO entries must be between 1x1 and 256x256 (got \
             {width}x{height})")]
    IcoDimensions {
        /// Width of the offered image.
        width: u32,
        /// Height of the offered image.
        height: u32,
    },

    /// An ICO file can index at most `u16::MAX` images.
    #[error("too many ICO entries ({0})")]
    TooManyEntries(usize),

    /// A length or offset does not fit in its 32-bit field.
    #[error("{0} exceeds the 4 GiB limit of its length field")]
    TooLarge(&'static str),

    /// A pixel source returned a buffer of the wrong size.
    #[error("pixel source returned a {width}x{height} buffer for size \
             {size}")]
    WrongRenderSize {
        /// The requested side length.
        size: u32,
        /// Width of the returned buffer.
        width: u32,
        /// Height of the returned buffer.
        height: u32,
    },

    /// Rendering one icon size failed.
    #[error("failed to render {role} icon at {size}x{size}")]
    Render {
        /// The requested side length.
        size: u32,
        /// The requested role.
        role: IconRole,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },

    /// Building or writing one output file failed.
    #[error("failed to produce {name}")]
    Artifact {
        /// File name of the artifact.
        name: String,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },

    /// A file could not be created, written or renamed.
    #[error("I/O error on {}", .path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Writing to an in-memory or caller-supplied writer failed.
    #[error("write failed")]
    Write(#[from] io::Error),
}

impl Error {
    /// Returns true if the error was caused by invalid input rather than
    /// by the filesystem.  Retrying with the same input cannot succeed.
    pub fn is_invalid_input(&self) -> bool {
        match *self {
            Error::Render { ref source, .. } |
            Error::Artifact { ref source, .. } => source.is_invalid_input(),
            Error::Io { .. } | Error::Write(_) => false,
            _ => true,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn artifact(name: &str, source: Error) -> Error {
        Error::Artifact {
            name: name.to_string(),
            source: Box::new(source),
        }
    }
}
