//! Types shared between the decode service and the crop surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal failure of a decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The header was recognized but could not be read.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// Failure reported by an external decode service.
    #[error("Decode failed: {0}")]
    Failed(String),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if displaying the image upright swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// What the surface needs from a successful decode: the bitmap size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Stored width in pixels (before orientation correction).
    pub width: u32,
    /// Stored height in pixels (before orientation correction).
    pub height: u32,
    #[serde(default)]
    pub orientation: Orientation,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            orientation: Orientation::Normal,
        }
    }

    /// Dimensions of the upright image.
    pub fn oriented_size(&self) -> (u32, u32) {
        if self.orientation.swaps_dimensions() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// One callback from a decode service.
///
/// A well-behaved service sends zero or more `Progress` values that never
/// decrease, then exactly one `Decoded` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// Fraction complete in `[0, 1]`.
    Progress(f32),
    Decoded(ImageInfo),
    Failed(DecodeError),
}
