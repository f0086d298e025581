//! # Payload and Constraint Types
//!
//! Value types shared by the optimizer, the batch runner and the CLI:
//!
//! - [`ImagePayload`]: an owned, immutable encoded image (JPEG, PNG, ...)
//! - [`Dimensions`]: pixel width and height
//! - [`SizeConstraint`]: maximum encoded byte length
//! - [`QualityLevel`]: lossy encoder fidelity in `(0, 1]`

use std::fmt;

/// Opaque encoded raster image.
///
/// Ownership moves with the value; nothing in this crate mutates the bytes
/// after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Wrap encoded image bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for ImagePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for ImagePayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// Dumping megabytes of image bytes into logs helps nobody.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Pixel dimensions of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// 1280×720, the default thumbnail canvas.
    pub const HD_720: Dimensions = Dimensions {
        width: 1280,
        height: 720,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<thumb_scale::presets::Size> for Dimensions {
    fn from(size: thumb_scale::presets::Size) -> Self {
        Self::new(size.w, size.h)
    }
}

impl From<Dimensions> for thumb_scale::presets::Size {
    fn from(dims: Dimensions) -> Self {
        Self {
            w: dims.width,
            h: dims.height,
        }
    }
}

/// Maximum encoded byte length a payload may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SizeConstraint(u64);

impl SizeConstraint {
    /// 2 MiB, the platform thumbnail upload limit.
    pub const TWO_MIB: SizeConstraint = SizeConstraint(2 * 1024 * 1024);

    pub const fn bytes(max_bytes: u64) -> Self {
        Self(max_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.0
    }

    /// True if `len` bytes fit within the constraint.
    pub fn allows(&self, len: usize) -> bool {
        len as u64 <= self.0
    }
}

impl fmt::Display for SizeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

/// Lossy encoder fidelity in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct QualityLevel(f32);

impl QualityLevel {
    pub const MAX: QualityLevel = QualityLevel(1.0);

    /// Returns `None` unless `0 < value <= 1`.
    pub fn new(value: f32) -> Option<Self> {
        (value > 0.0 && value <= 1.0).then_some(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Map onto the 1..=100 scale used by JPEG encoders.
    pub fn to_jpeg_quality(&self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
