//! # Canvas Encoding
//!
//! The letterboxed canvas and the [`CanvasEncoder`] seam that turns it into
//! bytes. Production code uses [`JpegCanvasEncoder`]; the quality search only
//! depends on the trait, so tests can count attempts or force failures.

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::core::{Dimensions, QualityLevel};
use crate::error::{ThumbnailError, ThumbnailResult};

/// Tightly packed RGB8 pixels of exactly `dimensions`.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    rgb: Vec<u8>,
    dimensions: Dimensions,
}

impl Canvas {
    /// Wrap an RGB8 buffer, checking it matches the dimensions.
    pub fn from_rgb(dimensions: Dimensions, rgb: Vec<u8>) -> ThumbnailResult<Self> {
        let expected = dimensions.pixel_count() * 3;
        if rgb.len() as u64 != expected {
            return Err(ThumbnailError::encoder_unavailable(
                "canvas",
                format!("expected {} bytes for {}, got {}", expected, dimensions, rgb.len()),
            ));
        }
        Ok(Self { rgb, dimensions })
    }

    /// Canvas of one solid color.
    #[cfg(test)]
    pub(crate) fn filled(dimensions: Dimensions, color: [u8; 3]) -> Self {
        Self {
            rgb: color.repeat(dimensions.pixel_count() as usize),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn as_rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// RGB value at (x, y), or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let i = ((y as usize) * (self.dimensions.width as usize) + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

/// Lossy encoder for a finished canvas.
pub trait CanvasEncoder {
    /// Encode `canvas` at `quality`, returning the encoded bytes.
    fn encode(&mut self, canvas: &Canvas, quality: QualityLevel) -> ThumbnailResult<Vec<u8>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Baseline JPEG via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCanvasEncoder;

impl CanvasEncoder for JpegCanvasEncoder {
    fn encode(&mut self, canvas: &Canvas, quality: QualityLevel) -> ThumbnailResult<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.to_jpeg_quality());
            encoder
                .encode(
                    canvas.as_rgb(),
                    canvas.dimensions().width,
                    canvas.dimensions().height,
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| ThumbnailError::encoder_from("encode_jpeg", e))?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "jpeg"
    }
}
