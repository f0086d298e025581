//! # OmniShare Thumbnail Optimizer
//!
//! Normalizes arbitrary raster images into thumbnails that third-party social
//! platforms accept: a fixed resolution and a maximum byte size.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `core`: Payload, dimension, size-limit and quality value types
//! - `config`: Optimizer configuration and validation
//! - `processing`: Letterboxing, quality search and batch execution
//! - `error`: Error taxonomy with context and classification traits
//!
//! Scaling itself lives in the `thumb-scale` workspace crate.
//!
//! ## Behavior
//!
//! - **Exact output size**: the source is letterboxed onto a black 1280×720
//!   canvas, never cropped or stretched
//! - **Bounded size**: JPEG quality starts at 0.85 and drops by 0.10 per retry
//!   down to 0.30 until the result is at most 2 MiB
//! - **Best effort**: any failure returns the original payload unchanged
//!
//! ## Example
//!
//! ```rust,no_run
//! use omnishare_thumbnail::{ImagePayload, optimize};
//!
//! let bytes = std::fs::read("frame.png").unwrap();
//! let thumbnail = optimize(ImagePayload::new(bytes));
//! std::fs::write("frame.thumb.jpg", thumbnail.as_bytes()).unwrap();
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod processing;

/// Re-export error types for convenience
pub use error::{HasSeverity, Recoverable, ThumbnailError, ThumbnailResult};

pub use crate::config::OptimizerConfig;
pub use crate::core::{Dimensions, ImagePayload, QualityLevel, SizeConstraint};
pub use processing::{
    CanvasEncoder, JpegCanvasEncoder, Optimized, Outcome, ThumbnailOptimizer, optimize_batch,
    optimize_batch_with,
};

/// Canvas size every default optimization produces.
pub const TARGET_DIMENSIONS: Dimensions = Dimensions::HD_720;

/// Byte limit every default optimization respects.
pub const MAX_THUMBNAIL_BYTES: SizeConstraint = SizeConstraint::TWO_MIB;

/// Optimize a thumbnail with the default constraints.
///
/// Returns a 1280×720 JPEG of at most 2 MiB, or `input` unchanged if it cannot
/// be decoded, no canvas or encoder is available, or no quality down to the
/// floor fits the limit. Never fails.
///
/// # Examples
///
/// ```rust
/// use omnishare_thumbnail::{ImagePayload, optimize};
///
/// let corrupt = ImagePayload::new(b"not an image".to_vec());
/// assert_eq!(optimize(corrupt.clone()), corrupt);
/// ```
pub fn optimize(input: ImagePayload) -> ImagePayload {
    ThumbnailOptimizer::default().optimize(input)
}

/// Like [`optimize`] but keeps the outcome, including the fallback reason.
pub fn optimize_outcome(input: ImagePayload) -> Outcome {
    ThumbnailOptimizer::default().run(input)
}
