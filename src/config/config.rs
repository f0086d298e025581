//! # Optimizer Configuration
//!
//! Configuration and validation for the thumbnail optimizer. The defaults are
//! the constants of the upload pipeline; [`crate::optimize`] always uses them.
//! A custom [`OptimizerConfig`] is only needed by callers targeting a
//! different platform slot (see [`thumb_scale::presets::CanvasPreset`]).
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Constraint |
//! |-----------|------|---------|------------|
//! | `target` | `Dimensions` | 1280×720 | both sides > 0 |
//! | `max_bytes` | `SizeConstraint` | 2 MiB | > 0 |
//! | `initial_quality` | `f32` | 0.85 | (0, 1] |
//! | `quality_step` | `f32` | 0.10 | ≥ 0.01 |
//! | `quality_floor` | `f32` | 0.30 | (0, initial_quality] |
//! | `background` | `[u8; 3]` | black | any RGB |
//!
//! ## Quality Schedule
//!
//! The encoder is tried at `initial - k * step` for `k = 0, 1, ...` while the
//! level stays at or above the floor. With the defaults that is
//! 0.85, 0.75, 0.65, 0.55, 0.45, 0.35: six attempts at most.
//!
//! ## Examples
//!
//! ```rust
//! use omnishare_thumbnail::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.quality_schedule().len(), 6);
//! ```

use crate::core::{Dimensions, QualityLevel, SizeConstraint};
use crate::error::{ThumbnailError, ThumbnailResult};

/// Smallest accepted quality decrement (one JPEG quality point).
pub const MIN_QUALITY_STEP: f32 = 0.01;

/// Tolerance for float drift when comparing a level against the floor.
const FLOOR_EPSILON: f32 = 1e-4;

/// Configuration structure for thumbnail optimization.
///
/// # Examples
///
/// Square feed thumbnail under 1 MiB:
/// ```rust
/// use omnishare_thumbnail::config::OptimizerConfig;
/// use omnishare_thumbnail::core::{Dimensions, SizeConstraint};
///
/// let config = OptimizerConfig {
///     target: Dimensions::new(1080, 1080),
///     max_bytes: SizeConstraint::bytes(1024 * 1024),
///     ..OptimizerConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Exact output canvas dimensions.
    pub target: Dimensions,

    /// Maximum encoded size of the output payload.
    pub max_bytes: SizeConstraint,

    /// First quality level tried.
    pub initial_quality: f32,

    /// Amount subtracted from the quality level after each oversized attempt.
    pub quality_step: f32,

    /// Lowest quality level tried (inclusive).
    pub quality_floor: f32,

    /// RGB fill for the letterbox bars and behind transparent pixels.
    pub background: [u8; 3],
}

impl Default for OptimizerConfig {
    /// Default values:
    /// - `target`: 1280×720
    /// - `max_bytes`: 2 MiB
    /// - `initial_quality`: 0.85
    /// - `quality_step`: 0.10
    /// - `quality_floor`: 0.30
    /// - `background`: black
    fn default() -> Self {
        Self {
            target: Dimensions::HD_720,
            max_bytes: SizeConstraint::TWO_MIB,
            initial_quality: 0.85,
            quality_step: 0.10,
            quality_floor: 0.30,
            background: [0, 0, 0],
        }
    }
}

impl OptimizerConfig {
    /// Creates a new configuration with the specified parameters.
    pub fn new(
        target: Dimensions,
        max_bytes: SizeConstraint,
        initial_quality: f32,
        quality_step: f32,
        quality_floor: f32,
    ) -> Self {
        Self {
            target,
            max_bytes,
            initial_quality,
            quality_step,
            quality_floor,
            background: [0, 0, 0],
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> ThumbnailResult<()> {
        if self.target.width == 0 {
            return Err(ThumbnailError::config(
                "target.width",
                "0",
                "must be greater than 0",
            ));
        }
        if self.target.height == 0 {
            return Err(ThumbnailError::config(
                "target.height",
                "0",
                "must be greater than 0",
            ));
        }
        if self.max_bytes.max_bytes() == 0 {
            return Err(ThumbnailError::config(
                "max_bytes",
                "0",
                "must be greater than 0",
            ));
        }
        if QualityLevel::new(self.initial_quality).is_none() {
            return Err(ThumbnailError::config(
                "initial_quality",
                self.initial_quality.to_string(),
                "must be within (0, 1]",
            ));
        }
        // NaN fails the comparison too
        if !(self.quality_step >= MIN_QUALITY_STEP) {
            return Err(ThumbnailError::config(
                "quality_step",
                self.quality_step.to_string(),
                format!("must be at least {}", MIN_QUALITY_STEP),
            ));
        }
        if !(self.quality_floor > 0.0 && self.quality_floor <= self.initial_quality) {
            return Err(ThumbnailError::config(
                "quality_floor",
                self.quality_floor.to_string(),
                "must be within (0, initial_quality]",
            ));
        }
        Ok(())
    }

    /// Quality levels to try, highest first.
    ///
    /// Strictly decreasing, also after mapping to JPEG quality, and never
    /// empty for a valid configuration; the first element is always
    /// `initial_quality`.
    pub fn quality_schedule(&self) -> Vec<QualityLevel> {
        let mut levels = Vec::new();
        if self.validate().is_err() {
            return levels;
        }
        for k in 0u32.. {
            let value = self.initial_quality - self.quality_step * k as f32;
            if value < self.quality_floor - FLOOR_EPSILON {
                break;
            }
            // Floors within FLOOR_EPSILON of zero would otherwise admit 0.0
            let Some(level) = QualityLevel::new(value) else {
                break;
            };
            // Neighbouring levels can round to the same encoder setting
            let repeats = levels
                .last()
                .is_some_and(|last| last.to_jpeg_quality() == level.to_jpeg_quality());
            if !repeats {
                levels.push(level);
            }
        }
        levels
    }
}
