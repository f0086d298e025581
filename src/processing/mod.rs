//! # Processing Module
//!
//! The optimization pipeline: canvas encoding, the letterbox/quality-search
//! optimizer, and concurrent batch execution.

pub mod batch;
pub mod encoder;
pub mod optimizer;

// Re-export commonly used types for convenience
pub use batch::{optimize_batch, optimize_batch_with};
pub use encoder::{Canvas, CanvasEncoder, JpegCanvasEncoder};
pub use optimizer::{Attempt, Optimized, Outcome, ThumbnailOptimizer};
