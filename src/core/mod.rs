//! # Core Types Module
//!
//! Value types that flow through the optimizer: encoded payloads, pixel
//! dimensions, byte-size limits and encoder quality levels.

pub mod payload;

pub use payload::{Dimensions, ImagePayload, QualityLevel, SizeConstraint};
