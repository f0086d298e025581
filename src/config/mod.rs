//! # Configuration Module
//!
//! This module provides the optimizer configuration and its validation.

pub mod config;

pub use config::{MIN_QUALITY_STEP, OptimizerConfig};
