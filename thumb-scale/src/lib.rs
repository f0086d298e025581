// SPDX-License-Identifier: MIT
//! # thumb-scale: Letterbox Scaling for Fixed-Size Thumbnails
//!
//! This crate places an arbitrary RGBA image onto a fixed-size RGB canvas,
//! scaled uniformly so the whole source stays visible and centered on a solid
//! background. Social platforms impose exact thumbnail resolutions, so the
//! output canvas never depends on the source aspect ratio.
//!
//! ## Key Components
//!
//! - [`presets`]: Letterbox plan computation and platform canvas presets
//! - [`cpu`]: CPU scaling and compositing using fast_image_resize (SIMD)
//!
//! ## Usage Example
//!
//! ```rust
//! use thumb_scale::{cpu::{letterbox_rgba_cpu, Staging}, presets::{build_letterbox_plan, Size}};
//!
//! let src = Size { w: 4, h: 2 };
//! let rgba = vec![255u8; 4 * 2 * 4];
//! let plan = build_letterbox_plan(src, Size { w: 8, h: 8 });
//!
//! let mut resizer = fast_image_resize::Resizer::new();
//! let mut canvas = vec![0u8; (plan.out.w * plan.out.h * 3) as usize];
//! let mut staging = Staging::with_capacity(0);
//!
//! letterbox_rgba_cpu(&mut resizer, &rgba, src, &plan, [0, 0, 0], &mut canvas, &mut staging)
//!     .unwrap();
//! assert_eq!(plan.dst_roi, (0, 2, 8, 4));
//! ```

pub mod cpu;
pub mod presets;
