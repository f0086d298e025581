// SPDX-License-Identifier: MIT
//! # Letterbox Plans and Canvas Presets
//!
//! A [`LetterboxPlan`] describes where a source image lands on a fixed canvas:
//! the canvas size itself and the sub-rectangle that receives the scaled
//! source. Everything outside that rectangle is background.
//!
//! - The scale factor is `min(canvas.w / src.w, canvas.h / src.h)`, so the
//!   constrained dimension fills the canvas exactly and the other one fits.
//! - Small sources are scaled up; the canvas is always filled edge to edge in
//!   at least one dimension.
//! - Scaled sizes are rounded and clamped to `1..=canvas`, which keeps the
//!   centered offsets non-negative.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Computed placement of a source image on a fixed canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterboxPlan {
    /// Original input dimensions
    pub input: Size,
    /// Canvas dimensions (always the requested canvas)
    pub out: Size,
    /// Sub-rectangle receiving the scaled source.
    /// Format: (x, y, width, height) in canvas coordinate space.
    pub dst_roi: (u32, u32, u32, u32),
}

impl LetterboxPlan {
    /// Uniform scale factor applied to the source.
    pub fn scale(&self) -> f64 {
        let (_, _, rw, _) = self.dst_roi;
        rw as f64 / self.input.w.max(1) as f64
    }

    /// True when the scaled source covers the whole canvas (no bars).
    pub fn is_full_bleed(&self) -> bool {
        let (_, _, rw, rh) = self.dst_roi;
        rw == self.out.w && rh == self.out.h
    }
}

/// Compute where `input` lands on a `canvas`-sized letterboxed surface.
///
/// O(1); a degenerate zero-sized input is treated as 1px in that dimension.
pub fn build_letterbox_plan(input: Size, canvas: Size) -> LetterboxPlan {
    let (rw, rh) = fit_within(input, canvas);
    let x = canvas.w.saturating_sub(rw) / 2;
    let y = canvas.h.saturating_sub(rh) / 2;
    LetterboxPlan {
        input,
        out: canvas,
        dst_roi: (x, y, rw, rh),
    }
}

/// Fit image within a bounding box while preserving aspect ratio.
/// Unlike a pure downscale fit, this scales small images up to the box.
fn fit_within(input: Size, box_: Size) -> (u32, u32) {
    let (w, h) = (input.w.max(1) as f64, input.h.max(1) as f64);
    let (bw, bh) = (box_.w as f64, box_.h as f64);
    let s = (bw / w).min(bh / h);
    (
        ((w * s).round() as u32).min(box_.w).max(1),
        ((h * s).round() as u32).min(box_.h).max(1),
    )
}

/// Canvas presets matching common social platform thumbnail slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CanvasPreset {
    /// 1280×720, the 16:9 video thumbnail slot
    #[default]
    #[value(name = "hd720")]
    Hd720,
    /// 1920×1080 16:9 cover image
    #[value(name = "hd1080")]
    Hd1080,
    /// 1080×1080 square feed post
    #[value(name = "square1080")]
    Square1080,
    /// 1080×1920 vertical story/reel cover
    #[value(name = "portrait1080")]
    Portrait1080,
}

impl CanvasPreset {
    /// Canvas dimensions for this preset.
    pub fn to_canvas(self) -> Size {
        match self {
            CanvasPreset::Hd720 => Size { w: 1280, h: 720 },
            CanvasPreset::Hd1080 => Size { w: 1920, h: 1080 },
            CanvasPreset::Square1080 => Size { w: 1080, h: 1080 },
            CanvasPreset::Portrait1080 => Size { w: 1080, h: 1920 },
        }
    }
}
