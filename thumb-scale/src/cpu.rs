// SPDX-License-Identifier: MIT
// CPU letterboxer built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGB8 canvas out, composited over a solid background.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::presets::{LetterboxPlan, Size};

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall,
    EmptySource,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError {
    fn from(e: fir::ResizeError) -> Self { Self::Fir(e) }
}
impl From<fir::ImageBufferError> for ScaleError {
    fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) }
}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall => write!(f, "Canvas buffer too small"),
            ScaleError::EmptySource => write!(f, "Source image has zero width or height"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Scratch holding the resized RGBA region before it is composited.
pub struct Staging {
    pub(crate) buf: Vec<u8>,
}
impl Staging {
    pub fn with_capacity(cap: usize) -> Self { Self { buf: Vec::with_capacity(cap) } }
    pub fn ensure_len(&mut self, len: usize) {
        if self.buf.len() < len { self.buf.resize(len, 0); }
    }
}

/// Main letterbox entry point.
/// `src_rgba` must be tightly packed RGBA8 of `src` dimensions.
/// `dst_rgb` must hold at least `plan.out.w * plan.out.h * 3` bytes; it is
/// overwritten entirely (background outside `plan.dst_roi`).
pub fn letterbox_rgba_cpu(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    src: Size,
    plan: &LetterboxPlan,
    bg_rgb: [u8; 3],
    dst_rgb: &mut [u8],
    staging: &mut Staging,
) -> Result<(), ScaleError> {
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 3;
    if dst_rgb.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }
    if src.w == 0 || src.h == 0 {
        return Err(ScaleError::EmptySource);
    }

    // --- Background first, the ROI is written over it ---
    fill_rgb(&mut dst_rgb[..dst_len], bg_rgb);

    // --- Resize source into the ROI-sized staging image ---
    let (x, y, rw, rh) = plan.dst_roi;
    let roi_len = (rw as usize) * (rh as usize) * 4;
    staging.ensure_len(roi_len);

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.w, src.h, src_rgba)?;
    let mut roi_image = TypedImage::<U8x4>::from_buffer(rw, rh, &mut staging.buf[..roi_len])?;

    let opts = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        .use_alpha(true);
    resizer.resize_typed(&src_view, &mut roi_image, &opts)?;

    // --- Composite the ROI onto the canvas ---
    composite_roi(
        &staging.buf[..roi_len],
        rw as usize,
        rh as usize,
        &mut dst_rgb[..dst_len],
        plan.out.w as usize,
        x as usize,
        y as usize,
        bg_rgb,
    );

    Ok(())
}

#[inline]
fn fill_rgb(dst: &mut [u8], bg: [u8; 3]) {
    for px in dst.chunks_exact_mut(3) {
        px.copy_from_slice(&bg);
    }
}

/// Blend straight-alpha RGBA rows over the background at (x, y).
#[allow(clippy::too_many_arguments)]
#[inline]
fn composite_roi(
    roi: &[u8],
    roi_w: usize,
    roi_h: usize,
    dst: &mut [u8],
    dst_w: usize,
    x: usize,
    y: usize,
    bg: [u8; 3],
) {
    for r in 0..roi_h {
        let s = &roi[r * roi_w * 4..(r + 1) * roi_w * 4];
        let start = ((y + r) * dst_w + x) * 3;
        let d = &mut dst[start..start + roi_w * 3];
        for (sp, dp) in s.chunks_exact(4).zip(d.chunks_exact_mut(3)) {
            let a = sp[3] as u32;
            for c in 0..3 {
                dp[c] = ((sp[c] as u32 * a + bg[c] as u32 * (255 - a) + 127) / 255) as u8;
            }
        }
    }
}
