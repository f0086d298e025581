//! # Thumbnail Optimizer
//!
//! Decode → letterbox → bounded quality search.
//!
//! 1. The payload is decoded to straight-alpha RGBA and its natural size read.
//! 2. A canvas of exactly the target size is filled with the background and
//!    the source is scaled by `min(tw / sw, th / sh)` and centered on it.
//! 3. The canvas is encoded at each level of the configured quality schedule,
//!    highest first, until one result fits the byte limit.
//!
//! [`ThumbnailOptimizer::run`] reports the outcome as [`Outcome`], keeping the
//! failure kind for logging and tests. [`ThumbnailOptimizer::optimize`]
//! collapses it to a payload: the optimized one, or the untouched input.
//!
//! Decoded pixels, the staging buffer and the resizer are owned by the call
//! and dropped on every return path.

use std::io::Cursor;

use fast_image_resize::Resizer;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use thumb_scale::cpu::{Staging, letterbox_rgba_cpu};
use thumb_scale::presets::build_letterbox_plan;
use tracing::{debug, info, instrument, warn};

use crate::config::OptimizerConfig;
use crate::core::{Dimensions, ImagePayload, QualityLevel};
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::processing::encoder::{Canvas, CanvasEncoder, JpegCanvasEncoder};

/// One encode of the quality search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub quality: QualityLevel,
    pub encoded_bytes: usize,
}

/// Successful optimization.
#[derive(Debug, Clone)]
pub struct Optimized {
    /// Encoded output, exactly `target` pixels and within the size limit
    pub payload: ImagePayload,
    /// Quality level that produced `payload`
    pub quality: QualityLevel,
    /// Natural size of the decoded input
    pub source: Dimensions,
    /// Output canvas size
    pub target: Dimensions,
    /// Every encode tried, in order; the last one is the winner
    pub attempts: Vec<Attempt>,
}

/// Result of one optimization, before it is collapsed to a payload.
#[derive(Debug)]
pub enum Outcome {
    Optimized(Optimized),
    Fallback {
        original: ImagePayload,
        reason: ThumbnailError,
    },
}

impl Outcome {
    pub fn is_optimized(&self) -> bool {
        matches!(self, Outcome::Optimized(_))
    }

    pub fn fallback_reason(&self) -> Option<&ThumbnailError> {
        match self {
            Outcome::Optimized(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }

    /// The payload handed to the upload path.
    pub fn into_payload(self) -> ImagePayload {
        match self {
            Outcome::Optimized(optimized) => optimized.payload,
            Outcome::Fallback { original, .. } => original,
        }
    }
}

/// Decoded source pixels.
struct SourceImage {
    rgba: Vec<u8>,
    dimensions: Dimensions,
}

/// Letterboxing, size-bounded thumbnail encoder.
pub struct ThumbnailOptimizer<E = JpegCanvasEncoder> {
    config: OptimizerConfig,
    encoder: E,
}

impl Default for ThumbnailOptimizer<JpegCanvasEncoder> {
    fn default() -> Self {
        Self {
            config: OptimizerConfig::default(),
            encoder: JpegCanvasEncoder,
        }
    }
}

impl ThumbnailOptimizer<JpegCanvasEncoder> {
    /// JPEG optimizer for a validated configuration.
    pub fn new(config: OptimizerConfig) -> ThumbnailResult<Self> {
        Self::with_encoder(config, JpegCanvasEncoder)
    }
}

impl<E: CanvasEncoder> ThumbnailOptimizer<E> {
    /// Optimizer using a custom canvas encoder.
    pub fn with_encoder(config: OptimizerConfig, encoder: E) -> ThumbnailResult<Self> {
        config.validate()?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Best-effort optimization: never fails, returns the input on any error.
    pub fn optimize(&mut self, input: ImagePayload) -> ImagePayload {
        self.run(input).into_payload()
    }

    /// Optimize and report which way it went.
    #[instrument(skip_all, fields(input_bytes = input.len(), encoder = self.encoder.name()))]
    pub fn run(&mut self, input: ImagePayload) -> Outcome {
        match self.try_optimize(&input) {
            Ok(optimized) => {
                info!(
                    source = %optimized.source,
                    target = %optimized.target,
                    quality = %optimized.quality,
                    output_bytes = optimized.payload.len(),
                    attempts = optimized.attempts.len(),
                    "thumbnail optimized"
                );
                Outcome::Optimized(optimized)
            }
            Err(reason) => {
                warn!(
                    category = reason.category(),
                    error = %reason,
                    "thumbnail optimization failed, keeping original payload"
                );
                Outcome::Fallback {
                    original: input,
                    reason,
                }
            }
        }
    }

    /// Strict variant: any failure is returned as an error.
    pub fn try_optimize(&mut self, input: &ImagePayload) -> ThumbnailResult<Optimized> {
        // Source pixels are dropped as soon as the canvas exists
        let (canvas, source) = {
            let source = decode(input)?;
            debug!(source = %source.dimensions, "decoded input");
            (self.render_canvas(&source)?, source.dimensions)
        };
        self.search_quality(&canvas, source)
    }

    /// Letterbox the source onto a freshly allocated target canvas.
    fn render_canvas(&self, source: &SourceImage) -> ThumbnailResult<Canvas> {
        let target = self.config.target;
        let plan = build_letterbox_plan(source.dimensions.into(), target.into());
        debug!(
            roi = ?plan.dst_roi,
            scale = plan.scale(),
            full_bleed = plan.is_full_bleed(),
            "letterbox plan"
        );

        let len = (target.pixel_count() * 3) as usize;
        let mut rgb = Vec::new();
        rgb.try_reserve_exact(len).map_err(|e| {
            ThumbnailError::encoder_from("canvas", e).with_metadata("target", target.to_string())
        })?;
        rgb.resize(len, 0);

        let mut resizer = Resizer::new();
        let mut staging = Staging::with_capacity(0);
        letterbox_rgba_cpu(
            &mut resizer,
            &source.rgba,
            source.dimensions.into(),
            &plan,
            self.config.background,
            &mut rgb,
            &mut staging,
        )?;

        Canvas::from_rgb(target, rgb)
    }

    /// Encode at decreasing quality until the result fits.
    fn search_quality(
        &mut self,
        canvas: &Canvas,
        source: Dimensions,
    ) -> ThumbnailResult<Optimized> {
        let limit = self.config.max_bytes;
        let schedule = self.config.quality_schedule();
        let mut attempts = Vec::with_capacity(schedule.len());

        for quality in schedule {
            let encoded = self.encoder.encode(canvas, quality)?;
            if encoded.is_empty() {
                return Err(ThumbnailError::encoder_unavailable(
                    "encode",
                    "encoder produced no data",
                ));
            }
            debug!(quality = %quality, encoded_bytes = encoded.len(), "encode attempt");
            attempts.push(Attempt {
                quality,
                encoded_bytes: encoded.len(),
            });

            if limit.allows(encoded.len()) {
                return Ok(Optimized {
                    payload: ImagePayload::new(encoded),
                    quality,
                    source,
                    target: canvas.dimensions(),
                    attempts,
                });
            }
        }

        let smallest = attempts.iter().map(|a| a.encoded_bytes).min().unwrap_or(0);
        Err(
            ThumbnailError::size_unsatisfiable(limit.max_bytes(), smallest as u64, attempts.len())
                .with_operation("quality_search")
                .with_metadata("source", source.to_string())
                .with_metadata("target", canvas.dimensions().to_string()),
        )
    }
}

/// Decode any format the `image` crate recognizes from its magic bytes.
fn decode(input: &ImagePayload) -> ThumbnailResult<SourceImage> {
    if input.is_empty() {
        return Err(ThumbnailError::decode("empty payload"));
    }
    let reader = ImageReader::new(Cursor::new(input.as_bytes()))
        .with_guessed_format()
        .map_err(ThumbnailError::decode_from)?;
    if reader.format().is_none() {
        return Err(ThumbnailError::decode("unrecognized image format"));
    }
    let mut decoder = reader.into_decoder().map_err(ThumbnailError::decode_from)?;
    // Natural size is the displayed size, so EXIF rotation is applied first
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).map_err(ThumbnailError::decode_from)?;
    image.apply_orientation(orientation);
    if orientation != Orientation::NoTransforms {
        debug!(?orientation, "applied EXIF orientation");
    }

    let dimensions = Dimensions::new(image.width(), image.height());
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(ThumbnailError::decode(format!(
            "image has no pixels ({})",
            dimensions
        )));
    }
    Ok(SourceImage {
        rgba: image.into_rgba8().into_raw(),
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SizeConstraint;
    use image::{ImageFormat, Rgba, RgbaImage};

    /// Records every quality requested and returns a fixed-size fake payload.
    struct FixedSizeEncoder {
        sizes: Vec<usize>,
        calls: Vec<QualityLevel>,
    }

    impl CanvasEncoder for FixedSizeEncoder {
        fn encode(&mut self, _canvas: &Canvas, quality: QualityLevel) -> ThumbnailResult<Vec<u8>> {
            let size = self.sizes[self.calls.len().min(self.sizes.len() - 1)];
            self.calls.push(quality);
            Ok(vec![0xAB; size])
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct BrokenEncoder;

    impl CanvasEncoder for BrokenEncoder {
        fn encode(
            &mut self,
            _canvas: &Canvas,
            _quality: QualityLevel,
        ) -> ThumbnailResult<Vec<u8>> {
            Err(ThumbnailError::encoder_unavailable("encode", "no encoder"))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn png(width: u32, height: u32, px: [u8; 4]) -> ImagePayload {
        let image = RgbaImage::from_pixel(width, height, Rgba(px));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        ImagePayload::new(out.into_inner())
    }

    fn small_config() -> OptimizerConfig {
        OptimizerConfig {
            target: Dimensions::new(32, 18),
            max_bytes: SizeConstraint::bytes(100),
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn first_fitting_quality_stops_the_search() {
        let encoder = FixedSizeEncoder {
            sizes: vec![50],
            calls: Vec::new(),
        };
        let mut optimizer = ThumbnailOptimizer::with_encoder(small_config(), encoder).unwrap();

        let optimized = optimizer.try_optimize(&png(8, 8, [1, 2, 3, 255])).unwrap();
        assert_eq!(optimized.attempts.len(), 1);
        assert_eq!(optimized.quality.to_jpeg_quality(), 85);
        assert_eq!(optimizer.encoder().calls.len(), 1);
    }

    #[test]
    fn quality_steps_down_until_it_fits() {
        let encoder = FixedSizeEncoder {
            sizes: vec![400, 300, 200, 90],
            calls: Vec::new(),
        };
        let mut optimizer = ThumbnailOptimizer::with_encoder(small_config(), encoder).unwrap();

        let optimized = optimizer.try_optimize(&png(8, 8, [1, 2, 3, 255])).unwrap();
        let qualities: Vec<u8> = optimized
            .attempts
            .iter()
            .map(|a| a.quality.to_jpeg_quality())
            .collect();
        assert_eq!(qualities, vec![85, 75, 65, 55]);
        assert_eq!(optimized.payload.len(), 90);
        assert_eq!(optimized.quality.to_jpeg_quality(), 55);
    }

    #[test]
    fn exhausted_schedule_is_size_error() {
        let encoder = FixedSizeEncoder {
            sizes: vec![500, 400, 300, 250, 200, 150],
            calls: Vec::new(),
        };
        let mut optimizer = ThumbnailOptimizer::with_encoder(small_config(), encoder).unwrap();

        match optimizer.try_optimize(&png(8, 8, [1, 2, 3, 255])) {
            Err(ThumbnailError::SizeConstraintUnsatisfiable {
                max_bytes,
                smallest_bytes,
                attempts,
                ..
            }) => {
                assert_eq!(max_bytes, 100);
                assert_eq!(smallest_bytes, 150);
                assert_eq!(attempts, 6);
            }
            other => panic!("expected size error, got {:?}", other),
        }
        assert_eq!(optimizer.encoder().calls.len(), 6);
    }

    #[test]
    fn size_failure_falls_back_to_original() {
        let encoder = FixedSizeEncoder {
            sizes: vec![1000],
            calls: Vec::new(),
        };
        let mut optimizer = ThumbnailOptimizer::with_encoder(small_config(), encoder).unwrap();
        let input = png(8, 8, [1, 2, 3, 255]);

        let outcome = optimizer.run(input.clone());
        assert_eq!(
            outcome.fallback_reason().map(ThumbnailError::category),
            Some("size_constraint_unsatisfiable")
        );
        assert_eq!(outcome.into_payload(), input);
    }

    #[test]
    fn encoder_failure_falls_back_to_original() {
        let mut optimizer =
            ThumbnailOptimizer::with_encoder(small_config(), BrokenEncoder).unwrap();
        let input = png(8, 8, [1, 2, 3, 255]);

        let outcome = optimizer.run(input.clone());
        assert_eq!(
            outcome.fallback_reason().map(ThumbnailError::category),
            Some("encoder_unavailable")
        );
        assert_eq!(outcome.into_payload(), input);
    }

    #[test]
    fn empty_encoder_output_is_rejected() {
        let encoder = FixedSizeEncoder {
            sizes: vec![0],
            calls: Vec::new(),
        };
        let mut optimizer = ThumbnailOptimizer::with_encoder(small_config(), encoder).unwrap();
        let err = optimizer.try_optimize(&png(4, 4, [0, 0, 0, 255])).unwrap_err();
        assert_eq!(err.category(), "encoder_unavailable");
    }

    #[test]
    fn garbage_is_decode_error() {
        let mut optimizer = ThumbnailOptimizer::new(small_config()).unwrap();
        let err = optimizer
            .try_optimize(&ImagePayload::new(b"definitely not an image".to_vec()))
            .unwrap_err();
        assert_eq!(err.category(), "decode");

        let err = optimizer.try_optimize(&ImagePayload::new(Vec::new())).unwrap_err();
        assert_eq!(err.category(), "decode");
    }

    #[test]
    fn truncated_png_is_decode_error() {
        let mut bytes = png(16, 16, [10, 20, 30, 255]).into_bytes();
        bytes.truncate(bytes.len() / 2);
        let mut optimizer = ThumbnailOptimizer::new(small_config()).unwrap();
        let err = optimizer.try_optimize(&ImagePayload::new(bytes)).unwrap_err();
        assert_eq!(err.category(), "decode");
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = OptimizerConfig {
            quality_floor: 2.0,
            ..OptimizerConfig::default()
        };
        assert!(ThumbnailOptimizer::new(config).is_err());
    }

    #[test]
    fn canvas_has_black_bars_around_content() {
        let optimizer = ThumbnailOptimizer::new(OptimizerConfig {
            target: Dimensions::new(40, 20),
            ..OptimizerConfig::default()
        })
        .unwrap();
        let source = decode(&png(10, 10, [255, 255, 255, 255])).unwrap();
        let canvas = optimizer.render_canvas(&source).unwrap();

        assert_eq!(canvas.dimensions(), Dimensions::new(40, 20));
        assert_eq!(canvas.pixel(0, 10), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(39, 10), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(20, 10), Some([255, 255, 255]));
    }
}
