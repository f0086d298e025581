//! Common test utilities and fixtures for the thumbnail optimizer tests
//!
//! Images are synthesized with the `image` crate so the suite needs no
//! binary fixtures on disk.

#![allow(dead_code)]

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use omnishare_thumbnail::ImagePayload;

/// Source sizes covering the aspect ratios thumbnails must letterbox.
pub mod sizes {
    /// 1:1
    pub const SQUARE: (u32, u32) = (900, 900);
    /// 16:9, same ratio as the target
    pub const WIDESCREEN: (u32, u32) = (1920, 1080);
    /// 9:16 phone video frame
    pub const TALL: (u32, u32) = (720, 1280);
    /// 3:1 banner
    pub const BANNER: (u32, u32) = (1500, 500);
}

/// Deterministic xorshift noise; compresses badly, which is the point.
pub fn noisy_rgb(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.max(1);
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

/// Smooth diagonal gradient; compresses well.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgb([r, g, 128])
    })
}

/// Solid white image, handy for telling content apart from black bars.
pub fn white_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

pub fn jpeg(image: &RgbImage, quality: u8) -> ImagePayload {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .expect("encode fixture jpeg");
    ImagePayload::new(out)
}

pub fn png(image: &RgbImage) -> ImagePayload {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture png");
    ImagePayload::new(out.into_inner())
}

pub fn transparent_png(width: u32, height: u32) -> ImagePayload {
    let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture png");
    ImagePayload::new(out.into_inner())
}

/// Insert an APP1 Exif segment carrying only the orientation tag (0x0112).
pub fn with_exif_orientation(jpeg: &ImagePayload, orientation: u16) -> ImagePayload {
    let bytes = jpeg.as_bytes();
    assert!(bytes.starts_with(&[0xFF, 0xD8]), "fixture must be a JPEG");

    let mut exif = b"Exif\0\0".to_vec();
    // Big-endian TIFF header, first IFD at offset 8
    exif.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    exif.extend_from_slice(&[0x00, 0x01]);
    exif.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0x00, 0x00]);
    exif.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&bytes[2..]);
    ImagePayload::new(out)
}

/// Decode a payload, panicking with context if it is not an image.
pub fn decode(payload: &ImagePayload) -> DynamicImage {
    image::load_from_memory(payload.as_bytes()).expect("payload should decode")
}

pub fn dimensions(payload: &ImagePayload) -> (u32, u32) {
    let image = decode(payload);
    (image.width(), image.height())
}

pub fn is_jpeg(payload: &ImagePayload) -> bool {
    payload.as_bytes().starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Mean luma of a region; JPEG noise makes exact pixel checks brittle.
pub fn mean_luma(image: &DynamicImage, x: u32, y: u32, w: u32, h: u32) -> f64 {
    let luma = image.to_luma8();
    let mut total = 0u64;
    for yy in y..y + h {
        for xx in x..x + w {
            total += luma.get_pixel(xx, yy)[0] as u64;
        }
    }
    total as f64 / (w as u64 * h as u64) as f64
}
