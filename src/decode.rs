//! Image decoding and pixel normalization
//!
//! **Why**: Sources come in mixed bit depths (8-bit PNG, 16-bit TIFF, float
//! EXR/HDR) but the display path takes packed RGB8 only.
//!
//! # Layouts
//!
//! - `DecodedImage::Rgb8`: passed through unchanged
//! - `DecodedImage::RgbHigh`: rescaled by the per-image maximum to 0..255
//!   (lossy, image-dependent: two frames with different peaks get different scales)
//! - `DecodedImage::Gray`: replicated into the three channels
//!
//! JPEG 2000 files (`.jp2`, `.j2k`, ...) go through OpenJPEG via `jpeg2k`;
//! everything else through `image::open`. Both end up in `classify`.
//!
//! Alpha is dropped. The decoder itself sits behind `FrameDecoder`, so
//! normalization and thumbnailing are testable without touching files.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Rgb, Rgb32FImage, RgbImage};
use log::debug;

use crate::error::ViewerError;

/// Decoder output before normalization
#[derive(Debug, Clone)]
pub enum DecodedImage {
    /// 8 bits per channel RGB
    Rgb8(RgbImage),
    /// More than 8 bits per channel, raw sample magnitudes (not normalized)
    RgbHigh(Rgb32FImage),
    /// Single channel, 8-bit
    Gray(GrayImage),
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            DecodedImage::Rgb8(img) => img.dimensions(),
            DecodedImage::RgbHigh(img) => img.dimensions(),
            DecodedImage::Gray(img) => img.dimensions(),
        }
    }
}

/// Black-box decoder: path in, pixel array out.
///
/// Implementations run on worker threads.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ViewerError>;
}

/// Extensions decoded with OpenJPEG instead of the `image` crate
pub const JPEG2000_EXTENSIONS: &[&str] = &["jp2", "j2k", "j2c", "jpx", "jpf"];

/// Whether `path` has a JPEG 2000 extension (case-insensitive)
pub fn is_jpeg2000(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| JPEG2000_EXTENSIONS.iter().any(|j| e.eq_ignore_ascii_case(j)))
        .unwrap_or(false)
}

/// Default decoder: JPEG 2000 via `jpeg2k`, other formats via the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ViewerError> {
        debug!("Decoding: {}", path.display());
        let img = if is_jpeg2000(path) {
            decode_jpeg2000(path)?
        } else {
            image::open(path)?
        };
        classify(img)
    }
}

fn decode_jpeg2000(path: &Path) -> Result<DynamicImage, ViewerError> {
    let jp2 = jpeg2k::Image::from_file(path)
        .map_err(|e| ViewerError::Image(format!("{}: {}", path.display(), e)))?;
    let img: DynamicImage = (&jp2)
        .try_into()
        .map_err(|e| ViewerError::Image(format!("{}: {}", path.display(), e)))?;
    Ok(img)
}

/// Sort a decoded `DynamicImage` into one of the supported layouts.
pub fn classify(img: DynamicImage) -> Result<DecodedImage, ViewerError> {
    match img {
        DynamicImage::ImageRgb8(buf) => Ok(DecodedImage::Rgb8(buf)),
        DynamicImage::ImageRgba8(_) => Ok(DecodedImage::Rgb8(img.to_rgb8())),
        DynamicImage::ImageLuma8(buf) => Ok(DecodedImage::Gray(buf)),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            Ok(DecodedImage::Gray(img.to_luma8()))
        }
        // Linear widening: rescaling by the peak later cancels the u16 -> [0,1] factor
        DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => Ok(DecodedImage::RgbHigh(img.to_rgb32f())),
        other => Err(ViewerError::UnsupportedLayout(format!("{:?}", other.color()))),
    }
}

/// Convert any supported layout to packed RGB8.
pub fn normalize(image: DecodedImage) -> RgbImage {
    match image {
        DecodedImage::Rgb8(img) => img,
        DecodedImage::RgbHigh(img) => {
            let peak = img
                .as_raw()
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0f32, f32::max);

            // All-black (or all-NaN) input: nothing to scale against
            if peak <= 0.0 {
                return RgbImage::new(img.width(), img.height());
            }

            ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
                let p = img.get_pixel(x, y);
                Rgb(p.0.map(|v| (v / peak * 255.0).clamp(0.0, 255.0) as u8))
            })
        }
        DecodedImage::Gray(img) => DynamicImage::ImageLuma8(img).to_rgb8(),
    }
}

/// Size that fits `(width, height)` inside `bounds`, preserving aspect ratio.
///
/// Never upscales: images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if width <= max_w && height <= max_h {
        return (width, height);
    }

    let scale = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Downscale to fit `bounds` (no-op when it already fits)
pub fn thumbnail(img: RgbImage, bounds: (u32, u32)) -> RgbImage {
    let (w, h) = fit_within(img.width(), img.height(), bounds);
    if (w, h) == img.dimensions() {
        img
    } else {
        image::imageops::resize(&img, w, h, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    /// Test: 8-bit RGB passthrough
    /// Validates: bytes untouched
    #[test]
    fn test_normalize_rgb8_passthrough() {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 200]));
        let out = normalize(DecodedImage::Rgb8(img.clone()));
        assert_eq!(out, img);
    }

    /// Test: High-bit-depth rescale
    /// Validates: per-image peak maps to 255, proportional values truncate
    #[test]
    fn test_normalize_high_bit_scales_by_peak() {
        let img: Rgb32FImage = ImageBuffer::from_raw(2, 1, vec![0.0, 1000.0, 4000.0, 2000.0, 3000.0, 500.0]).unwrap();
        let out = normalize(DecodedImage::RgbHigh(img));

        assert_eq!(out.get_pixel(0, 0).0, [0, 63, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [127, 191, 31]);
    }

    /// Test: Peak-relative scale is image-dependent
    /// Validates: same sample value maps differently under different peaks
    #[test]
    fn test_normalize_scale_differs_per_image() {
        let dim: Rgb32FImage = ImageBuffer::from_raw(1, 1, vec![100.0, 100.0, 100.0]).unwrap();
        let bright: Rgb32FImage = ImageBuffer::from_raw(2, 1, vec![100.0, 100.0, 100.0, 200.0, 200.0, 200.0]).unwrap();

        assert_eq!(normalize(DecodedImage::RgbHigh(dim)).get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(normalize(DecodedImage::RgbHigh(bright)).get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_normalize_high_bit_all_zero() {
        let img: Rgb32FImage = ImageBuffer::from_raw(1, 1, vec![0.0, 0.0, 0.0]).unwrap();
        let out = normalize(DecodedImage::RgbHigh(img));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }

    /// Test: Grayscale expansion
    /// Validates: luma replicated into R, G, B
    #[test]
    fn test_normalize_gray() {
        let img: GrayImage = ImageBuffer::from_fn(2, 1, |x, _| Luma([if x == 0 { 10 } else { 240 }]));
        let out = normalize(DecodedImage::Gray(img));

        assert_eq!(out.get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(out.get_pixel(1, 0).0, [240, 240, 240]);
    }

    /// Test: classify 16-bit RGBA
    /// Validates: routed to RgbHigh, alpha dropped, relative magnitudes kept
    #[test]
    fn test_classify_rgba16() {
        let img: ImageBuffer<image::Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_raw(1, 1, vec![4096, 2048, 0, 65535]).unwrap();
        let decoded = classify(DynamicImage::ImageRgba16(img)).unwrap();

        assert!(matches!(decoded, DecodedImage::RgbHigh(_)));
        let out = normalize(decoded);
        assert_eq!(out.get_pixel(0, 0).0, [255, 127, 0]);
    }

    #[test]
    fn test_classify_rgba8_drops_alpha() {
        let img = image::RgbaImage::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
        match classify(DynamicImage::ImageRgba8(img)).unwrap() {
            DecodedImage::Rgb8(rgb) => assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]),
            other => panic!("Wrong variant: {:?}", other.dimensions()),
        }
    }

    /// Test: Thumbnail box fitting
    /// Validates: aspect preserved, no upscaling
    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(1280, 960, (640, 480)), (640, 480));
        assert_eq!(fit_within(1920, 1080, (640, 480)), (640, 360));
        assert_eq!(fit_within(1000, 2000, (640, 480)), (240, 480));
        assert_eq!(fit_within(320, 240, (640, 480)), (320, 240));
        assert_eq!(fit_within(5000, 1, (640, 480)), (640, 1));
    }

    #[test]
    fn test_thumbnail_downscales() {
        let img = RgbImage::from_pixel(100, 50, Rgb([9, 9, 9]));
        let thumb = thumbnail(img, (20, 20));

        assert_eq!(thumb.dimensions(), (20, 10));
        assert_eq!(thumb.get_pixel(5, 5).0, [9, 9, 9]);
    }

    /// Test: Decode real files
    /// Validates: 8-bit PNG -> Rgb8, 16-bit PNG -> RgbHigh, missing file -> error
    #[test]
    fn test_image_decoder_files() {
        let dir = tempfile::tempdir().unwrap();

        let p8 = dir.path().join("a.png");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&p8).unwrap();
        assert!(matches!(ImageDecoder.decode(&p8).unwrap(), DecodedImage::Rgb8(_)));

        let p16 = dir.path().join("b.png");
        let img16: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_pixel(4, 4, Rgb([1000, 500, 0]));
        img16.save(&p16).unwrap();
        let decoded = ImageDecoder.decode(&p16).unwrap();
        assert!(matches!(decoded, DecodedImage::RgbHigh(_)));
        assert_eq!(normalize(decoded).get_pixel(0, 0).0, [255, 127, 0]);

        let missing = dir.path().join("missing.png");
        assert!(matches!(ImageDecoder.decode(&missing), Err(ViewerError::Image(_))));
    }

    /// 4x4 8-bit grayscale JP2: reversible 5/3, no decomposition levels,
    /// a single empty packet (every coefficient zero).
    const GRAY_4X4_JP2: &[u8] = &[
        0x00, 0x00, 0x00, 0x0c, 0x6a, 0x50, 0x20, 0x20, 0x0d, 0x0a, 0x87, 0x0a,
        0x00, 0x00, 0x00, 0x14, 0x66, 0x74, 0x79, 0x70, 0x6a, 0x70, 0x32, 0x20,
        0x00, 0x00, 0x00, 0x00, 0x6a, 0x70, 0x32, 0x20, 0x00, 0x00, 0x00, 0x2d,
        0x6a, 0x70, 0x32, 0x68, 0x00, 0x00, 0x00, 0x16, 0x69, 0x68, 0x64, 0x72,
        0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x07, 0x07,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x0f, 0x63, 0x6f, 0x6c, 0x72, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0x5a, 0x6a, 0x70, 0x32,
        0x63, 0xff, 0x4f, 0xff, 0x51, 0x00, 0x29, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x07, 0x01, 0x01, 0xff, 0x52,
        0x00, 0x0c, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x04, 0x04, 0x00, 0x01,
        0xff, 0x5c, 0x00, 0x04, 0x40, 0x40, 0xff, 0x90, 0x00, 0x0a, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x0f, 0x00, 0x01, 0xff, 0x93, 0x00, 0xff, 0xd9,
    ];

    #[test]
    fn test_is_jpeg2000() {
        assert!(is_jpeg2000(Path::new("frames/0001.jp2")));
        assert!(is_jpeg2000(Path::new("0001.J2K")));
        assert!(!is_jpeg2000(Path::new("0001.png")));
        assert!(!is_jpeg2000(Path::new("jp2")));
    }

    /// Test: Decode a JPEG 2000 file
    /// Validates: .jp2 routed to OpenJPEG, gray output classified and expanded to RGB
    #[test]
    fn test_image_decoder_jp2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001.jp2");
        std::fs::write(&path, GRAY_4X4_JP2).unwrap();

        let decoded = ImageDecoder.decode(&path).unwrap();
        assert!(matches!(decoded, DecodedImage::Gray(_)));
        assert_eq!(decoded.dimensions(), (4, 4));

        let rgb = normalize(decoded);
        let first = rgb.get_pixel(0, 0).0;
        assert_eq!(first[0], first[1]);
        assert!(rgb.pixels().all(|p| p.0 == first));
    }

    /// Test: Corrupt JPEG 2000 file
    /// Validates: decode error instead of panic
    #[test]
    fn test_image_decoder_jp2_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0002.jp2");
        std::fs::write(&path, &GRAY_4X4_JP2[..40]).unwrap();

        assert!(matches!(ImageDecoder.decode(&path), Err(ViewerError::Image(_))));
    }
}
