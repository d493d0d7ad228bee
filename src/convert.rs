//! Image format conversion.
//!
//! Decodes image bytes and re-encodes them as PNG, JPEG or WebP. Targets
//! without an alpha channel get transparent pixels composited onto white.

use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// JPEG quality used by `convert_image_format`.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Formats an image can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// PNG, lossless with alpha.
    Png,
    /// JPEG, no alpha.
    Jpeg,
    /// WebP (lossless encoder).
    WebP,
}

impl TargetFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::WebP => "webp",
        }
    }

    /// MIME type.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::WebP => "image/webp",
        }
    }

    /// Whether the format stores transparency.
    #[must_use]
    pub fn supports_alpha(self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpg" | "jpeg" => Ok(TargetFormat::Jpeg),
            "webp" => Ok(TargetFormat::WebP),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Composite every pixel onto an opaque white background.
#[must_use]
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend = |c: u8| -> u8 {
            let value = (u16::from(c) * alpha + 255 * (255 - alpha)) / 255;
            u8::try_from(value).unwrap_or(u8::MAX)
        };
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    out
}

/// Decode `bytes` and re-encode them in `target`.
///
/// # Errors
///
/// Returns `Error::ImageError` when the bytes cannot be decoded or the
/// encoder fails.
pub fn convert_image_format(bytes: &[u8], target: TargetFormat) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let mut out = Cursor::new(Vec::new());

    match target {
        TargetFormat::Png => img.write_to(&mut out, ImageFormat::Png)?,
        TargetFormat::Jpeg => {
            let flat = DynamicImage::ImageRgb8(flatten_on_white(&img));
            flat.write_with_encoder(JpegEncoder::new_with_quality(&mut out, DEFAULT_JPEG_QUALITY))?;
        }
        TargetFormat::WebP => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut out, ImageFormat::WebP)?;
        }
    }

    let encoded = out.into_inner();
    debug!(
        from = bytes.len(),
        to = encoded.len(),
        format = target.extension(),
        "image converted"
    );
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_with_transparent_pixel() -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap_or_else(|e| panic!("{e}"));
        buf.into_inner()
    }

    #[test]
    fn test_parse_target_format() {
        assert_eq!("JPG".parse::<TargetFormat>().ok(), Some(TargetFormat::Jpeg));
        assert_eq!("webp".parse::<TargetFormat>().ok(), Some(TargetFormat::WebP));
        assert!(matches!("tiff".parse::<TargetFormat>(), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_flatten_on_white() {
        let img = image::load_from_memory(&png_with_transparent_pixel()).unwrap_or_else(|e| panic!("{e}"));
        let flat = flatten_on_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_convert_to_each_format() {
        let png = png_with_transparent_pixel();
        for (target, format) in [
            (TargetFormat::Png, ImageFormat::Png),
            (TargetFormat::Jpeg, ImageFormat::Jpeg),
            (TargetFormat::WebP, ImageFormat::WebP),
        ] {
            let out = convert_image_format(&png, target).unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(image::guess_format(&out).ok(), Some(format));
        }
    }

    #[test]
    fn test_undecodable_bytes_error() {
        assert!(matches!(
            convert_image_format(b"not an image", TargetFormat::Png),
            Err(Error::ImageError(_))
        ));
    }
}
