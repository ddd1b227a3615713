//! Still-image encoding and `data:` URL helpers.
//!
//! PNG and WebP are lossless and keep alpha. JPEG drops alpha and honours
//! the quality hint, defaulting to the usual browser quality of 0.92.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::models::config::ScreenshotFormat;
use crate::models::error::WebcamError;

/// JPEG quality used when no hint is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Map a `0.0..=1.0` quality hint onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(hint: Option<f32>) -> u8 {
    match hint {
        Some(q) if (0.0..=1.0).contains(&q) => ((q * 100.0).round() as u8).max(1),
        _ => DEFAULT_JPEG_QUALITY,
    }
}

/// Encode an RGBA frame in `format`.
pub fn encode_frame(
    frame: &RgbaImage,
    format: ScreenshotFormat,
    quality: Option<f32>,
) -> Result<Vec<u8>, WebcamError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(WebcamError::EncodingFailed("frame is empty".into()));
    }

    let mut bytes = Vec::new();
    match format {
        ScreenshotFormat::Png => {
            frame.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        }
        ScreenshotFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(frame.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality)).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ScreenshotFormat::Webp => {
            WebPEncoder::new_lossless(&mut bytes).write_image(
                frame.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
    }
    Ok(bytes)
}

/// Wrap encoded bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Encode `frame` and return it as a data URL.
pub fn encode_data_url(
    frame: &RgbaImage,
    format: ScreenshotFormat,
    quality: Option<f32>,
) -> Result<String, WebcamError> {
    let bytes = encode_frame(frame, format, quality)?;
    Ok(to_data_url(format.mime_type(), &bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), WebcamError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| WebcamError::EncodingFailed("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| WebcamError::EncodingFailed("data URL has no payload".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| WebcamError::EncodingFailed("data URL is not base64".into()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| WebcamError::EncodingFailed(format!("invalid base64 payload: {}", e)))?;
    Ok((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
        })
    }

    #[test]
    fn each_format_carries_its_mime_type_and_magic() {
        let frame = gradient(32, 24);
        for format in ScreenshotFormat::ALL {
            let url = encode_data_url(&frame, format, None).unwrap();
            let (mime, bytes) = parse_data_url(&url).unwrap();
            assert_eq!(mime, format.mime_type());
            assert_eq!(image::guess_format(&bytes).unwrap(), format.image_format());
        }
    }

    #[test]
    fn png_is_lossless() {
        let frame = gradient(16, 16);
        let bytes = encode_frame(&frame, ScreenshotFormat::Png, None).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn jpeg_quality_hint_changes_output_size() {
        let frame = gradient(64, 64);
        let low = encode_frame(&frame, ScreenshotFormat::Jpeg, Some(0.1)).unwrap();
        let high = encode_frame(&frame, ScreenshotFormat::Jpeg, Some(1.0)).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn quality_mapping() {
        assert_eq!(jpeg_quality(None), DEFAULT_JPEG_QUALITY);
        assert_eq!(jpeg_quality(Some(0.5)), 50);
        assert_eq!(jpeg_quality(Some(0.0)), 1);
        assert_eq!(jpeg_quality(Some(2.0)), DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn rejects_malformed_data_urls() {
        assert!(parse_data_url("http://example.com/a.png").is_err());
        assert!(parse_data_url("data:image/png;base64").is_err());
        assert!(parse_data_url("data:text/plain,hello").is_err());
        assert!(parse_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn empty_frame_is_an_error() {
        let frame = RgbaImage::new(0, 0);
        assert!(encode_frame(&frame, ScreenshotFormat::Png, None).is_err());
    }
}
