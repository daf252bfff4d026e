use vo_core::{Frame, Image, PixelFormat, RawFrame};
use crate::error::{DetectError, DetectResult};

/// Rec.601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Image preprocessing ahead of detection
pub struct ImagePreprocessing;

impl ImagePreprocessing {
    /// Reduce a raw frame to a single luminance channel of the same dimensions
    pub fn to_luma(raw: &RawFrame) -> DetectResult<Frame> {
        if raw.width == 0 || raw.height == 0 {
            return Err(DetectError::InvalidImageSize { width: raw.width, height: raw.height });
        }
        let expected_len = raw.expected_len();
        if raw.pixels.len() != expected_len {
            return Err(DetectError::InvalidImageData {
                expected_len,
                actual_len: raw.pixels.len(),
            });
        }

        let luma = match raw.format {
            PixelFormat::Luma8 => raw.pixels.clone(),
            PixelFormat::Rgb8 => Self::interleaved_to_luma(&raw.pixels, 3),
            PixelFormat::Rgba8 => Self::interleaved_to_luma(&raw.pixels, 4),
        };

        Ok(Frame::new(raw.width, raw.height, luma, raw.timestamp))
    }

    /// Weighted sum of the first three channels, rounded; alpha is ignored
    pub fn interleaved_to_luma(pixels: &[u8], channels: usize) -> Image {
        pixels
            .chunks_exact(channels)
            .map(|px| Self::luma(px[0], px[1], px[2]))
            .collect()
    }

    #[inline]
    pub fn luma(r: u8, g: u8, b: u8) -> u8 {
        let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
        y.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_weights() {
        assert_eq!(ImagePreprocessing::luma(0, 0, 0), 0);
        assert_eq!(ImagePreprocessing::luma(255, 255, 255), 255);
        assert_eq!(ImagePreprocessing::luma(255, 0, 0), 76);
        assert_eq!(ImagePreprocessing::luma(0, 255, 0), 150);
        assert_eq!(ImagePreprocessing::luma(0, 0, 255), 29);
    }

    #[test]
    fn test_rgba_reduction_keeps_dimensions() {
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 0,
            0, 0, 255, 17, 10, 10, 10, 255,
        ];
        let raw = RawFrame::new(2, 2, PixelFormat::Rgba8, pixels, 1.5);
        let frame = ImagePreprocessing::to_luma(&raw).unwrap();
        assert_eq!((frame.width, frame.height), (2, 2));
        assert_eq!(frame.luma, vec![76, 150, 29, 10]);
        assert_eq!(frame.timestamp, 1.5);
    }

    #[test]
    fn test_rgb_and_luma_inputs() {
        let rgb = RawFrame::new(1, 2, PixelFormat::Rgb8, vec![200, 200, 200, 0, 0, 0], 0.0);
        assert_eq!(ImagePreprocessing::to_luma(&rgb).unwrap().luma, vec![200, 0]);

        let gray = RawFrame::new(2, 1, PixelFormat::Luma8, vec![7, 9], 0.0);
        assert_eq!(ImagePreprocessing::to_luma(&gray).unwrap().luma, vec![7, 9]);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let raw = RawFrame::new(4, 4, PixelFormat::Rgba8, vec![0; 10], 0.0);
        assert!(matches!(
            ImagePreprocessing::to_luma(&raw),
            Err(DetectError::InvalidImageData { expected_len: 64, actual_len: 10 })
        ));
        let empty = RawFrame::new(0, 4, PixelFormat::Luma8, vec![], 0.0);
        assert!(matches!(ImagePreprocessing::to_luma(&empty), Err(DetectError::InvalidImageSize { .. })));
    }
}
