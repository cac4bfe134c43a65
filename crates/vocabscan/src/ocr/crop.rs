//! Horizontal band cropping for escalation passes.

use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::core::config::Band;
use crate::{Result, VocabError};

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| VocabError::image_processing(format!("Failed to read image format: {}", e)))?;

    reader
        .decode()
        .map_err(|e| VocabError::image_processing_with_source("Failed to decode image", e))
}

/// Width and height of an encoded image.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let image = decode(bytes)?;
    Ok((image.width(), image.height()))
}

/// Pixel rows `[y0, y1)` covered by `band` in an image of `height` rows.
///
/// Fractions are clamped to `[0, 1]` and rounded to the nearest row; the band is
/// always at least one row tall.
pub fn band_rows(band: Band, height: u32) -> (u32, u32) {
    let h = height.max(1);
    let to_row = |fraction: f64| (fraction.clamp(0.0, 1.0) * f64::from(h)).round() as u32;
    let y0 = to_row(band.top).min(h - 1);
    let y1 = to_row(band.bottom).clamp(y0 + 1, h);
    (y0, y1)
}

/// Crop a full-width horizontal band and re-encode it as PNG.
pub fn crop_band(bytes: &[u8], band: Band) -> Result<Vec<u8>> {
    let image = decode(bytes)?;
    let (y0, y1) = band_rows(band, image.height());
    let cropped = image.crop_imm(0, y0, image.width(), y1 - y0);

    let mut out: Vec<u8> = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| VocabError::image_processing_with_source("Failed to encode cropped band", e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img: RgbImage = ImageBuffer::from_fn(width, height, |_x, y| Rgb([(y / 4) as u8, 0, 0]));
        let mut bytes: Vec<u8> = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_band_rows() {
        assert_eq!(band_rows(Band::new(0.0, 0.52), 1000), (0, 520));
        assert_eq!(band_rows(Band::new(0.48, 1.0), 1000), (480, 1000));
        assert_eq!(band_rows(Band::new(0.32, 0.68), 1000), (320, 680));
        assert_eq!(band_rows(Band::new(-0.5, 2.0), 10), (0, 10));
        assert_eq!(band_rows(Band::new(1.0, 1.0), 10), (9, 10));
    }

    #[test]
    fn test_crop_band_keeps_width_and_offsets() {
        let bytes = create_test_image(40, 1000, ImageFormat::Png);
        let cropped = crop_band(&bytes, Band::new(0.48, 1.0)).unwrap();
        let decoded = image::load_from_memory(&cropped).unwrap().to_rgb8();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 520);
        assert_eq!(decoded.get_pixel(0, 0)[0], 120);
    }

    #[test]
    fn test_crop_accepts_jpeg() {
        let bytes = create_test_image(32, 64, ImageFormat::Jpeg);
        let cropped = crop_band(&bytes, Band::new(0.0, 0.5)).unwrap();
        assert_eq!(image_dimensions(&cropped).unwrap(), (32, 32));
    }

    #[test]
    fn test_invalid_bytes() {
        let err = crop_band(b"not an image", Band::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, VocabError::ImageProcessing { .. }));
    }
}
