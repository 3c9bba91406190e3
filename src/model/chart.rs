//! Waterfall chart rendering.
//!
//! Draws the per-column contributions as signed horizontal bars around a
//! zero axis (red pushes toward attrition, green away from it) and encodes
//! the result as PNG. No text labels: the dashboard pairs the image with
//! the contribution mapping it already receives.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to draw")]
    Empty,

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

const WIDTH: u32 = 640;
const ROW_HEIGHT: u32 = 22;
const MARGIN: u32 = 20;
const BAR_INSET: u32 = 4;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([96, 96, 96]);
const POSITIVE: Rgb<u8> = Rgb([214, 39, 40]);
const NEGATIVE: Rgb<u8> = Rgb([44, 160, 44]);

/// Render the contributions, one bar per transformed column in the given
/// order, and return the encoded PNG bytes.
pub fn render_waterfall(contributions: &[(String, f64)]) -> Result<Vec<u8>, ChartError> {
    if contributions.is_empty() {
        return Err(ChartError::Empty);
    }

    let rows = contributions.len() as u32;
    let height = 2 * MARGIN + rows * ROW_HEIGHT;
    let mut canvas = ImageBuffer::from_pixel(WIDTH, height, BACKGROUND);

    let max_abs = contributions
        .iter()
        .map(|(_, v)| v.abs())
        .fold(f64::MIN_POSITIVE, f64::max);
    let zero_x = WIDTH / 2;
    let scale = f64::from(zero_x - MARGIN - 1) / max_abs;

    for (i, (_, value)) in contributions.iter().enumerate() {
        let y0 = MARGIN + i as u32 * ROW_HEIGHT + BAR_INSET;
        let y1 = MARGIN + (i as u32 + 1) * ROW_HEIGHT - BAR_INSET;
        let extent = (value.abs() * scale).round() as u32;
        let (x0, x1, color) = if *value >= 0.0 {
            (zero_x, zero_x + extent, POSITIVE)
        } else {
            (zero_x - extent, zero_x, NEGATIVE)
        };
        fill_rect(&mut canvas, x0, y0, x1, y1, color);
    }

    // Zero axis on top of the bars.
    fill_rect(&mut canvas, zero_x, MARGIN / 2, zero_x + 1, height - MARGIN / 2, AXIS);

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn fill_rect(
    canvas: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    color: Rgb<u8>,
) {
    for y in y0..y1.min(canvas.height()) {
        for x in x0..x1.min(canvas.width()) {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_render_produces_png() {
        let contributions = vec![
            ("num__age".to_string(), 0.42),
            ("cat__genre_F".to_string(), -0.17),
            ("cat__genre_H".to_string(), 0.05),
        ];
        let png = render_waterfall(&contributions).unwrap();
        assert!(png.len() > PNG_MAGIC.len());
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_handles_all_zero_contributions() {
        let contributions = vec![("num__age".to_string(), 0.0)];
        let png = render_waterfall(&contributions).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_empty_is_an_error() {
        assert!(matches!(render_waterfall(&[]), Err(ChartError::Empty)));
    }
}
