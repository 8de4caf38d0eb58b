//! Validation utilities for converted frames and composited output.
//!
//! These check that decoded frames contain expected test patterns and that
//! the composited canvas shows bordered feeds where the layout puts them.
//! Useful for integration testing with virtual cameras.

use image::RgbImage;

use crate::canvas::{Canvas, RED};
use crate::layout::Quadrant;
use crate::traits::{CameraError, Frame, Result};
use crate::viewer::BORDER_THICKNESS;

/// Expected RGB values for SMPTE color bars (8 bars).
///
/// Colors in order: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
const SMPTE_COLOR_BARS: [(u8, u8, u8); 8] = [
    (235, 235, 235), // White
    (235, 235, 11),  // Yellow
    (12, 236, 237),  // Cyan
    (13, 237, 13),   // Green
    (237, 13, 237),  // Magenta
    (238, 14, 13),   // Red
    (15, 15, 239),   // Blue
    (16, 16, 16),    // Black
];

/// Tolerance for RGB color matching (accounts for YUV->RGB conversion errors).
const COLOR_TOLERANCE: i32 = 15;

fn mismatch(msg: String) -> CameraError {
    CameraError::StreamError(msg)
}

/// Validates that a decoded image contains the SMPTE color bar pattern,
/// left to right.
///
/// Samples the center of each of the 8 vertical stripes.
pub fn validate_color_bars(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let bar_width = width / 8;
    let center_y = height / 2;

    for (bar_idx, expected_rgb) in SMPTE_COLOR_BARS.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let sample_x = (bar_idx as u32 * bar_width) + (bar_width / 2);

        let [r, g, b] = image
            .get_pixel_checked(sample_x, center_y)
            .ok_or_else(|| mismatch(format!("Failed to get pixel at ({sample_x}, {center_y})")))?
            .0;

        if !colors_match((r, g, b), *expected_rgb, COLOR_TOLERANCE) {
            return Err(mismatch(format!(
                "Color bar {bar_idx} mismatch at ({sample_x}, {center_y}): \
                 expected RGB{expected_rgb:?}, got RGB{:?}",
                (r, g, b)
            )));
        }
    }

    Ok(())
}

/// Validates that a decoded image contains a left-to-right luminance ramp.
///
/// Luminance along the center row must not decrease and must change by a
/// significant amount across the frame.
pub fn validate_gradient(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let center_y = height / 2;

    let mut first_luminance: Option<f32> = None;
    let mut prev_luminance: Option<f32> = None;

    for x in (0..width).step_by(10) {
        let [r, g, b] = image
            .get_pixel_checked(x, center_y)
            .ok_or_else(|| mismatch(format!("Failed to get pixel at ({x}, {center_y})")))?
            .0;

        // Luminance (Y' in Rec. 601)
        let luminance = 0.114f32.mul_add(
            f32::from(b),
            0.587f32.mul_add(f32::from(g), 0.299 * f32::from(r)),
        );

        if let Some(prev) = prev_luminance {
            if luminance < prev - 1.0 {
                return Err(mismatch(format!(
                    "Gradient not monotonically increasing at x={x}: \
                     luminance {luminance} < previous {prev}"
                )));
            }
        }

        first_luminance.get_or_insert(luminance);
        prev_luminance = Some(luminance);
    }

    if let (Some(first), Some(last)) = (first_luminance, prev_luminance) {
        let change = last - first;
        if change < 50.0 {
            return Err(mismatch(format!(
                "Insufficient luminance change for gradient: {change} (expected at least 50.0)"
            )));
        }
    }

    Ok(())
}

/// Validates that frame sequence numbers increment by 1 with no gaps.
pub fn validate_frame_sequence(frames: &[Frame]) -> Result<()> {
    if frames.is_empty() {
        return Err(mismatch("Cannot validate empty frame sequence".to_owned()));
    }

    for (i, pair) in frames.windows(2).enumerate() {
        if let [prev, curr] = pair {
            let expected = prev.metadata.sequence + 1;
            if curr.metadata.sequence != expected {
                return Err(mismatch(format!(
                    "Frame sequence gap at index {}: expected {expected}, got {}",
                    i + 1,
                    curr.metadata.sequence
                )));
            }
        }
    }

    Ok(())
}

/// Validates that `quadrant` on `canvas` is framed by the red feed border.
///
/// Checks every pixel of the border band along all four edges.
pub fn validate_bordered_feed(canvas: &Canvas, quadrant: Quadrant) -> Result<()> {
    let Quadrant {
        x,
        y,
        width,
        height,
    } = quadrant;
    if quadrant.is_empty() {
        return Err(mismatch(format!("Quadrant {quadrant:?} is empty")));
    }

    let t = BORDER_THICKNESS.min(width).min(height);
    let horizontal = (x..x + width).flat_map(|px| {
        (0..t).flat_map(move |d| [(px, y + d), (px, y + height - 1 - d)])
    });
    let vertical = (y..y + height).flat_map(|py| {
        (0..t).flat_map(move |d| [(x + d, py), (x + width - 1 - d, py)])
    });

    for (px, py) in horizontal.chain(vertical) {
        let Some(pixel) = canvas.pixel(px, py) else {
            return Err(mismatch(format!("Border pixel ({px}, {py}) is off canvas")));
        };
        if pixel != RED {
            return Err(mismatch(format!(
                "Border pixel ({px}, {py}) is {pixel:#08x}, expected {RED:#08x}"
            )));
        }
    }

    Ok(())
}

/// Helper function to check if two RGB colors match within a tolerance.
fn colors_match(actual: (u8, u8, u8), expected: (u8, u8, u8), tolerance: i32) -> bool {
    let (ar, ag, ab) = actual;
    let (er, eg, eb) = expected;

    let r_diff = i32::from(ar).abs_diff(i32::from(er));
    let g_diff = i32::from(ag).abs_diff(i32::from(eg));
    let b_diff = i32::from(ab).abs_diff(i32::from(eb));

    #[allow(clippy::cast_sign_loss)]
    let tol = tolerance as u32;

    r_diff <= tol && g_diff <= tol && b_diff <= tol
}
