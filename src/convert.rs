//! Frame conversion from capture layout to display pixels.
//!
//! A captured [`Frame`] goes through three steps before it is composited:
//! decode into RGB, nearest-neighbor resize to the quadrant size, and the
//! orientation correction between capture and display axes.

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};

use crate::traits::{CameraError, FourCC, Frame, Result};

/// How captured pixels map onto display columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Orientation {
    /// Flipped left-to-right, like looking into a mirror.
    #[default]
    Mirrored,
    /// Columns kept in capture order.
    Natural,
}

/// Decode a frame, scale it to `width`x`height` and orient it for display.
pub fn prepare(frame: &Frame, width: u32, height: u32, orientation: Orientation) -> Result<RgbImage> {
    let rgb = to_rgb(frame)?;
    Ok(orient(&scale(&rgb, width, height), orientation))
}

/// Decode a frame into RGB, whatever its native color order.
pub fn to_rgb(frame: &Frame) -> Result<RgbImage> {
    let format = &frame.format;
    match format.fourcc {
        FourCC::YUYV => yuyv_to_rgb(&frame.data, format.width, format.height, format.stride),
        FourCC::RGB3 => packed_to_rgb(&frame.data, format.width, format.height, format.stride, false),
        FourCC::BGR3 => packed_to_rgb(&frame.data, format.width, format.height, format.stride, true),
        FourCC::MJPG => image::load_from_memory_with_format(&frame.data, ImageFormat::Jpeg)
            .map(image::DynamicImage::into_rgb8)
            .map_err(|err| CameraError::Decode(err.to_string())),
        other => Err(CameraError::FormatNotSupported(other)),
    }
}

/// Whether [`to_rgb`] can decode frames in `fourcc`.
#[must_use]
pub fn is_decodable(fourcc: FourCC) -> bool {
    [FourCC::YUYV, FourCC::RGB3, FourCC::BGR3, FourCC::MJPG].contains(&fourcc)
}

/// Nearest-neighbor resize. Pixels are duplicated or dropped, never blended.
#[must_use]
pub fn scale(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Nearest)
}

/// Map capture axes onto display axes.
///
/// With [`Orientation::Mirrored`] the source pixel at column `x` of row `y`
/// lands at display column `width - 1 - x` of the same row.
#[must_use]
pub fn orient(image: &RgbImage, orientation: Orientation) -> RgbImage {
    match orientation {
        Orientation::Mirrored => imageops::flip_horizontal(image),
        Orientation::Natural => image.clone(),
    }
}

/// Pack an RGB pixel into the surface's native `0x00RRGGBB` word.
#[must_use]
pub fn pack_0rgb(Rgb([r, g, b]): Rgb<u8>) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

fn row_stride(stride: u32, width: u32, bytes_per_pixel: u32) -> usize {
    let stride = if stride == 0 { width * bytes_per_pixel } else { stride };
    stride as usize
}

fn short_buffer(len: usize, width: u32, height: u32, fourcc: FourCC) -> CameraError {
    CameraError::Decode(format!(
        "{fourcc} frame of {len} bytes is too short for {width}x{height}"
    ))
}

fn yuyv_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Result<RgbImage> {
    let stride = row_stride(stride, width, 2);
    let mut image = RgbImage::new(width, height);

    for (y, row) in image.rows_mut().enumerate() {
        let line = data
            .get(y * stride..)
            .and_then(|rest| rest.get(..width as usize * 2))
            .ok_or_else(|| short_buffer(data.len(), width, height, FourCC::YUYV))?;

        // YUYV format: [Y0 U Y1 V] repeats, each pair shares U and V
        let mut pixels = row;
        for quad in line.chunks(4) {
            let [y0, u, y1, v] = match *quad {
                [y0, u, y1, v] => [y0, u, y1, v],
                // Odd widths end on a lone [Y U] half-pair.
                [y0, u] => [y0, u, y0, 128],
                _ => break,
            };
            for luma in [y0, y1] {
                match pixels.next() {
                    Some(pixel) => *pixel = Rgb(yuv_to_rgb(luma, u, v)),
                    None => break,
                }
            }
        }
    }

    Ok(image)
}

fn packed_to_rgb(data: &[u8], width: u32, height: u32, stride: u32, bgr: bool) -> Result<RgbImage> {
    let fourcc = if bgr { FourCC::BGR3 } else { FourCC::RGB3 };
    let stride = row_stride(stride, width, 3);
    let mut image = RgbImage::new(width, height);

    for (y, row) in image.rows_mut().enumerate() {
        let line = data
            .get(y * stride..)
            .and_then(|rest| rest.get(..width as usize * 3))
            .ok_or_else(|| short_buffer(data.len(), width, height, fourcc))?;

        for (pixel, src) in row.zip(line.chunks_exact(3)) {
            if let [a, g, c] = *src {
                *pixel = if bgr { Rgb([c, g, a]) } else { Rgb([a, g, c]) };
            }
        }
    }

    Ok(image)
}

/// Convert YUV values to RGB.
///
/// Uses the ITU-R BT.601 conversion formula.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub(crate) fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y_f = f32::from(y);
    let u_f = f32::from(u) - 128.0;
    let v_f = f32::from(v) - 128.0;

    let r = 1.402f32.mul_add(v_f, y_f);
    let g = 0.714_14f32.mul_add(-v_f, 0.344_14f32.mul_add(-u_f, y_f));
    let b = 1.772f32.mul_add(u_f, y_f);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamp = |val: f32| -> u8 { val.clamp(0.0, 255.0) as u8 };

    [clamp(r), clamp(g), clamp(b)]
}
