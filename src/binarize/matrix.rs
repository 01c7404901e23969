//! Binary matrix: a luminance plane with a per-frame global threshold.

use super::border;
use super::LocateError;
use crate::capture::Frame;

/// Histogram peaks closer than this many bins mean the image is
/// effectively unimodal and cannot be thresholded.
const MIN_PEAK_DISTANCE: i32 = 16;

/// A thresholded view over one frame's luminance plane.
///
/// Owns the pixel buffer for the duration of a single pipeline iteration.
/// The threshold and the detected corner coordinates are computed at
/// construction and never change afterwards.
pub struct BinaryMatrix {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    threshold: u8,
    corners: [i32; 8],
}

impl BinaryMatrix {
    /// Binarizes a frame and locates the barcode corners.
    ///
    /// Fails with [`LocateError::ThresholdUnresolvable`] when the central
    /// region histogram has no usable valley, and with
    /// [`LocateError::BorderNotFound`] when no convex quadrilateral can be
    /// isolated.
    pub fn from_frame(frame: Frame) -> Result<Self, LocateError> {
        let width = frame.width();
        let height = frame.height();
        if !frame.is_valid() || width == 0 || height == 0 {
            return Err(LocateError::InvalidFrame {
                got: frame.pixels().len(),
                width,
                height,
            });
        }
        let pixels = frame.into_pixels();
        let threshold = compute_threshold(&pixels, width, height)?;

        let mut matrix = Self {
            pixels,
            width,
            height,
            threshold,
            corners: [0; 8],
        };
        matrix.corners = border::find_borders(&matrix)?;
        tracing::trace!(
            threshold,
            corners = ?matrix.corners,
            "barcode localized"
        );
        Ok(matrix)
    }

    /// Returns the raw gray value at `(x, y)`, clamped to the image.
    #[inline]
    pub fn get_gray(&self, x: i32, y: i32) -> u8 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Returns the binarized value at `(x, y)`: 1 if brighter than the
    /// threshold, 0 otherwise.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        u8::from(self.get_gray(x, y) > self.threshold)
    }

    /// Returns true if the binarized pixel equals `value`.
    #[inline]
    pub fn pixel_equals(&self, x: i32, y: i32, value: u8) -> bool {
        self.get(x, y) == value
    }

    /// The global binarization threshold chosen for this frame.
    #[inline]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Detected corner coordinates, `(x, y)` pairs in TL, TR, BR, BL order.
    #[inline]
    pub fn corners(&self) -> &[i32; 8] {
        &self.corners
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Histogram-valley threshold over the central region of the frame.
///
/// Barcodes fill the middle of the frame, so only four scan rows at
/// heights h/5..4h/5 across the central 60% of columns contribute;
/// histogramming the full frame would be polluted by ambient pixels.
fn compute_threshold(pixels: &[u8], width: u32, height: u32) -> Result<u8, LocateError> {
    let w = width as usize;
    let h = height as usize;
    let mut buckets = [0u32; 256];

    for row_index in 1..5 {
        let row = h * row_index / 5;
        let right = w * 4 / 5;
        for column in w / 5..right {
            buckets[pixels[row * w + column] as usize] += 1;
        }
    }

    let mut first_peak = 0usize;
    let mut first_peak_size = 0u32;
    for (x, &count) in buckets.iter().enumerate() {
        if count > first_peak_size {
            first_peak = x;
            first_peak_size = count;
        }
    }

    let mut second_peak = 0usize;
    let mut second_peak_score = 0u64;
    for (x, &count) in buckets.iter().enumerate() {
        let distance = x as i64 - first_peak as i64;
        let score = count as u64 * (distance * distance) as u64;
        if score > second_peak_score {
            second_peak = x;
            second_peak_score = score;
        }
    }

    if first_peak > second_peak {
        std::mem::swap(&mut first_peak, &mut second_peak);
    }
    if (second_peak - first_peak) as i32 <= MIN_PEAK_DISTANCE {
        return Err(LocateError::ThresholdUnresolvable {
            first_peak: first_peak as u8,
            second_peak: second_peak as u8,
        });
    }

    // Valley score biases toward the darker peak while rewarding depth.
    let mut best_valley = 0usize;
    let mut best_valley_score = -1i64;
    for x in first_peak + 1..second_peak {
        let from_second = (second_peak - x) as i64;
        let score = (x - first_peak) as i64
            * from_second
            * from_second
            * (i64::from(first_peak_size) - i64::from(buckets[x]));
        if score > best_valley_score {
            best_valley = x;
            best_valley_score = score;
        }
    }

    Ok(best_valley as u8)
}
