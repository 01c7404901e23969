//! Frame binarization and barcode localization.
//!
//! Converts a raw luminance frame into a thresholded binary view and
//! locates the four corners of the displayed barcode. Both steps are
//! per-frame: a failure here simply drops the frame, the fountain code
//! recovers the lost symbol from a later one.

mod border;
mod matrix;

pub use matrix::BinaryMatrix;

/// Localization errors. Recoverable by dropping the frame.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocateError {
    /// Luminance histogram is effectively unimodal; no black/white split.
    #[error("threshold unresolvable: histogram peaks at {first_peak} and {second_peak}")]
    ThresholdUnresolvable {
        /// Dominant histogram bin.
        first_peak: u8,
        /// Best-scoring second mode.
        second_peak: u8,
    },
    /// Fewer than four barcode corners could be isolated.
    #[error("barcode border not found: {0}")]
    BorderNotFound(&'static str),
    /// Pixel buffer does not match the declared frame dimensions.
    #[error("frame pixel buffer of {got} bytes does not match {width}x{height}")]
    InvalidFrame {
        /// Actual buffer length.
        got: usize,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}
