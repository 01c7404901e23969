//! Perspective correction and logical grid sampling.
//!
//! Maps the barcode's logical cell coordinates through a projective
//! transform onto frame pixels, tolerating the skew, rotation, and
//! keystone distortion a handheld camera introduces.

mod perspective;
mod sampler;

pub use perspective::PerspectiveTransform;
pub use sampler::{BitGrid, BlackWhiteStrategy, GridSampler, SampleStrategy, Zone};
