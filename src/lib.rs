//! Screen-to-Camera Transfer Receiver
//!
//! Converts a stream of captured video frames, each showing a single
//! two-dimensional black/white barcode, back into the transmitted file
//! bytes.
//!
//! # Architecture
//!
//! The pipeline walks each frame through four stages:
//!
//! ```text
//! capture → binarize → geometry → codec
//!                                   ↓
//!                     fountain ← pipeline driver
//! ```
//!
//! - **capture**: raw luminance frames cross a bounded queue from the
//!   external demuxer; configuration arrives as a parsed JSON document.
//! - **binarize**: a per-frame global threshold and the four corners of
//!   the barcode quadrilateral.
//! - **geometry**: a projective quad-to-quad transform samples logical
//!   cells despite skew, rotation, and keystone distortion.
//! - **codec**: header CRC-8 check, then Reed-Solomon error correction
//!   over GF(2^8).
//! - **fountain**: recovered payloads accumulate as RaptorQ encoding
//!   symbols until the file is reconstructable, verified by SHA-1.
//!
//! Frames that fail any stage are dropped silently; the fountain code is
//! the recovery strategy.
//!
//! # Example
//!
//! ```no_run
//! use screenbeam::{
//!     capture::{BarcodeGeometry, FrameQueue, MockTransmitter},
//!     pipeline::{NullProgress, PipelineDriver},
//! };
//!
//! let geometry = BarcodeGeometry::default();
//! let payload = b"hello across the air gap".to_vec();
//! let mut transmitter = MockTransmitter::new(&payload, geometry, 4).unwrap();
//!
//! let queue = FrameQueue::new(64);
//! for _ in 0..transmitter.frame_count() {
//!     queue.push(transmitter.next_frame());
//! }
//! queue.close();
//!
//! let driver = PipelineDriver::new(geometry, "received.bin");
//! let summary = driver
//!     .run(&queue, &mut NullProgress, |bytes, name| {
//!         std::fs::write(name, bytes).unwrap();
//!     })
//!     .unwrap();
//! println!("SHA-1 {}", summary.sha1_hex);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod binarize;
pub mod capture;
pub mod codec;
pub mod fountain;
pub mod geometry;
pub mod pipeline;

// Re-export commonly used types at crate root
pub use binarize::{BinaryMatrix, LocateError};
pub use capture::{BarcodeConfig, BarcodeGeometry, Frame, FrameQueue, MockTransmitter};
pub use codec::{HeaderRecord, ReedSolomon};
pub use fountain::{EncodingPacket, FountainDecoder};
pub use geometry::{GridSampler, PerspectiveTransform};
pub use pipeline::{DecodeSummary, DriverError, PipelineDriver, ProgressObserver};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
