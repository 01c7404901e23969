//! Frame input and configuration.
//!
//! The camera or video demuxer is an external collaborator; it hands raw
//! luminance frames across the [`FrameQueue`] boundary and the parsed
//! [`BarcodeConfig`] at startup. The mock transmitter stands in for the
//! whole transmit side during tests.

mod config;
mod frame;
mod mock;
mod queue;

pub use config::{BarcodeConfig, BarcodeGeometry, ConfigError};
pub use frame::Frame;
pub use mock::{MockError, MockTransmitter};
pub use queue::{FrameQueue, DEFAULT_QUEUE_CAPACITY};
