//! The receive pipeline: frame loop, progress reporting, verification.

mod driver;
mod progress;
mod verify;

pub use driver::{DecodeSummary, DriverError, PipelineDriver};
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use verify::sha1_hex;
