//! Per-frame symbol decoding: header checksum and Reed-Solomon.

mod galois;
mod header;
mod reed_solomon;

pub use galois::{GaloisField, DATA_MATRIX_PRIMITIVE};
pub use header::{crc8, HeaderError, HeaderRecord, HEADER_BYTES};
pub use reed_solomon::{ReedSolomon, RsError};
