//! Cross-frame fountain decoding.
//!
//! Per-frame payloads are rateless RaptorQ encoding symbols: any
//! sufficiently large subset reconstructs the transmitted file, which is
//! the whole recovery strategy for dropped frames.

mod decoder;
mod packet;

pub use decoder::{FountainDecoder, SourceBlockState};
pub use packet::{EncodingPacket, PacketError, PACKET_HEADER_BYTES};
