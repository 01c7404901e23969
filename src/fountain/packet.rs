//! Fountain encoding packet wire format.
//!
//! Each successfully decoded frame carries one packet after the header:
//! a 1-byte source block number, a 3-byte big-endian encoding symbol ID,
//! then exactly one symbol of payload.

use raptorq::PayloadId;

/// Packet header size: source block number plus 24-bit symbol ID.
pub const PACKET_HEADER_BYTES: usize = 4;

/// One fountain encoding symbol with its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPacket {
    /// Source block this symbol belongs to.
    pub source_block: u8,
    /// Encoding symbol ID, 24 bits on the wire.
    pub symbol_id: u32,
    /// Symbol payload bytes.
    pub payload: Vec<u8>,
}

impl EncodingPacket {
    /// Parses a packet from its wire bytes.
    ///
    /// `symbol_size` and `source_blocks` come from the negotiated FEC
    /// parameters; anything that disagrees is malformed.
    pub fn parse(
        bytes: &[u8],
        symbol_size: usize,
        source_blocks: u8,
    ) -> Result<Self, PacketError> {
        if bytes.len() < PACKET_HEADER_BYTES {
            return Err(PacketError::Truncated(bytes.len()));
        }
        let (header, payload) = bytes.split_at(PACKET_HEADER_BYTES);
        if payload.len() != symbol_size {
            return Err(PacketError::SymbolLength {
                got: payload.len(),
                want: symbol_size,
            });
        }
        let source_block = header[0];
        if source_block >= source_blocks {
            return Err(PacketError::SourceBlock {
                got: source_block,
                limit: source_blocks,
            });
        }
        let symbol_id = u32::from_be_bytes([0, header[1], header[2], header[3]]);
        Ok(Self {
            source_block,
            symbol_id,
            payload: payload.to_vec(),
        })
    }

    /// Serializes to the wire layout (transmit side; mock and tests).
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PACKET_HEADER_BYTES + self.payload.len());
        bytes.push(self.source_block);
        bytes.push((self.symbol_id >> 16) as u8);
        bytes.push((self.symbol_id >> 8) as u8);
        bytes.push(self.symbol_id as u8);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Converts to the underlying RaptorQ packet type.
    pub(crate) fn into_raptorq(self) -> raptorq::EncodingPacket {
        raptorq::EncodingPacket::new(
            PayloadId::new(self.source_block, self.symbol_id),
            self.payload,
        )
    }
}

/// Packet parse failures. Recoverable by dropping the reading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketError {
    /// Fewer bytes than the packet header.
    #[error("packet truncated at {0} bytes")]
    Truncated(usize),
    /// Payload length disagrees with the negotiated symbol size.
    #[error("symbol of {got} bytes, expected {want}")]
    SymbolLength {
        /// Bytes carried.
        got: usize,
        /// Negotiated symbol size.
        want: usize,
    },
    /// Source block number beyond the negotiated block count.
    #[error("source block {got} out of range, {limit} blocks negotiated")]
    SourceBlock {
        /// Block number carried.
        got: u8,
        /// Negotiated block count.
        limit: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_parse_round_trip() {
        let packet = EncodingPacket {
            source_block: 2,
            symbol_id: 0x01_A2B3,
            payload: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };
        let wire = packet.serialize();
        assert_eq!(&wire[..4], &[2, 0x01, 0xA2, 0xB3]);

        let parsed = EncodingPacket::parse(&wire, 4, 4).unwrap();
        assert_eq!(parsed, packet);
    }

    #[test]
    fn test_truncated_packet() {
        assert!(matches!(
            EncodingPacket::parse(&[1, 2], 4, 1),
            Err(PacketError::Truncated(2))
        ));
    }

    #[test]
    fn test_symbol_length_mismatch() {
        let wire = [0u8, 0, 0, 1, 9, 9];
        assert!(matches!(
            EncodingPacket::parse(&wire, 4, 1),
            Err(PacketError::SymbolLength { got: 2, want: 4 })
        ));
    }

    #[test]
    fn test_source_block_out_of_range() {
        let wire = [3u8, 0, 0, 1, 9, 9];
        assert!(matches!(
            EncodingPacket::parse(&wire, 2, 2),
            Err(PacketError::SourceBlock { got: 3, limit: 2 })
        ));
    }
}
