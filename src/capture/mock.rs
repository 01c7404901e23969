//! Synthetic transmitter generating decodable barcode frames.
//!
//! Runs the real transmit path (fountain encoding, header, Reed-Solomon
//! parity, cell rendering) so the full receive pipeline can be exercised
//! without a camera. Not a camera model: frames come out flat,
//! axis-aligned, and noise-free.

use raptorq::{Encoder, ObjectTransmissionInformation};

use super::{BarcodeGeometry, Frame};
use crate::codec::{HeaderRecord, ReedSolomon, RsError};
use crate::fountain::EncodingPacket;

/// Luminance of a black cell.
const BLACK: u8 = 30;
/// Luminance of a white cell.
const WHITE: u8 = 210;

/// Mock transmitter errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MockError {
    /// Zero-byte files cannot be transmitted; the header reserves zero
    /// as "not yet available".
    #[error("cannot transmit an empty payload")]
    EmptyPayload,
    /// Payload length does not fit the 32-bit header field.
    #[error("payload of {0} bytes exceeds the header length field")]
    PayloadTooLarge(usize),
    /// Reed-Solomon encoding failed (geometry inconsistent).
    #[error(transparent)]
    Encode(#[from] RsError),
}

/// Generates one barcode frame per fountain packet, cycling forever.
pub struct MockTransmitter {
    geometry: BarcodeGeometry,
    contents: Vec<Vec<u8>>,
    next: usize,
    sequence: u64,
}

impl MockTransmitter {
    /// Rendered pixels per barcode cell.
    pub const CELL_SCALE: u32 = 8;
    /// White margin around the barcode, in pixels.
    pub const MARGIN: u32 = 32;

    /// Encodes `payload` into barcode content blocks.
    ///
    /// `repair_packets` extra symbols are generated per source block on
    /// top of the source symbols.
    pub fn new(
        payload: &[u8],
        geometry: BarcodeGeometry,
        repair_packets: u32,
    ) -> Result<Self, MockError> {
        if payload.is_empty() {
            return Err(MockError::EmptyPayload);
        }
        if u32::try_from(payload.len()).is_err() {
            return Err(MockError::PayloadTooLarge(payload.len()));
        }

        let oti = ObjectTransmissionInformation::new(
            payload.len() as u64,
            geometry.symbol_size() as u16,
            geometry.num_source_blocks as u8,
            1,
            1,
        );
        let encoder = Encoder::new(payload, oti);
        let codec = ReedSolomon::data_matrix();
        let header = HeaderRecord::encode(payload.len() as u32);

        let mut contents = Vec::new();
        for packet in encoder.get_encoded_packets(repair_packets) {
            let wire = EncodingPacket {
                source_block: packet.payload_id().source_block_number(),
                symbol_id: packet.payload_id().encoding_symbol_id(),
                payload: packet.data().to_vec(),
            }
            .serialize();

            let mut data = Vec::with_capacity(geometry.content_bytes());
            data.extend_from_slice(&header);
            data.extend_from_slice(&wire);
            contents.push(codec.encode(&data, geometry.ec_byte_num as usize)?);
        }

        Ok(Self {
            geometry,
            contents,
            next: 0,
            sequence: 0,
        })
    }

    /// Number of distinct frames before the cycle repeats.
    pub fn frame_count(&self) -> usize {
        self.contents.len()
    }

    /// Renders the next barcode frame, cycling through the packets.
    pub fn next_frame(&mut self) -> Frame {
        let content = &self.contents[self.next];
        self.next = (self.next + 1) % self.contents.len();
        self.sequence += 1;
        self.render(content, self.sequence)
    }

    fn render(&self, content: &[u8], sequence: u64) -> Frame {
        let cells = self.geometry.barcode_width();
        let offset = self.geometry.content_offset();
        let content_len = self.geometry.content_len;
        let side = cells * Self::CELL_SCALE + 2 * Self::MARGIN;
        let mut pixels = vec![WHITE; (side * side) as usize];

        for cy in 0..cells {
            for cx in 0..cells {
                let edge = cx.min(cy).min(cells - 1 - cx).min(cells - 1 - cy);
                let color = if edge < self.geometry.frame_black_len {
                    BLACK
                } else if cx >= offset
                    && cy >= offset
                    && cx < offset + content_len
                    && cy < offset + content_len
                {
                    let index = ((cy - offset) * content_len + (cx - offset)) as usize;
                    let bit = (content[index / 8] >> (7 - index % 8)) & 1;
                    if bit == 1 {
                        WHITE
                    } else {
                        BLACK
                    }
                } else {
                    // Varying rings carry nothing in the mock.
                    WHITE
                };
                if color == WHITE {
                    continue;
                }
                for dy in 0..Self::CELL_SCALE {
                    for dx in 0..Self::CELL_SCALE {
                        let px = Self::MARGIN + cx * Self::CELL_SCALE + dx;
                        let py = Self::MARGIN + cy * Self::CELL_SCALE + dy;
                        pixels[(py * side + px) as usize] = color;
                    }
                }
            }
        }
        Frame::new(pixels, side, side, sequence)
    }
}
