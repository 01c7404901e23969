//! Pipeline driver: the per-frame decode loop and its state machine.
//!
//! A single worker consumes raw frames from the queue, walks each one
//! through binarization, perspective sampling, header and Reed-Solomon
//! decoding, and feeds recovered packets to the fountain decoder. Any
//! failure along the way drops the frame or reading; retry is implicit in
//! consuming subsequent frames.

use crate::binarize::{BinaryMatrix, LocateError};
use crate::capture::{BarcodeGeometry, Frame, FrameQueue};
use crate::codec::{HeaderError, HeaderRecord, ReedSolomon, RsError, HEADER_BYTES};
use crate::fountain::{EncodingPacket, FountainDecoder, PacketError};
use crate::geometry::{BlackWhiteStrategy, GridSampler, SampleStrategy, Zone};

use super::progress::ProgressObserver;
use super::verify::sha1_hex;

/// Driver-level failures. Everything else is absorbed as a frame drop.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    /// The frame queue was closed before the transfer completed. The
    /// partially decoded file is discarded.
    #[error("frame queue interrupted before completion")]
    Interrupted,
}

/// Result of a completed reception.
#[derive(Debug, Clone)]
pub struct DecodeSummary {
    /// Reconstructed file size in bytes.
    pub byte_len: usize,
    /// SHA-1 of the reconstructed bytes, lowercase hex.
    pub sha1_hex: String,
    /// Frames pulled from the queue.
    pub frames_processed: u64,
    /// Frames that contributed at least one packet.
    pub frames_contributing: u64,
    /// Encoding packets accepted by the fountain decoder.
    pub packets_accepted: u64,
}

/// Failures local to one polarity reading of a frame.
#[derive(Debug, thiserror::Error)]
enum ReadingError {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    ReedSolomon(#[from] RsError),
    #[error(transparent)]
    Packet(#[from] PacketError),
}

enum DriverState {
    /// File length unknown; every frame is attempted for its header.
    AwaitingHeader,
    /// Fountain decoder initialized and accumulating packets.
    Accumulating(FountainDecoder),
    /// Full byte array materialized.
    Complete(Vec<u8>),
}

/// Consumes frames until the transmitted file is reconstructed.
pub struct PipelineDriver {
    geometry: BarcodeGeometry,
    codec: ReedSolomon,
    strategy: BlackWhiteStrategy,
    state: DriverState,
    output_name: String,
    last_success: u64,
    processed: u64,
    contributing: u64,
    packets: u64,
}

impl PipelineDriver {
    /// Creates a driver for one reception, naming the file handed to the
    /// sink on completion.
    pub fn new(geometry: BarcodeGeometry, output_name: impl Into<String>) -> Self {
        Self {
            geometry,
            codec: ReedSolomon::data_matrix(),
            strategy: BlackWhiteStrategy,
            state: DriverState::AwaitingHeader,
            output_name: output_name.into(),
            last_success: 0,
            processed: 0,
            contributing: 0,
            packets: 0,
        }
    }

    /// Runs the frame loop to completion.
    ///
    /// The sink is invoked exactly once, with the verified bytes and the
    /// output name. Closing the queue before completion yields
    /// [`DriverError::Interrupted`] and discards all partial state.
    pub fn run(
        mut self,
        queue: &FrameQueue,
        observer: &mut dyn ProgressObserver,
        mut sink: impl FnMut(&[u8], &str),
    ) -> Result<DecodeSummary, DriverError> {
        while let Some(frame) = queue.take() {
            self.processed += 1;
            let sequence = frame.sequence();
            observer.on_frame(
                sequence,
                self.last_success,
                self.expected_total(),
                self.processed,
            );

            match self.process_frame(frame) {
                Ok(0) => {}
                Ok(contributed) => {
                    self.last_success = sequence;
                    self.contributing += 1;
                    self.packets += contributed;
                }
                Err(error) => {
                    tracing::debug!(sequence, %error, "frame dropped");
                }
            }

            if let DriverState::Complete(data) = &self.state {
                let digest = sha1_hex(data);
                observer.on_status(&format!("SHA-1 {digest}"));
                sink(data, &self.output_name);
                tracing::info!(
                    bytes = data.len(),
                    sha1 = %digest,
                    frames = self.processed,
                    "transfer complete"
                );
                return Ok(DecodeSummary {
                    byte_len: data.len(),
                    sha1_hex: digest,
                    frames_processed: self.processed,
                    frames_contributing: self.contributing,
                    packets_accepted: self.packets,
                });
            }
        }
        tracing::info!(frames = self.processed, "frame queue interrupted");
        Err(DriverError::Interrupted)
    }

    /// Decodes one frame; returns the number of packets it contributed.
    fn process_frame(&mut self, frame: Frame) -> Result<u64, LocateError> {
        let matrix = BinaryMatrix::from_frame(frame)?;
        let width = self.geometry.barcode_width();
        let sampler = GridSampler::new(&matrix, width, width);
        let grid = sampler.sample_grid(width, width);

        let offset = self.geometry.content_offset();
        let zone = Zone {
            x: offset,
            y: offset,
            width: self.geometry.content_len,
            height: self.geometry.content_len,
        };

        // Two independent readings per frame, polarity toggled between
        // them. Either, both, or neither may survive decoding.
        let mut contributed = 0;
        for reverse in [false, true] {
            if matches!(self.state, DriverState::Complete(_)) {
                break;
            }
            let content = self.strategy.sample_zone(&grid, &zone, reverse);
            match self.process_reading(&content) {
                Ok(true) => contributed += 1,
                Ok(false) => {}
                Err(error) => {
                    tracing::debug!(reverse, %error, "reading dropped");
                }
            }
        }

        if let DriverState::Accumulating(decoder) = &self.state {
            tracing::trace!(
                received = decoder.received_count(),
                needed = decoder.needed(),
                states = ?decoder.source_block_states(),
                "accumulation status"
            );
        }
        Ok(contributed)
    }

    /// Decodes one polarity reading of the sampled content region.
    fn process_reading(&mut self, content: &[u8]) -> Result<bool, ReadingError> {
        if matches!(self.state, DriverState::AwaitingHeader) {
            let header = HeaderRecord::parse(&content[..HEADER_BYTES])?;
            let decoder = FountainDecoder::new(
                u64::from(header.file_byte_len),
                self.geometry.symbol_size() as u16,
                self.geometry.num_source_blocks as u8,
            );
            tracing::info!(
                file_bytes = header.file_byte_len,
                symbol_size = self.geometry.symbol_size(),
                source_blocks = self.geometry.num_source_blocks,
                "fountain decoder initialized"
            );
            self.state = DriverState::Accumulating(decoder);
        }

        let DriverState::Accumulating(decoder) = &mut self.state else {
            return Ok(false);
        };

        let mut codeword = content.to_vec();
        let corrected = self.codec.decode(&mut codeword, self.geometry.ec_byte_num as usize)?;
        if corrected > 0 {
            tracing::trace!(corrected, "reed-solomon corrections applied");
        }

        let data_end = self.geometry.content_bytes() - self.geometry.ec_byte_num as usize;
        let packet = EncodingPacket::parse(
            &codeword[HEADER_BYTES..data_end],
            self.geometry.symbol_size(),
            self.geometry.num_source_blocks as u8,
        )?;
        let accepted = decoder.put(packet);

        if decoder.is_complete() {
            if let Some(data) = decoder.take_data() {
                self.state = DriverState::Complete(data);
            }
        }
        Ok(accepted)
    }

    fn expected_total(&self) -> u32 {
        match &self.state {
            DriverState::Accumulating(decoder) => decoder.needed(),
            _ => 0,
        }
    }
}
