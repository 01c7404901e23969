//! RaptorQ fountain decoder adapter.
//!
//! Accumulates per-frame encoding packets as one system of equations and
//! reports completion once every source block is recoverable. Packets
//! commute, so arrival order never matters and duplicates are free to
//! discard.

use std::collections::HashSet;

use raptorq::{Decoder, ObjectTransmissionInformation};

use super::EncodingPacket;

/// Per-source-block accumulation state, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBlockState {
    /// Source block number.
    pub source_block: u8,
    /// Unique symbols received for this block.
    pub received: u32,
}

/// Cross-frame fountain decoder for one file reception.
///
/// The only pipeline object that persists across frames; created once the
/// header is known and owned by the driver until completion.
pub struct FountainDecoder {
    inner: Decoder,
    transfer_length: u64,
    symbol_size: u16,
    received: HashSet<(u8, u32)>,
    block_counts: Vec<u32>,
    result: Option<Vec<u8>>,
}

impl FountainDecoder {
    /// Creates a decoder for `transfer_length` bytes carried in
    /// `symbol_size`-byte symbols across `source_blocks` blocks.
    pub fn new(transfer_length: u64, symbol_size: u16, source_blocks: u8) -> Self {
        let oti =
            ObjectTransmissionInformation::new(transfer_length, symbol_size, source_blocks, 1, 1);
        Self {
            inner: Decoder::new(oti),
            transfer_length,
            symbol_size,
            received: HashSet::new(),
            block_counts: vec![0; source_blocks as usize],
            result: None,
        }
    }

    /// Adds one encoding packet to the accumulated system.
    ///
    /// Returns `true` when the packet was new, `false` for duplicates or
    /// when the transfer is already complete.
    pub fn put(&mut self, packet: EncodingPacket) -> bool {
        if self.result.is_some() {
            return false;
        }
        let key = (packet.source_block, packet.symbol_id);
        if !self.received.insert(key) {
            return false;
        }
        self.block_counts[packet.source_block as usize] += 1;
        if let Some(data) = self.inner.decode(packet.into_raptorq()) {
            tracing::debug!(
                symbols = self.received.len(),
                bytes = data.len(),
                "fountain decode complete"
            );
            self.result = Some(data);
        }
        true
    }

    /// True once the full byte array can be materialized.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// The reconstructed bytes, once complete.
    pub fn data_bytes(&self) -> Option<&[u8]> {
        self.result.as_deref()
    }

    /// Moves the reconstructed bytes out of the decoder.
    pub fn take_data(&mut self) -> Option<Vec<u8>> {
        self.result.take()
    }

    /// Accumulation state per source block, in block order.
    pub fn source_block_states(&self) -> Vec<SourceBlockState> {
        self.block_counts
            .iter()
            .enumerate()
            .map(|(block, &received)| SourceBlockState {
                source_block: block as u8,
                received,
            })
            .collect()
    }

    /// Unique symbols received so far.
    #[inline]
    pub fn received_count(&self) -> u32 {
        self.received.len() as u32
    }

    /// Source symbol count K for the whole transfer.
    #[inline]
    pub fn source_symbols(&self) -> u32 {
        self.transfer_length.div_ceil(u64::from(self.symbol_size)) as u32
    }

    /// Approximate symbols needed for reconstruction, K' = K * 1.002.
    pub fn needed(&self) -> u32 {
        let k_prime = (f64::from(self.source_symbols()) * 1.002).ceil() as u32;
        k_prime.max(1)
    }
}

impl std::fmt::Debug for FountainDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FountainDecoder")
            .field("transfer_length", &self.transfer_length)
            .field("symbol_size", &self.symbol_size)
            .field("received", &self.received.len())
            .field("complete", &self.result.is_some())
            .finish()
    }
}
