//! Barcode configuration and derived geometry.
//!
//! The configuration document is JSON with camelCase keys, loaded by an
//! external collaborator and handed to the core as a parsed struct. Codec
//! specific parameters travel in the free-form `hints` map so that layout
//! variants can extend the format without schema changes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw configuration document as transmitted alongside a barcode stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeConfig {
    /// Outer black frame ring width, in cells.
    pub border_length: u32,
    /// First varying ring width, in cells.
    pub padding_length: u32,
    /// Second varying (meta) ring width, in cells.
    pub meta_length: u32,
    /// Content grid width, in cells.
    pub main_width: u32,
    /// Content grid height, in cells.
    pub main_height: u32,
    /// Transmitter display rate.
    #[serde(default)]
    pub fps: u32,
    /// Nominal screen-to-camera distance (transmitter metadata).
    #[serde(default)]
    pub distance: u32,
    /// Codec-specific parameters (Reed-Solomon shape, RaptorQ source
    /// block count) passed through as strings.
    #[serde(default)]
    pub hints: HashMap<String, String>,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            border_length: 2,
            padding_length: 2,
            meta_length: 2,
            main_width: 40,
            main_height: 40,
            fps: 30,
            distance: 0,
            hints: HashMap::new(),
        }
    }
}

impl BarcodeConfig {
    /// Parses a configuration document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: BarcodeConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.geometry()?;
        Ok(config)
    }

    /// Reads a hint as an integer, falling back to `default` when absent.
    fn hint_u32(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.hints.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::BadHint(key.to_string())),
        }
    }

    /// Derives and validates the barcode geometry.
    pub fn geometry(&self) -> Result<BarcodeGeometry, ConfigError> {
        let geometry = BarcodeGeometry {
            frame_black_len: self.border_length,
            frame_vary_len: self.padding_length,
            frame_vary_two_len: self.meta_length,
            content_len: self.main_width,
            ec_num: self.hint_u32("ecNum", 16)?,
            ec_byte_num: self.hint_u32("ecByteNum", 47)?,
            ec_len: self.hint_u32("ecLength", 24)?,
            num_source_blocks: self.hint_u32("numSourceBlocks", 1)?,
        };
        if self.main_width != self.main_height {
            return Err(ConfigError::NotSquare {
                width: self.main_width,
                height: self.main_height,
            });
        }
        geometry.validate()?;
        Ok(geometry)
    }
}

/// Fixed barcode geometry, immutable for the lifetime of a reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeGeometry {
    /// Outer black frame ring width, in cells.
    pub frame_black_len: u32,
    /// First varying ring width, in cells.
    pub frame_vary_len: u32,
    /// Second varying ring width, in cells.
    pub frame_vary_two_len: u32,
    /// Content grid side, in cells.
    pub content_len: u32,
    /// Number of Reed-Solomon parity blocks in the content layout.
    pub ec_num: u32,
    /// Reed-Solomon parity symbol count for the content codeword.
    pub ec_byte_num: u32,
    /// Parity block length, in bits.
    pub ec_len: u32,
    /// RaptorQ source block count (`numSourceBlocks` hint).
    pub num_source_blocks: u32,
}

impl Default for BarcodeGeometry {
    fn default() -> Self {
        Self {
            frame_black_len: 2,
            frame_vary_len: 2,
            frame_vary_two_len: 2,
            content_len: 40,
            ec_num: 16,
            ec_byte_num: 47,
            ec_len: 24,
            num_source_blocks: 1,
        }
    }
}

impl BarcodeGeometry {
    /// Full barcode side length in cells, border rings included.
    #[inline]
    pub fn barcode_width(&self) -> u32 {
        2 * (self.frame_black_len + self.frame_vary_len + self.frame_vary_two_len)
            + self.content_len
    }

    /// Cell offset of the content region from the barcode origin.
    #[inline]
    pub fn content_offset(&self) -> u32 {
        self.frame_black_len + self.frame_vary_len + self.frame_vary_two_len
    }

    /// Content region size in bytes (one bit per cell).
    #[inline]
    pub fn content_bytes(&self) -> usize {
        (self.content_len * self.content_len) as usize / 8
    }

    /// Parity bytes reserved at the tail of the content region.
    #[inline]
    pub fn parity_bytes(&self) -> usize {
        (self.ec_num * self.ec_len) as usize / 8
    }

    /// RaptorQ symbol payload size carried by one frame.
    #[inline]
    pub fn symbol_size(&self) -> usize {
        self.content_bytes() - self.parity_bytes() - 8
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.content_len == 0 || (self.content_len * self.content_len) % 8 != 0 {
            return Err(ConfigError::ContentLength(self.content_len));
        }
        let content = self.content_bytes();
        if content > 255 {
            return Err(ConfigError::CodewordTooLong(content));
        }
        // The fountain symbol and the Reed-Solomon codeword describe the
        // same content layout only when the parity byte accounting agrees:
        // 5 header + 4 packet id + symbol + ecByteNum parity == content.
        if self.parity_bytes() != self.ec_byte_num as usize + 1 {
            return Err(ConfigError::ParityMismatch {
                ec_num: self.ec_num,
                ec_len: self.ec_len,
                ec_byte_num: self.ec_byte_num,
            });
        }
        if content <= self.parity_bytes() + 8 {
            return Err(ConfigError::NoPayloadRoom(content));
        }
        if self.num_source_blocks == 0 || self.num_source_blocks > u8::MAX as u32 {
            return Err(ConfigError::SourceBlocks(self.num_source_blocks));
        }
        Ok(())
    }
}

/// Configuration validation errors. Fatal: surfaced to the UI, never
/// recovered by frame-drop.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document failed to parse.
    #[error("failed to parse config document: {0}")]
    Parse(String),
    /// A codec hint did not parse as an integer.
    #[error("hint `{0}` is not an integer")]
    BadHint(String),
    /// The content grid must be square.
    #[error("content grid must be square, got {width}x{height}")]
    NotSquare {
        /// Configured grid width.
        width: u32,
        /// Configured grid height.
        height: u32,
    },
    /// Content cells must pack into whole bytes.
    #[error("content length {0} does not pack into whole bytes")]
    ContentLength(u32),
    /// The content region exceeds one Reed-Solomon codeword.
    #[error("content region of {0} bytes exceeds the 255-symbol codeword limit")]
    CodewordTooLong(usize),
    /// Parity byte accounting disagrees between the Reed-Solomon and
    /// fountain parameters.
    #[error("parity accounting mismatch: ecNum={ec_num} ecLength={ec_len} ecByteNum={ec_byte_num}")]
    ParityMismatch {
        /// Configured parity block count.
        ec_num: u32,
        /// Configured parity block length in bits.
        ec_len: u32,
        /// Configured parity symbol count.
        ec_byte_num: u32,
    },
    /// No bytes left for the symbol payload after header and parity.
    #[error("content region of {0} bytes leaves no room for a symbol payload")]
    NoPayloadRoom(usize),
    /// RaptorQ source block count outside 1..=255.
    #[error("invalid RaptorQ source block count {0}")]
    SourceBlocks(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_valid() {
        let geometry = BarcodeGeometry::default();
        assert_eq!(geometry.barcode_width(), 52);
        assert_eq!(geometry.content_bytes(), 200);
        assert_eq!(geometry.parity_bytes(), 48);
        assert_eq!(geometry.symbol_size(), 144);
    }

    #[test]
    fn test_from_json_round_trip() {
        let text = r#"{
            "borderLength": 2,
            "paddingLength": 1,
            "metaLength": 1,
            "mainWidth": 40,
            "mainHeight": 40,
            "fps": 30,
            "distance": 50,
            "hints": {"numSourceBlocks": "2"}
        }"#;
        let config = BarcodeConfig::from_json(text).unwrap();
        let geometry = config.geometry().unwrap();

        assert_eq!(geometry.barcode_width(), 48);
        assert_eq!(geometry.num_source_blocks, 2);
    }

    #[test]
    fn test_rectangular_content_rejected() {
        let mut config = BarcodeConfig::default();
        config.main_height = 48;
        assert!(matches!(
            config.geometry(),
            Err(ConfigError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_parity_identity_enforced() {
        let mut config = BarcodeConfig::default();
        config.hints.insert("ecByteNum".into(), "40".into());
        assert!(matches!(
            config.geometry(),
            Err(ConfigError::ParityMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_hint_rejected() {
        let mut config = BarcodeConfig::default();
        config.hints.insert("ecNum".into(), "many".into());
        assert!(matches!(config.geometry(), Err(ConfigError::BadHint(_))));
    }

    #[test]
    fn test_oversized_codeword_rejected() {
        let mut config = BarcodeConfig::default();
        config.main_width = 80;
        config.main_height = 80;
        assert!(matches!(
            config.geometry(),
            Err(ConfigError::CodewordTooLong(_))
        ));
    }
}
