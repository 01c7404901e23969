//! Frame header extraction: 4-byte length plus CRC-8.
//!
//! The first row of content cells packs to five bytes: a big-endian u32
//! file length followed by a CRC-8/ITU-T check byte (polynomial 0x07,
//! initial 0x00, no reflection, no final XOR).

/// Header size in bytes.
pub const HEADER_BYTES: usize = 5;

/// CRC-8 generator polynomial.
const POLY: u8 = 0x07;

/// Computes the CRC-8/ITU-T checksum of `data`.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// A validated frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Transmitted file length in bytes.
    pub file_byte_len: u32,
    /// The CRC-8 byte as carried on the wire.
    pub crc8: u8,
}

impl HeaderRecord {
    /// Parses and validates the five header bytes.
    ///
    /// A zero length is reported as [`HeaderError::NotReady`]: the screen
    /// was between transmissions and the frame should simply be retried.
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_BYTES {
            return Err(HeaderError::Truncated(bytes.len()));
        }
        let length = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let found = bytes[4];
        let expected = crc8(&bytes[..4]);
        if found != expected {
            return Err(HeaderError::CrcMismatch { expected, found });
        }
        if length == 0 {
            return Err(HeaderError::NotReady);
        }
        Ok(Self {
            file_byte_len: length,
            crc8: found,
        })
    }

    /// Encodes a header for the given file length (transmit side of the
    /// contract; used by the mock transmitter and tests).
    pub fn encode(file_byte_len: u32) -> [u8; HEADER_BYTES] {
        let length = file_byte_len.to_be_bytes();
        [
            length[0],
            length[1],
            length[2],
            length[3],
            crc8(&length),
        ]
    }
}

/// Header extraction errors. Recoverable by dropping the reading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HeaderError {
    /// The CRC byte does not match the length field.
    #[error("header CRC mismatch: expected {expected:#04x}, found {found:#04x}")]
    CrcMismatch {
        /// Locally computed checksum.
        expected: u8,
        /// Checksum carried in the frame.
        found: u8,
    },
    /// Length field is zero: screen between transmissions, retry.
    #[error("header not ready: zero length")]
    NotReady,
    /// Fewer than five bytes supplied.
    #[error("truncated header of {0} bytes")]
    Truncated(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let bytes = HeaderRecord::encode(12345);
        assert_eq!(&bytes[..4], &[0x00, 0x00, 0x30, 0x39]);
        assert_eq!(bytes[4], crc8(&[0x00, 0x00, 0x30, 0x39]));

        let header = HeaderRecord::parse(&bytes).unwrap();
        assert_eq!(header.file_byte_len, 12345);
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let mut bytes = HeaderRecord::encode(12345);
        bytes[2] ^= 0x01;
        assert!(matches!(
            HeaderRecord::parse(&bytes),
            Err(HeaderError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_length_not_ready() {
        let bytes = HeaderRecord::encode(0);
        assert!(matches!(
            HeaderRecord::parse(&bytes),
            Err(HeaderError::NotReady)
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            HeaderRecord::parse(&[0x00, 0x01]),
            Err(HeaderError::Truncated(2))
        ));
    }

    #[test]
    fn test_single_bit_flips_always_detected() {
        // Flipping any single bit of the 40-bit header stream must make
        // the CRC of the first 32 bits disagree with the last 8.
        let bytes = HeaderRecord::encode(0x00A1_B2C3);
        for bit in 0..40 {
            let mut corrupted = bytes;
            corrupted[bit / 8] ^= 0x80 >> (bit % 8);
            assert_ne!(
                crc8(&corrupted[..4]),
                corrupted[4],
                "bit {bit} flip went undetected"
            );
        }
    }

    #[test]
    fn test_known_crc_vector() {
        // CRC-8/ITU-T of "123456789" check value is 0xF4 for plain CRC-8
        // with poly 0x07, init 0, no reflection, no xorout.
        assert_eq!(crc8(b"123456789"), 0xF4);
    }
}
