//! Property-based tests for the codec and geometry invariants.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screenbeam::codec::{crc8, HeaderRecord, ReedSolomon};
use screenbeam::geometry::PerspectiveTransform;
use screenbeam::{BinaryMatrix, Frame};

fn message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=100)
}

/// 256x256 luminance frame: `white` background with a `black` rectangle.
fn two_level_frame(black: u8, white: u8) -> Frame {
    let mut pixels = vec![white; 256 * 256];
    for y in 60..200usize {
        for x in 50..210usize {
            pixels[y * 256 + x] = black;
        }
    }
    Frame::new(pixels, 256, 256, 0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_rs_encode_decode_round_trip(message in message(), ec in 2usize..=20) {
        prop_assume!(message.len() + ec <= 255);
        let codec = ReedSolomon::data_matrix();

        let mut codeword = codec.encode(&message, ec).unwrap();
        let corrected = codec.decode(&mut codeword, ec).unwrap();

        prop_assert_eq!(corrected, 0);
        prop_assert_eq!(&codeword[..message.len()], &message[..]);
    }

    #[test]
    fn prop_rs_corrects_up_to_half_parity(
        message in message(),
        ec in 4usize..=16,
        seed in any::<u64>(),
    ) {
        prop_assume!(message.len() + ec <= 255);
        let codec = ReedSolomon::data_matrix();
        let clean = codec.encode(&message, ec).unwrap();
        let mut codeword = clean.clone();

        // Corrupt floor(ec / 2) distinct positions.
        let mut rng = StdRng::seed_from_u64(seed);
        let errors = ec / 2;
        let mut positions: Vec<usize> = (0..codeword.len()).collect();
        for i in 0..errors {
            let j = rng.gen_range(i..positions.len());
            positions.swap(i, j);
        }
        for &position in &positions[..errors] {
            codeword[position] ^= rng.gen_range(1u8..=255);
        }

        let corrected = codec.decode(&mut codeword, ec).unwrap();
        prop_assert!(corrected <= errors);
        prop_assert_eq!(&codeword[..], &clean[..]);
    }

    #[test]
    fn prop_rs_erasures_consume_one_parity_symbol(
        message in message(),
        seed in any::<u64>(),
    ) {
        let ec = 12usize;
        prop_assume!(message.len() + ec <= 255);
        let codec = ReedSolomon::data_matrix();
        let clean = codec.encode(&message, ec).unwrap();
        let mut codeword = clean.clone();

        // 6 erasures leave floor((12 - 6) / 2) = 3 correctable errors.
        let mut rng = StdRng::seed_from_u64(seed);
        let mut positions: Vec<usize> = (0..codeword.len()).collect();
        for i in 0..9 {
            let j = rng.gen_range(i..positions.len());
            positions.swap(i, j);
        }
        let erasures: Vec<usize> = positions[..6].to_vec();
        for &position in &positions[..9] {
            codeword[position] ^= rng.gen_range(1u8..=255);
        }

        codec.decode_with_erasures(&mut codeword, ec, &erasures).unwrap();
        prop_assert_eq!(&codeword[..], &clean[..]);
    }

    #[test]
    fn prop_crc8_detects_single_bit_flips(length in any::<u32>(), bit in 0usize..40) {
        let header = HeaderRecord::encode(length);
        let mut corrupted = header;
        corrupted[bit / 8] ^= 0x80 >> (bit % 8);

        prop_assert_ne!(crc8(&corrupted[..4]), corrupted[4]);
    }

    #[test]
    fn prop_perspective_corner_round_trip(jitter in prop::array::uniform8(-20.0f64..20.0)) {
        let source = [0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];
        let mut destination = [10.0, 10.0, 210.0, 20.0, 220.0, 220.0, 20.0, 210.0];
        for (corner, offset) in destination.iter_mut().zip(jitter) {
            *corner += offset;
        }

        let transform = PerspectiveTransform::quad_to_quad(&source, &destination);
        let mut points = source;
        transform.transform_points(&mut points);

        for (got, want) in points.iter().zip(destination) {
            prop_assert!((got - want).abs() < 1e-6, "mapped {:?}", points);
        }
    }

    #[test]
    fn prop_threshold_lies_between_peaks(black in 0u8..=100, gap in 17u8..=100) {
        let white = black + gap;
        let matrix = BinaryMatrix::from_frame(two_level_frame(black, white)).unwrap();
        let threshold = matrix.threshold();

        prop_assert!(threshold > black, "threshold {} <= black {}", threshold, black);
        prop_assert!(threshold < white, "threshold {} >= white {}", threshold, white);
    }
}
