//! Reed-Solomon codec over GF(2^8) with erasure support.
//!
//! Systematic encoding against the generator `g(x) = prod (x - a^i)` for
//! `i = 0..ec_count`, and decoding via the key-equation solver (extended
//! Euclid on the erasure-modified syndrome polynomial), Chien search, and
//! the Forney algorithm. With `e` known erasures the decoder corrects up
//! to `floor((ec_count - e) / 2)` additional unlocated errors.

use super::galois::{GaloisField, FIELD_SIZE};

/// Reed-Solomon decoding errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RsError {
    /// Codeword longer than the 255 symbols GF(2^8) supports.
    #[error("codeword of {0} symbols exceeds the 255-symbol field limit")]
    CodewordTooLong(usize),
    /// More erasure positions than parity symbols.
    #[error("{got} erasures exceed the {limit} parity symbols")]
    TooManyErasures {
        /// Erasures supplied.
        got: usize,
        /// Parity symbol count.
        limit: usize,
    },
    /// An erasure index outside the codeword.
    #[error("erasure position {0} outside the codeword")]
    ErasurePosition(usize),
    /// The codeword is beyond the correction capability.
    #[error("uncorrectable codeword: {0}")]
    Uncorrectable(&'static str),
}

/// GF(2^8) Reed-Solomon encoder/decoder bound to one field.
pub struct ReedSolomon {
    field: &'static GaloisField,
}

impl ReedSolomon {
    /// Codec over the DataMatrix field (primitive 0x012D).
    pub fn data_matrix() -> Self {
        Self {
            field: GaloisField::data_matrix(),
        }
    }

    /// Systematically encodes `data`, returning the codeword with
    /// `ec_count` parity symbols appended.
    pub fn encode(&self, data: &[u8], ec_count: usize) -> Result<Vec<u8>, RsError> {
        let n = data.len() + ec_count;
        if n > FIELD_SIZE - 1 {
            return Err(RsError::CodewordTooLong(n));
        }
        let mut codeword = data.to_vec();
        if ec_count == 0 {
            return Ok(codeword);
        }

        let generator = self.generator(ec_count);
        // LFSR division: parity[0] tracks the highest remainder power.
        let mut parity = vec![0u8; ec_count];
        for &byte in data {
            let factor = byte ^ parity[0];
            parity.rotate_left(1);
            parity[ec_count - 1] = 0;
            if factor != 0 {
                for (i, p) in parity.iter_mut().enumerate() {
                    *p ^= self.field.multiply(generator.coeff(ec_count - 1 - i), factor);
                }
            }
        }
        codeword.extend_from_slice(&parity);
        Ok(codeword)
    }

    /// Decodes a codeword in place with no known erasures.
    ///
    /// Returns the number of symbol positions actually corrected.
    pub fn decode(&self, codeword: &mut [u8], ec_count: usize) -> Result<usize, RsError> {
        self.decode_with_erasures(codeword, ec_count, &[])
    }

    /// Decodes a codeword in place given known-corrupt positions.
    ///
    /// `erasures` holds byte indices into `codeword` (0 = first byte).
    /// Each erasure consumes one parity symbol instead of two.
    pub fn decode_with_erasures(
        &self,
        codeword: &mut [u8],
        ec_count: usize,
        erasures: &[usize],
    ) -> Result<usize, RsError> {
        let n = codeword.len();
        if n > FIELD_SIZE - 1 {
            return Err(RsError::CodewordTooLong(n));
        }
        if ec_count == 0 {
            return Ok(0);
        }

        let mut erasure_positions = erasures.to_vec();
        erasure_positions.sort_unstable();
        erasure_positions.dedup();
        if let Some(&bad) = erasure_positions.iter().find(|&&p| p >= n) {
            return Err(RsError::ErasurePosition(bad));
        }
        let erasure_count = erasure_positions.len();
        if erasure_count > ec_count {
            return Err(RsError::TooManyErasures {
                got: erasure_count,
                limit: ec_count,
            });
        }

        // received[j] is the coefficient of x^(n-1-j).
        let received = Poly::from_coeffs(codeword.iter().rev().copied().collect());
        let syndromes: Vec<u8> = (0..ec_count)
            .map(|j| received.eval(self.field, self.field.exp(j)))
            .collect();
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(0);
        }
        let syndrome_poly = Poly::from_coeffs(syndromes);

        let mut erasure_locator = Poly::one();
        for &position in &erasure_positions {
            let location = self.field.exp(n - 1 - position);
            erasure_locator =
                erasure_locator.mul(self.field, &Poly::from_coeffs(vec![1, location]));
        }

        let modified = syndrome_poly
            .mul(self.field, &erasure_locator)
            .truncated(ec_count);
        if modified.is_zero() {
            return Err(RsError::Uncorrectable("degenerate syndromes"));
        }

        let (error_locator, evaluator) =
            self.solve_key_equation(&modified, ec_count, erasure_count)?;
        let locator = error_locator.mul(self.field, &erasure_locator);

        // Chien search: the locator roots are the inverses of the error
        // locations.
        let mut locations = Vec::with_capacity(locator.degree());
        for power in 0..FIELD_SIZE - 1 {
            let x_inv = self.field.exp(FIELD_SIZE - 1 - power);
            if locator.eval(self.field, x_inv) == 0 {
                locations.push(power);
            }
        }
        if locations.len() != locator.degree() {
            return Err(RsError::Uncorrectable("error locator degree mismatch"));
        }
        if locations.iter().any(|&power| power >= n) {
            return Err(RsError::Uncorrectable("error location outside codeword"));
        }
        if evaluator.degree() >= locator.degree() {
            return Err(RsError::Uncorrectable("error evaluator degree too high"));
        }

        // Forney: e_l = X_l * omega(X_l^-1) / psi'(X_l^-1).
        let derivative = locator.derivative();
        let mut corrected = 0usize;
        for &power in &locations {
            let x_inv = self.field.exp(FIELD_SIZE - 1 - power);
            let denominator = derivative.eval(self.field, x_inv);
            if denominator == 0 {
                return Err(RsError::Uncorrectable("repeated error location"));
            }
            let magnitude = self.field.multiply(
                self.field.exp(power),
                self.field
                    .divide(evaluator.eval(self.field, x_inv), denominator),
            );
            if magnitude != 0 {
                codeword[n - 1 - power] ^= magnitude;
                corrected += 1;
            }
        }

        let check = Poly::from_coeffs(codeword.iter().rev().copied().collect());
        for j in 0..ec_count {
            if check.eval(self.field, self.field.exp(j)) != 0 {
                return Err(RsError::Uncorrectable("correction left residual syndromes"));
            }
        }
        Ok(corrected)
    }

    /// `g(x) = prod_{i=0}^{ec_count-1} (x - a^i)`.
    fn generator(&self, ec_count: usize) -> Poly {
        let mut generator = Poly::one();
        for i in 0..ec_count {
            let root = self.field.exp(i);
            generator = generator.mul(self.field, &Poly::from_coeffs(vec![root, 1]));
        }
        generator
    }

    /// Extended Euclid on `(x^ec_count, modified)` until the remainder
    /// degree drops below `(ec_count + erasure_count) / 2`. Returns the
    /// normalized `(error_locator, evaluator)` pair.
    fn solve_key_equation(
        &self,
        modified: &Poly,
        ec_count: usize,
        erasure_count: usize,
    ) -> Result<(Poly, Poly), RsError> {
        let mut r_prev = Poly::monomial(ec_count, 1);
        let mut r = modified.clone();
        let mut t_prev = Poly::zero();
        let mut t = Poly::one();

        while !r.is_zero() && 2 * r.degree() >= ec_count + erasure_count {
            let (quotient, remainder) = r_prev.div_rem(self.field, &r);
            r_prev = std::mem::replace(&mut r, remainder);
            let t_next = t_prev.add(&quotient.mul(self.field, &t));
            t_prev = std::mem::replace(&mut t, t_next);
        }
        if r.is_zero() {
            return Err(RsError::Uncorrectable("error evaluator vanished"));
        }

        let constant = t.coeff(0);
        if constant == 0 {
            return Err(RsError::Uncorrectable("locator constant term is zero"));
        }
        let inverse = self.field.inverse(constant);
        Ok((t.scale(self.field, inverse), r.scale(self.field, inverse)))
    }
}

/// Polynomial over GF(2^8), coefficients stored lowest power first.
/// Always trimmed: the zero polynomial has no coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Poly {
    coeffs: Vec<u8>,
}

impl Poly {
    fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    fn one() -> Self {
        Self { coeffs: vec![1] }
    }

    fn monomial(degree: usize, coefficient: u8) -> Self {
        if coefficient == 0 {
            return Self::zero();
        }
        let mut coeffs = vec![0u8; degree + 1];
        coeffs[degree] = coefficient;
        Self { coeffs }
    }

    fn from_coeffs(mut coeffs: Vec<u8>) -> Self {
        while coeffs.last() == Some(&0) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree of a nonzero polynomial; the zero polynomial answers 0.
    fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    fn coeff(&self, power: usize) -> u8 {
        self.coeffs.get(power).copied().unwrap_or(0)
    }

    fn eval(&self, field: &GaloisField, x: u8) -> u8 {
        let mut acc = 0u8;
        for &c in self.coeffs.iter().rev() {
            acc = field.add(field.multiply(acc, x), c);
        }
        acc
    }

    fn add(&self, other: &Poly) -> Poly {
        let mut coeffs = vec![0u8; self.coeffs.len().max(other.coeffs.len())];
        for (i, slot) in coeffs.iter_mut().enumerate() {
            *slot = self.coeff(i) ^ other.coeff(i);
        }
        Poly::from_coeffs(coeffs)
    }

    fn mul(&self, field: &GaloisField, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        let mut coeffs = vec![0u8; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] ^= field.multiply(a, b);
            }
        }
        Poly::from_coeffs(coeffs)
    }

    fn scale(&self, field: &GaloisField, factor: u8) -> Poly {
        Poly::from_coeffs(
            self.coeffs
                .iter()
                .map(|&c| field.multiply(c, factor))
                .collect(),
        )
    }

    /// The polynomial modulo x^len.
    fn truncated(&self, len: usize) -> Poly {
        Poly::from_coeffs(self.coeffs.iter().take(len).copied().collect())
    }

    fn div_rem(&self, field: &GaloisField, divisor: &Poly) -> (Poly, Poly) {
        debug_assert!(!divisor.is_zero(), "division by the zero polynomial");
        if self.is_zero() || self.degree() < divisor.degree() {
            return (Poly::zero(), self.clone());
        }
        let divisor_degree = divisor.degree();
        let lead_inverse = field.inverse(divisor.coeffs[divisor_degree]);

        let mut remainder = self.coeffs.clone();
        let mut quotient = vec![0u8; remainder.len() - divisor_degree];
        for shift in (0..quotient.len()).rev() {
            let lead = remainder[shift + divisor_degree];
            if lead == 0 {
                continue;
            }
            let factor = field.multiply(lead, lead_inverse);
            quotient[shift] = factor;
            for (i, &dc) in divisor.coeffs.iter().enumerate() {
                remainder[shift + i] ^= field.multiply(dc, factor);
            }
        }
        remainder.truncate(divisor_degree);
        (Poly::from_coeffs(quotient), Poly::from_coeffs(remainder))
    }

    /// Formal derivative in characteristic 2: even-power terms vanish.
    fn derivative(&self) -> Poly {
        if self.coeffs.len() <= 1 {
            return Poly::zero();
        }
        let mut coeffs = vec![0u8; self.coeffs.len() - 1];
        for (power, &c) in self.coeffs.iter().enumerate().skip(1) {
            if power % 2 == 1 {
                coeffs[power - 1] = c;
            }
        }
        Poly::from_coeffs(coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Vec<u8> {
        (1..=40u8).collect()
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let mut codeword = codec.encode(&message, 10).unwrap();

        assert_eq!(codeword.len(), 50);
        let corrected = codec.decode(&mut codeword, 10).unwrap();
        assert_eq!(corrected, 0);
        assert_eq!(&codeword[..40], &message[..]);
    }

    #[test]
    fn test_corrects_two_errors() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let mut codeword = codec.encode(&message, 10).unwrap();

        codeword[7] ^= 0x55;
        codeword[22] ^= 0xA3;

        let corrected = codec.decode(&mut codeword, 10).unwrap();
        assert_eq!(corrected, 2);
        assert_eq!(&codeword[..40], &message[..]);
    }

    #[test]
    fn test_corrects_at_full_error_capacity() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let mut codeword = codec.encode(&message, 10).unwrap();

        // floor(10 / 2) = 5 arbitrary symbol errors.
        for (position, flip) in [(0, 0xFF), (11, 0x01), (23, 0x80), (39, 0x6C), (45, 0x13)] {
            codeword[position] ^= flip;
        }

        let corrected = codec.decode(&mut codeword, 10).unwrap();
        assert_eq!(corrected, 5);
        assert_eq!(&codeword[..40], &message[..]);
    }

    #[test]
    fn test_beyond_capacity_never_returns_original() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let clean = codec.encode(&message, 10).unwrap();
        let mut codeword = clean.clone();

        for position in [2, 9, 17, 25, 33, 41] {
            codeword[position] ^= 0xE7;
        }

        // Six errors exceed the 5-error capacity: the decoder must either
        // report failure or settle on some other codeword, never silently
        // reproduce the original.
        match codec.decode(&mut codeword, 10) {
            Err(RsError::Uncorrectable(_)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => assert_ne!(&codeword[..40], &message[..]),
        }
    }

    #[test]
    fn test_erasures_up_to_parity_count() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let clean = codec.encode(&message, 10).unwrap();
        let mut codeword = clean.clone();

        let erasures: Vec<usize> = vec![1, 4, 9, 16, 20, 25, 30, 36, 42, 49];
        for &position in &erasures {
            codeword[position] = 0;
        }

        let corrected = codec
            .decode_with_erasures(&mut codeword, 10, &erasures)
            .unwrap();
        assert_eq!(&codeword[..], &clean[..]);
        // Erased positions that already held zero need no correction.
        assert_eq!(
            corrected,
            erasures.iter().filter(|&&p| clean[p] != 0).count()
        );
    }

    #[test]
    fn test_mixed_erasures_and_errors() {
        let codec = ReedSolomon::data_matrix();
        let message = sample_message();
        let mut codeword = codec.encode(&message, 10).unwrap();

        // 4 erasures leave floor((10 - 4) / 2) = 3 correctable errors.
        let erasures = [3usize, 12, 28, 44];
        for &position in &erasures {
            codeword[position] ^= 0x99;
        }
        for position in [6, 19, 37] {
            codeword[position] ^= 0x42;
        }

        let corrected = codec
            .decode_with_erasures(&mut codeword, 10, &erasures)
            .unwrap();
        assert_eq!(corrected, 7);
        assert_eq!(&codeword[..40], &message[..]);
    }

    #[test]
    fn test_too_many_erasures_rejected() {
        let codec = ReedSolomon::data_matrix();
        let mut codeword = codec.encode(&sample_message(), 10).unwrap();
        let erasures: Vec<usize> = (0..11).collect();

        assert!(matches!(
            codec.decode_with_erasures(&mut codeword, 10, &erasures),
            Err(RsError::TooManyErasures { got: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_erasure_position_validated() {
        let codec = ReedSolomon::data_matrix();
        let mut codeword = codec.encode(&sample_message(), 10).unwrap();

        assert!(matches!(
            codec.decode_with_erasures(&mut codeword, 10, &[50]),
            Err(RsError::ErasurePosition(50))
        ));
    }

    #[test]
    fn test_codeword_length_limit() {
        let codec = ReedSolomon::data_matrix();
        assert!(matches!(
            codec.encode(&vec![0u8; 250], 10),
            Err(RsError::CodewordTooLong(260))
        ));
    }

    #[test]
    fn test_generator_has_expected_roots() {
        let codec = ReedSolomon::data_matrix();
        let generator = codec.generator(6);

        assert_eq!(generator.degree(), 6);
        for i in 0..6 {
            assert_eq!(generator.eval(codec.field, codec.field.exp(i)), 0);
        }
        assert_ne!(generator.eval(codec.field, codec.field.exp(6)), 0);
    }

    #[test]
    fn test_poly_div_rem_identity() {
        let field = GaloisField::data_matrix();
        let a = Poly::from_coeffs(vec![5, 0, 3, 1, 9]);
        let b = Poly::from_coeffs(vec![7, 2, 1]);
        let (quotient, remainder) = a.div_rem(field, &b);

        let recombined = quotient.mul(field, &b).add(&remainder);
        assert_eq!(recombined, a);
        assert!(remainder.is_zero() || remainder.degree() < b.degree());
    }

    #[test]
    fn test_poly_derivative_char_two() {
        // d/dx (x^3 + 5x^2 + 7x + 9) = x^2 + 7 in characteristic 2.
        let poly = Poly::from_coeffs(vec![9, 7, 5, 1]);
        assert_eq!(poly.derivative(), Poly::from_coeffs(vec![7, 0, 1]));
    }
}
