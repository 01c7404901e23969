//! GF(2^8) arithmetic backing the Reed-Solomon codec.
//!
//! The field is defined by the DataMatrix primitive polynomial 0x012D
//! with generator element 2. Log/exp tables are derived once per field
//! parameter set on first use and are immutable afterwards.

use std::sync::OnceLock;

/// Field order.
pub const FIELD_SIZE: usize = 256;

/// DataMatrix primitive polynomial x^8 + x^5 + x^3 + x^2 + 1.
pub const DATA_MATRIX_PRIMITIVE: u16 = 0x012D;

/// A GF(2^8) field with precomputed log/exp tables.
pub struct GaloisField {
    exp: [u8; FIELD_SIZE],
    log: [u8; FIELD_SIZE],
    primitive: u16,
}

impl GaloisField {
    /// Builds the tables for the given primitive polynomial.
    pub fn new(primitive: u16) -> Self {
        let mut exp = [0u8; FIELD_SIZE];
        let mut log = [0u8; FIELD_SIZE];
        let mut x: u16 = 1;
        for entry in exp.iter_mut() {
            *entry = x as u8;
            x <<= 1;
            if x >= FIELD_SIZE as u16 {
                x ^= primitive;
            }
        }
        for (i, &value) in exp.iter().enumerate().take(FIELD_SIZE - 1) {
            log[value as usize] = i as u8;
        }
        Self {
            exp,
            log,
            primitive,
        }
    }

    /// The process-wide DataMatrix field instance.
    pub fn data_matrix() -> &'static GaloisField {
        static FIELD: OnceLock<GaloisField> = OnceLock::new();
        FIELD.get_or_init(|| GaloisField::new(DATA_MATRIX_PRIMITIVE))
    }

    /// The primitive polynomial this field was built from.
    #[inline]
    pub fn primitive(&self) -> u16 {
        self.primitive
    }

    /// Addition and subtraction coincide in characteristic 2.
    #[inline]
    pub fn add(&self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Field multiplication via the log/exp tables.
    #[inline]
    pub fn multiply(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let index = self.log[a as usize] as usize + self.log[b as usize] as usize;
        self.exp[index % (FIELD_SIZE - 1)]
    }

    /// Multiplicative inverse of a nonzero element.
    #[inline]
    pub fn inverse(&self, a: u8) -> u8 {
        debug_assert_ne!(a, 0, "zero has no inverse");
        self.exp[(FIELD_SIZE - 1) - self.log[a as usize] as usize]
    }

    /// `a / b` for nonzero `b`.
    #[inline]
    pub fn divide(&self, a: u8, b: u8) -> u8 {
        self.multiply(a, self.inverse(b))
    }

    /// The generator raised to `power`.
    #[inline]
    pub fn exp(&self, power: usize) -> u8 {
        self.exp[power % (FIELD_SIZE - 1)]
    }

    /// Discrete log of a nonzero element.
    #[inline]
    pub fn log(&self, a: u8) -> usize {
        debug_assert_ne!(a, 0, "zero has no logarithm");
        self.log[a as usize] as usize
    }
}
