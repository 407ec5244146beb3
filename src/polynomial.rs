//! Polynomials over `GF(2)`, packed 128 coefficients per word.
//!
//! The coefficient of `X^i` is bit `i % 128` of word `i / 128`. The last word
//! is never zero, except for the zero polynomial which is a single zero word.

use crate::error::{Error, Result};

use alloc::vec::Vec;

pub(crate) type Coefficient = u128;

const BITS: usize = Coefficient::BITS as usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<Coefficient>,
    degree: usize,
}

impl Polynomial {
    /// Builds a polynomial from packed coefficients. Trailing zero words are dropped.
    #[must_use]
    pub fn new(mut coefficients: Vec<Coefficient>) -> Self {
        while coefficients.len() > 1 && coefficients.last() == Some(&0) {
            coefficients.pop();
        }
        if coefficients.is_empty() {
            coefficients.push(0);
        }
        let degree = Self::compute_degree(&coefficients);
        Self {
            coefficients,
            degree,
        }
    }

    fn compute_degree(coefficients: &[Coefficient]) -> usize {
        coefficients
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &c)| c != 0)
            .map_or(0, |(i, &c)| BITS - 1 - c.leading_zeros() as usize + BITS * i)
    }

    #[must_use]
    pub fn zero() -> Self {
        Self {
            coefficients: alloc::vec![0],
            degree: 0,
        }
    }

    /// The constant polynomial `bit`.
    #[must_use]
    pub fn constant(bit: bool) -> Self {
        Self {
            coefficients: alloc::vec![Coefficient::from(bit)],
            degree: 0,
        }
    }

    #[must_use]
    pub fn monomial(degree: usize) -> Self {
        let mut coefficients = alloc::vec![0; degree / BITS + 1];
        coefficients[degree / BITS] = 1 << (degree % BITS);
        Self {
            coefficients,
            degree,
        }
    }

    /// A uniformly random polynomial of exactly `degree`.
    ///
    /// ## Errors
    ///
    /// `Parameter` if the system random source fails.
    pub fn random(degree: usize) -> Result<Self> {
        let words = degree / BITS + 1;
        let mut bytes = alloc::vec![0u8; words * core::mem::size_of::<Coefficient>()];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| Error::parameter(alloc::format!("random source failed: {e}")))?;

        let mut coefficients: Vec<Coefficient> = bytes
            .chunks_exact(core::mem::size_of::<Coefficient>())
            .map(|chunk| {
                let mut array = [0; core::mem::size_of::<Coefficient>()];
                array.copy_from_slice(chunk);
                Coefficient::from_le_bytes(array)
            })
            .collect();

        let top = degree % BITS;
        let mask = if top == BITS - 1 {
            Coefficient::MAX
        } else {
            (1 << (top + 1)) - 1
        };
        coefficients[words - 1] &= mask;
        coefficients[words - 1] |= 1 << top;

        Ok(Self {
            coefficients,
            degree,
        })
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|&c| c == 0)
    }

    #[must_use]
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Value at `X = x`.
    #[must_use]
    pub fn evaluate(&self, x: bool) -> bool {
        if x {
            self.coefficients
                .iter()
                .fold(0, |acc, c| acc ^ (c.count_ones() & 1))
                == 1
        } else {
            self.coefficients[0] & 1 == 1
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..len)
            .map(|i| {
                self.coefficients.get(i).copied().unwrap_or(0)
                    ^ other.coefficients.get(i).copied().unwrap_or(0)
            })
            .collect();
        Self::new(coefficients)
    }

    /// Carry-less product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut result = alloc::vec![0; self.coefficients.len() + other.coefficients.len()];
        for (i, &word) in self.coefficients.iter().enumerate() {
            let mut word = word;
            while word != 0 {
                let k = word.trailing_zeros() as usize;
                word &= word - 1;
                for (j, &b) in other.coefficients.iter().enumerate() {
                    result[i + j] ^= b << k;
                    if k > 0 {
                        result[i + j + 1] ^= b >> (BITS - k);
                    }
                }
            }
        }
        Self::new(result)
    }

    /// Remainder of the division by `other`.
    ///
    /// The zero polynomial divides nothing: dividing by it returns `self`.
    #[must_use]
    pub fn rem(&self, other: &Self) -> Self {
        if other.is_zero() {
            return self.clone();
        }
        let mut r = self.coefficients.clone();
        let o_degree = other.degree;

        while r.iter().any(|&c| c != 0) {
            let r_degree = Self::compute_degree(&r);
            if r_degree < o_degree {
                break;
            }
            let shift = r_degree - o_degree;
            let block = shift / BITS;
            let bit = shift % BITS;
            for (i, &c) in other.coefficients.iter().enumerate() {
                r[block + i] ^= c << bit;
                if bit > 0 && block + i + 1 < r.len() {
                    r[block + i + 1] ^= c >> (BITS - bit);
                }
            }
        }

        Self::new(r)
    }

    /// Overwrites the coefficients with zeros.
    pub(crate) fn zeroize(&mut self) {
        for c in &mut self.coefficients {
            // Volatile so the write is not elided on a value about to be dropped.
            unsafe { core::ptr::write_volatile(c, 0) };
        }
        self.degree = 0;
    }

    /// Little-endian bytes of the packed coefficients.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.coefficients
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect()
    }

    /// Inverse of [`Polynomial::to_bytes`]. A short last chunk is zero-padded.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let coefficients = bytes
            .chunks(core::mem::size_of::<Coefficient>())
            .map(|chunk| {
                let mut array = [0; core::mem::size_of::<Coefficient>()];
                array[..chunk.len()].copy_from_slice(chunk);
                Coefficient::from_le_bytes(array)
            })
            .collect();
        Self::new(coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree() {
        assert_eq!(Polynomial::compute_degree(&[0b10010]), 4);
        assert_eq!(Polynomial::compute_degree(&[1, 0b10]), 129);
        assert_eq!(Polynomial::new(vec![0b10010, 0, 0]).coefficients().len(), 1);
        assert_eq!(Polynomial::new(vec![]), Polynomial::zero());
    }

    #[test]
    fn test_random() {
        for degree in [0, 5, 127, 128, 300] {
            let p = Polynomial::random(degree).unwrap();
            assert_eq!(p.degree(), degree);
            assert_eq!(Polynomial::compute_degree(p.coefficients()), degree);
        }
    }

    #[test]
    fn test_monomial_and_constant() {
        assert_eq!(Polynomial::monomial(130).degree(), 130);
        assert_eq!(Polynomial::monomial(0), Polynomial::constant(true));
        assert!(Polynomial::constant(false).is_zero());
    }

    #[test]
    fn test_evaluate() {
        let p = Polynomial::new(vec![0b1001]);
        assert!(!p.evaluate(true));
        assert!(p.evaluate(false));

        let p = Polynomial::new(vec![0b111100010, 0b1001]);
        assert!(p.evaluate(true));
        assert!(!p.evaluate(false));
    }

    #[test]
    fn test_add() {
        let p = Polynomial::new(vec![0b1001]).add(&Polynomial::new(vec![0b0011]));
        assert_eq!(p.coefficients(), &[0b1010]);

        let p = Polynomial::new(vec![0b1001, 0b1]).add(&Polynomial::new(vec![0b0101, 0b1]));
        assert_eq!(p.coefficients(), &[0b1100]);
        assert_eq!(p.degree(), 3);
    }

    #[test]
    fn test_mul() {
        let p = Polynomial::new(vec![0b1001]).mul(&Polynomial::new(vec![0b11]));
        assert_eq!(p.coefficients(), &[0b11011]);

        let p = Polynomial::new(vec![0b111]).mul(&Polynomial::new(vec![0b11]));
        assert_eq!(p.coefficients(), &[0b1001]);

        let p = Polynomial::new(vec![u128::MAX]).mul(&Polynomial::new(vec![0b11]));
        assert_eq!(p.coefficients(), &[0b1, 0b1]);
        assert_eq!(p.degree(), 128);

        assert!(Polynomial::zero().mul(&p).is_zero());
    }

    #[test]
    fn test_rem() {
        let p = Polynomial::new(vec![0b1001]).rem(&Polynomial::new(vec![0b11]));
        assert!(p.is_zero());

        let p = Polynomial::new(vec![0b1]).rem(&Polynomial::new(vec![0b10]));
        assert_eq!(p.coefficients(), &[0b1]);

        let p = Polynomial::new(vec![0b1010101101]).rem(&Polynomial::new(vec![0b11011]));
        assert_eq!(p.coefficients(), &[0b1010]);
    }

    #[test]
    fn test_mul_then_rem() {
        let s = Polynomial::random(200).unwrap();
        let q = Polynomial::random(150).unwrap();
        let r = Polynomial::random(60).unwrap();
        let c = s.mul(&q).add(&r);
        assert_eq!(c.rem(&s), r);
    }

    #[test]
    fn test_bytes() {
        let p = Polynomial::random(300).unwrap();
        assert_eq!(Polynomial::from_bytes(&p.to_bytes()), p);
        assert_eq!(Polynomial::from_bytes(&[5, 14, 8]).coefficients(), &[0x080e05]);
    }

    #[test]
    fn test_zeroize() {
        let mut p = Polynomial::random(300).unwrap();
        p.zeroize();
        assert!(p.is_zero());
    }
}
