//! An insecure identity scheme with any number of slots.
//!
//! Ciphertexts are the plaintext bits themselves. It exercises circuits over
//! large parameter ranges in a fraction of the time a real scheme needs, and
//! tracks the multiplicative depth every bit would have under encryption.

use crate::cipher::{CipheredBit, EncryptionScheme};
use crate::error::{Error, Result};

use alloc::vec::Vec;

/// A bit in the clear, one value per slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearBit {
    slots: Vec<bool>,
    depth: u32,
}

impl ClearBit {
    #[must_use]
    pub fn new(slots: Vec<bool>) -> Self {
        Self { slots, depth: 0 }
    }

    #[must_use]
    pub fn slots(&self) -> &[bool] {
        &self.slots
    }

    /// Number of `and` gates on the longest path that produced this bit.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    fn zip_with(&self, other: &Self, f: impl Fn(bool, bool) -> bool, depth: u32) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .zip(&other.slots)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            depth,
        }
    }
}

impl CipheredBit for ClearBit {
    fn xor(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a ^ b, self.depth.max(other.depth))
    }

    fn and(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b, self.depth.max(other.depth) + 1)
    }

    fn not(&self) -> Self {
        Self {
            slots: self.slots.iter().map(|&a| !a).collect(),
            depth: self.depth,
        }
    }

    fn trivial(&self, bit: bool) -> Self {
        Self {
            slots: alloc::vec![bit; self.slots.len()],
            depth: 0,
        }
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// The identity "encryption" over `slots` slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClearScheme {
    slots: usize,
}

impl ClearScheme {
    #[must_use]
    pub const fn new(slots: usize) -> Self {
        Self { slots }
    }
}

impl EncryptionScheme for ClearScheme {
    type Bit = ClearBit;

    fn slot_count(&self) -> usize {
        self.slots
    }

    fn encrypt(&self, bits: &[bool]) -> Result<ClearBit> {
        if bits.len() != self.slots {
            return Err(Error::parameter(alloc::format!(
                "{} bits for {} slots",
                bits.len(),
                self.slots
            )));
        }
        Ok(ClearBit::new(bits.to_vec()))
    }

    fn decrypt(&self, bit: &ClearBit) -> Result<Vec<bool>> {
        if bit.slot_count() != self.slots {
            return Err(Error::logic(alloc::format!(
                "bit has {} slots, scheme has {}",
                bit.slot_count(),
                self.slots
            )));
        }
        Ok(bit.slots.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gates() {
        let a = ClearBit::new(vec![false, false, true, true]);
        let b = ClearBit::new(vec![false, true, false, true]);
        assert_eq!(a.xor(&b).slots(), &[false, true, true, false]);
        assert_eq!(a.and(&b).slots(), &[false, false, false, true]);
        assert_eq!(a.not().slots(), &[true, true, false, false]);
        assert_eq!(a.trivial(true).slots(), &[true; 4]);
    }

    #[test]
    fn test_depth() {
        let a = ClearBit::new(vec![true]);
        let ab = a.and(&a);
        assert_eq!(ab.depth(), 1);
        assert_eq!(ab.xor(&a).depth(), 1);
        assert_eq!(ab.and(&a).not().depth(), 2);
        assert_eq!(ab.trivial(false).depth(), 0);
    }

    #[test]
    fn test_scheme() {
        let scheme = ClearScheme::new(2);
        let bit = scheme.encrypt(&[true, false]).unwrap();
        assert_eq!(scheme.decrypt(&bit).unwrap(), vec![true, false]);
        assert!(scheme.encrypt(&[true]).is_err());
        assert!(ClearScheme::new(3).decrypt(&bit).is_err());
    }
}
