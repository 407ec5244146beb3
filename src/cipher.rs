use crate::error::{Error, Result};

use alloc::vec::Vec;
use core::ops::Deref;

/// An encrypted bit, possibly carrying one plaintext bit per slot.
///
/// Implementations provide the three gates every binary circuit in this crate
/// is built from. `xor` is additive and cheap, `and` is multiplicative and
/// grows the noise.
pub trait CipheredBit: Clone {
    #[must_use]
    fn xor(&self, other: &Self) -> Self;

    #[must_use]
    fn and(&self, other: &Self) -> Self;

    #[must_use]
    fn not(&self) -> Self;

    /// A noiseless encryption of `bit` in every slot, with the same shape as `self`.
    #[must_use]
    fn trivial(&self, bit: bool) -> Self;

    fn slot_count(&self) -> usize;
}

/// The encryption boundary: turns slot vectors of plaintext bits into
/// [`CipheredBit`]s and back.
pub trait EncryptionScheme {
    type Bit: CipheredBit;

    fn slot_count(&self) -> usize;

    /// Encrypts one bit per slot. `bits.len()` must equal [`Self::slot_count`].
    fn encrypt(&self, bits: &[bool]) -> Result<Self::Bit>;

    fn decrypt(&self, bit: &Self::Bit) -> Result<Vec<bool>>;
}

/// A bit-sliced encrypted number.
///
/// Bit `0` is the least significant one. Each bit holds one plaintext bit per
/// slot, so a single `EncryptedBinaryNumber` represents `slot_count` numbers
/// processed in parallel. The width is fixed at construction.
///
/// It dereferences to a slice of [`CipheredBit`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct EncryptedBinaryNumber<C: CipheredBit> {
    bits: Vec<C>,
}

impl<C: CipheredBit> EncryptedBinaryNumber<C> {
    /// Wraps raw encrypted bits, least significant first.
    ///
    /// ## Errors
    ///
    /// `Logic` if `bits` is empty or its bits disagree on the slot count.
    pub fn from_bits(bits: Vec<C>) -> Result<Self> {
        let Some(first) = bits.first() else {
            return Err(Error::logic("an encrypted number needs at least one bit"));
        };
        let slots = first.slot_count();
        if bits.iter().any(|b| b.slot_count() != slots) {
            return Err(Error::logic("bits of an encrypted number disagree on slot count"));
        }
        Ok(Self { bits })
    }

    /// Encrypts one value per slot on `width` bits.
    ///
    /// Slots past `values.len()` hold zero.
    ///
    /// ## Errors
    ///
    /// `Parameter` if `width` is not in `1..=64`, if there are more values than
    /// slots, or if a value does not fit in `width` bits.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::backend::clear::ClearScheme;
    /// use homomod::EncryptedBinaryNumber;
    ///
    /// let scheme = ClearScheme::new(3);
    /// let n = EncryptedBinaryNumber::encrypt(&scheme, &[5, 0, 7], 4).unwrap();
    /// assert_eq!(n.width(), 4);
    /// assert_eq!(n.decrypt(&scheme).unwrap(), vec![5, 0, 7]);
    /// ```
    pub fn encrypt<S>(scheme: &S, values: &[u64], width: usize) -> Result<Self>
    where
        S: EncryptionScheme<Bit = C>,
    {
        if !(1..=64).contains(&width) {
            return Err(Error::parameter(alloc::format!(
                "width must lie in 1..=64, got {width}"
            )));
        }
        let slots = scheme.slot_count();
        if values.len() > slots {
            return Err(Error::parameter(alloc::format!(
                "{} values for {slots} slots",
                values.len()
            )));
        }
        if let Some(v) = values.iter().find(|&&v| width < 64 && v >> width != 0) {
            return Err(Error::parameter(alloc::format!(
                "{v} does not fit in {width} bits"
            )));
        }

        let bits = (0..width)
            .map(|i| {
                let plain: Vec<bool> = (0..slots)
                    .map(|s| values.get(s).is_some_and(|v| (v >> i) & 1 == 1))
                    .collect();
                scheme.encrypt(&plain)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_bits(bits)
    }

    fn decrypt_bits<S>(&self, scheme: &S) -> Result<Vec<Vec<bool>>>
    where
        S: EncryptionScheme<Bit = C>,
    {
        if self.width() > 64 {
            return Err(Error::logic(alloc::format!(
                "cannot decrypt a {}-bit number into 64-bit words",
                self.width()
            )));
        }
        self.bits.iter().map(|b| scheme.decrypt(b)).collect()
    }

    /// Decrypts the unsigned value held in each slot.
    pub fn decrypt<S>(&self, scheme: &S) -> Result<Vec<u64>>
    where
        S: EncryptionScheme<Bit = C>,
    {
        let planes = self.decrypt_bits(scheme)?;
        let slots = planes.first().map_or(0, Vec::len);
        Ok((0..slots)
            .map(|s| {
                planes
                    .iter()
                    .enumerate()
                    .fold(0u64, |acc, (i, plane)| acc | (u64::from(plane[s]) << i))
            })
            .collect())
    }

    /// Decrypts the two's complement value held in each slot.
    pub fn decrypt_signed<S>(&self, scheme: &S) -> Result<Vec<i64>>
    where
        S: EncryptionScheme<Bit = C>,
    {
        let width = self.width();
        let unsigned = self.decrypt(scheme)?;
        Ok(unsigned
            .into_iter()
            .map(|v| {
                if width < 64 && (v >> (width - 1)) & 1 == 1 {
                    (v | (u64::MAX << width)) as i64
                } else {
                    v as i64
                }
            })
            .collect())
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.bits[0].slot_count()
    }

    /// The most significant bit.
    #[must_use]
    pub fn sign_bit(&self) -> &C {
        &self.bits[self.bits.len() - 1]
    }

    /// Copy extended to `width` bits by repeating the sign bit.
    ///
    /// Returns an unchanged copy when `width` is not larger.
    #[must_use]
    pub fn sign_extended(&self, width: usize) -> Self {
        let mut bits = self.bits.clone();
        let sign = self.sign_bit().clone();
        bits.resize(width.max(self.width()), sign);
        Self { bits }
    }

    /// Keeps the `width` least significant bits.
    ///
    /// ## Errors
    ///
    /// `Logic` if `width` is zero.
    pub fn truncated(mut self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::logic("cannot truncate to zero bits"));
        }
        self.bits.truncate(width);
        Ok(self)
    }

    #[must_use]
    pub fn into_bits(self) -> Vec<C> {
        self.bits
    }
}

impl<C: CipheredBit> Deref for EncryptedBinaryNumber<C> {
    type Target = [C];

    fn deref(&self) -> &Self::Target {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::clear::{ClearBit, ClearScheme};

    #[test]
    fn test_encrypt_decrypt() {
        let scheme = ClearScheme::new(4);
        let n = EncryptedBinaryNumber::encrypt(&scheme, &[0, 1, 13, 15], 4).unwrap();
        assert_eq!(n.width(), 4);
        assert_eq!(n.slot_count(), 4);
        assert_eq!(n.decrypt(&scheme).unwrap(), vec![0, 1, 13, 15]);
        assert_eq!(n.decrypt_signed(&scheme).unwrap(), vec![0, 1, -3, -1]);

        let n = EncryptedBinaryNumber::encrypt(&scheme, &[u64::MAX], 64).unwrap();
        assert_eq!(n.decrypt(&scheme).unwrap(), vec![u64::MAX, 0, 0, 0]);
        assert_eq!(n.decrypt_signed(&scheme).unwrap()[0], -1);
    }

    #[test]
    fn test_encrypt_invalid() {
        let scheme = ClearScheme::new(2);
        assert!(EncryptedBinaryNumber::encrypt(&scheme, &[1], 0).is_err());
        assert!(EncryptedBinaryNumber::encrypt(&scheme, &[1], 65).is_err());
        assert!(EncryptedBinaryNumber::encrypt(&scheme, &[1, 2, 3], 4).is_err());
        assert!(matches!(
            EncryptedBinaryNumber::encrypt(&scheme, &[16], 4),
            Err(Error::Parameter(_))
        ));
    }

    #[test]
    fn test_from_bits() {
        assert!(EncryptedBinaryNumber::<ClearBit>::from_bits(vec![]).is_err());
        let mixed = vec![ClearBit::new(vec![true]), ClearBit::new(vec![true, false])];
        assert!(matches!(
            EncryptedBinaryNumber::from_bits(mixed),
            Err(Error::Logic(_))
        ));
    }

    #[test]
    fn test_extend_and_truncate() {
        let scheme = ClearScheme::new(2);
        let n = EncryptedBinaryNumber::encrypt(&scheme, &[0b101, 0b011], 3).unwrap();
        let wide = n.sign_extended(6);
        assert_eq!(wide.width(), 6);
        assert_eq!(wide.decrypt(&scheme).unwrap(), vec![0b111101, 0b000011]);
        assert_eq!(n.sign_extended(2).width(), 3);

        let narrow = wide.truncated(2).unwrap();
        assert_eq!(narrow.decrypt(&scheme).unwrap(), vec![0b01, 0b11]);
        assert!(narrow.truncated(0).is_err());
    }

    #[test]
    fn test_too_wide_to_decrypt() {
        let scheme = ClearScheme::new(1);
        let n = EncryptedBinaryNumber::encrypt(&scheme, &[1], 64)
            .unwrap()
            .sign_extended(65);
        assert!(matches!(n.decrypt(&scheme), Err(Error::Logic(_))));
    }
}
