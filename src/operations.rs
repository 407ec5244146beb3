//! Traits for homomorphic operations on encrypted numbers.
//!
//! There are 2 traits:
//!
//! - `HomomorphicOperation1<C: CipheredBit>`
//! - `HomomorphicOperation2<C: CipheredBit>`
//!
//! Each one bounds a single function, `apply`, taking respectively 1 and 2
//! [`EncryptedBinaryNumber`]s. Inside `apply` you work on raw encrypted bits
//! through the gates of [`CipheredBit`], as `EncryptedBinaryNumber` derefs to
//! a slice of them.
//!
//! Operations never branch on encrypted content. Their cost under a noisy
//! scheme is the number of fresh ciphertexts the deepest `and` chain
//! multiplies together, which the implementor should document.

use crate::cipher::{CipheredBit, EncryptedBinaryNumber};
use crate::error::Result;

/// A homomorphic operation on a single encrypted number.
///
/// ## Example
///
/// ```rust
/// use homomod::prelude::*;
///
/// /// Shifts left by one bit, dropping the top bit.
/// struct Double;
///
/// impl<C: CipheredBit> HomomorphicOperation1<C> for Double {
///     fn apply(a: &EncryptedBinaryNumber<C>) -> homomod::Result<EncryptedBinaryNumber<C>> {
///         let mut bits = vec![a[0].trivial(false)];
///         bits.extend_from_slice(&a[..a.width() - 1]);
///         EncryptedBinaryNumber::from_bits(bits)
///     }
/// }
///
/// let scheme = ClearScheme::new(2);
/// let a = EncryptedBinaryNumber::encrypt(&scheme, &[3, 5], 4).unwrap();
/// let b = Double::apply(&a).unwrap();
/// assert_eq!(b.decrypt(&scheme).unwrap(), vec![6, 10]);
/// ```
pub trait HomomorphicOperation1<C: CipheredBit> {
    /// ## Errors
    ///
    /// Implementation defined, typically `Logic` on malformed operands.
    fn apply(a: &EncryptedBinaryNumber<C>) -> Result<EncryptedBinaryNumber<C>>;
}

/// A homomorphic operation between two encrypted numbers.
///
/// ## Example
///
/// ```rust
/// use homomod::prelude::*;
///
/// let scheme = ClearScheme::new(1);
/// let a = EncryptedBinaryNumber::encrypt(&scheme, &[9], 5).unwrap();
/// let b = EncryptedBinaryNumber::encrypt(&scheme, &[4], 5).unwrap();
///
/// let c = HomomorphicSubtraction::apply(&a, &b).unwrap();
/// assert_eq!(c.width(), 6);
/// assert_eq!(c.decrypt_signed(&scheme).unwrap(), vec![5]);
/// ```
pub trait HomomorphicOperation2<C: CipheredBit> {
    /// ## Errors
    ///
    /// Implementation defined, typically `Logic` on malformed operands.
    fn apply(
        a: &EncryptedBinaryNumber<C>,
        b: &EncryptedBinaryNumber<C>,
    ) -> Result<EncryptedBinaryNumber<C>>;
}
