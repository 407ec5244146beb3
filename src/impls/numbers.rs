//! Arithmetic, comparison and multiplexing on bit-sliced encrypted numbers.
//!
//! Operands are two's complement. Operands of different widths are
//! sign-extended to the widest one. Every function runs the same gates
//! whatever the encrypted values are.

use crate::cipher::{CipheredBit, EncryptedBinaryNumber};
use crate::error::{Error, Result};
use crate::operations::{HomomorphicOperation1, HomomorphicOperation2};

use alloc::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Represents homomorphic xor gate over numbers, bitwise
pub struct HomomorphicXorGate;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Represents homomorphic not gate over numbers, bitwise
pub struct HomomorphicNotGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Represents homomorphic additive operation over numbers
pub struct HomomorphicAddition;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Represents homomorphic subtractive operation over numbers
pub struct HomomorphicSubtraction;

/// Encrypted outcome of `a < b`, one indicator per slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison<C: CipheredBit> {
    /// Encrypts `1` where `a < b`.
    pub lt: C,
    /// Encrypts `1` where `a >= b`. Always the negation of `lt`.
    pub ge: C,
}

fn check_slots<C: CipheredBit>(a: &EncryptedBinaryNumber<C>, b: &EncryptedBinaryNumber<C>) -> Result<()> {
    if a.slot_count() == b.slot_count() {
        Ok(())
    } else {
        Err(Error::logic(alloc::format!(
            "operands disagree on slot count: {} and {}",
            a.slot_count(),
            b.slot_count()
        )))
    }
}

/// `(a & b) ^ (c & (a ^ b))`, the majority of three bits.
fn carry<C: CipheredBit>(a: &C, b: &C, c: &C) -> C {
    a.and(b).xor(&c.and(&a.xor(b)))
}

/// Sum bits of `a + (b ^ invert) + invert` on `width` bits.
fn ripple<C: CipheredBit>(
    a: &EncryptedBinaryNumber<C>,
    b: &EncryptedBinaryNumber<C>,
    invert: bool,
    width: usize,
) -> Vec<C> {
    let a = a.sign_extended(width);
    let b = b.sign_extended(width);
    let mut c = a[0].trivial(invert);
    let mut sum = Vec::with_capacity(width);
    for (x, y) in a.iter().zip(b.iter()) {
        let y = if invert { y.not() } else { y.clone() };
        sum.push(x.xor(&y).xor(&c));
        c = carry(x, &y, &c);
    }
    sum
}

/// Two's complement sum on `max(a.width(), b.width()) + 1` bits, which cannot overflow.
///
/// ## Errors
///
/// `Logic` if the operands disagree on slot count.
pub fn add<C: CipheredBit>(
    a: &EncryptedBinaryNumber<C>,
    b: &EncryptedBinaryNumber<C>,
) -> Result<EncryptedBinaryNumber<C>> {
    check_slots(a, b)?;
    let width = a.width().max(b.width()) + 1;
    EncryptedBinaryNumber::from_bits(ripple(a, b, false, width))
}

/// Two's complement difference `a - b` on `max(a.width(), b.width()) + 1` bits.
///
/// Computed as `a + !b + 1` over the sign-extended operands.
///
/// ## Errors
///
/// `Logic` if the operands disagree on slot count.
///
/// ## Examples
///
/// ```
/// use homomod::backend::clear::ClearScheme;
/// use homomod::impls::numbers::subtract;
/// use homomod::EncryptedBinaryNumber;
///
/// let scheme = ClearScheme::new(2);
/// let a = EncryptedBinaryNumber::encrypt(&scheme, &[2, 7], 4).unwrap();
/// let b = EncryptedBinaryNumber::encrypt(&scheme, &[6, 6], 4).unwrap();
///
/// let diff = subtract(&a, &b).unwrap();
/// assert_eq!(diff.width(), 5);
/// assert_eq!(diff.decrypt_signed(&scheme).unwrap(), vec![-4, 1]);
/// ```
pub fn subtract<C: CipheredBit>(
    a: &EncryptedBinaryNumber<C>,
    b: &EncryptedBinaryNumber<C>,
) -> Result<EncryptedBinaryNumber<C>> {
    check_slots(a, b)?;
    let width = a.width().max(b.width()) + 1;
    EncryptedBinaryNumber::from_bits(ripple(a, b, true, width))
}

/// Signed comparison of `a` and `b`.
///
/// Only the carry chain of `a - b` is evaluated, and its sign bit becomes
/// `lt`. The result is encrypted: nothing about the outcome leaks through
/// control flow.
///
/// ## Errors
///
/// `Logic` if the operands disagree on slot count.
pub fn compare_less_than<C: CipheredBit>(
    a: &EncryptedBinaryNumber<C>,
    b: &EncryptedBinaryNumber<C>,
) -> Result<Comparison<C>> {
    check_slots(a, b)?;
    let top = a.width().max(b.width());
    let a = a.sign_extended(top + 1);
    let b = b.sign_extended(top + 1);

    let mut c = a[0].trivial(true);
    for (x, y) in a.iter().zip(b.iter()).take(top) {
        c = carry(x, &y.not(), &c);
    }
    let lt = a[top].xor(&b[top].not()).xor(&c);
    let ge = lt.not();
    Ok(Comparison { lt, ge })
}

/// Bitwise multiplexer: `x` in the slots where `condition` encrypts `1`,
/// `y` elsewhere.
///
/// Evaluated as `y ^ (condition & (x ^ y))`, never as a branch.
///
/// ## Errors
///
/// `Logic` if `x` and `y` differ in width, or if the three operands
/// disagree on slot count.
pub fn select<C: CipheredBit>(
    condition: &C,
    x: &EncryptedBinaryNumber<C>,
    y: &EncryptedBinaryNumber<C>,
) -> Result<EncryptedBinaryNumber<C>> {
    if x.width() != y.width() {
        return Err(Error::logic(alloc::format!(
            "select operands differ in width: {} and {}",
            x.width(),
            y.width()
        )));
    }
    check_slots(x, y)?;
    if condition.slot_count() != x.slot_count() {
        return Err(Error::logic("select condition disagrees on slot count"));
    }
    let bits = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| yi.xor(&condition.and(&xi.xor(yi))))
        .collect();
    EncryptedBinaryNumber::from_bits(bits)
}

impl<C: CipheredBit> HomomorphicOperation2<C> for HomomorphicAddition {
    fn apply(
        a: &EncryptedBinaryNumber<C>,
        b: &EncryptedBinaryNumber<C>,
    ) -> Result<EncryptedBinaryNumber<C>> {
        add(a, b)
    }
}

impl<C: CipheredBit> HomomorphicOperation2<C> for HomomorphicSubtraction {
    fn apply(
        a: &EncryptedBinaryNumber<C>,
        b: &EncryptedBinaryNumber<C>,
    ) -> Result<EncryptedBinaryNumber<C>> {
        subtract(a, b)
    }
}

impl<C: CipheredBit> HomomorphicOperation2<C> for HomomorphicXorGate {
    fn apply(
        a: &EncryptedBinaryNumber<C>,
        b: &EncryptedBinaryNumber<C>,
    ) -> Result<EncryptedBinaryNumber<C>> {
        if a.width() != b.width() {
            return Err(Error::logic("xor operands differ in width"));
        }
        check_slots(a, b)?;
        EncryptedBinaryNumber::from_bits(a.iter().zip(b.iter()).map(|(x, y)| x.xor(y)).collect())
    }
}

impl<C: CipheredBit> HomomorphicOperation1<C> for HomomorphicNotGate {
    fn apply(a: &EncryptedBinaryNumber<C>) -> Result<EncryptedBinaryNumber<C>> {
        EncryptedBinaryNumber::from_bits(a.iter().map(CipheredBit::not).collect())
    }
}
