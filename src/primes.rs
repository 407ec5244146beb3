//! Handles into the modulus chain and the prime search that fills it.

use crate::error::{Error, Result};

use alloc::vec::Vec;
use core::ops::BitOr;
use primality_test::is_prime;
use serde::{Deserialize, Serialize};

/// An ordered set of prime handles (positions in the context's moduli).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndexSet {
    // Sorted, no duplicates.
    elems: Vec<usize>,
}

impl IndexSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { elems: Vec::new() }
    }

    /// The interval `[first, last]`, empty when `first > last`.
    #[must_use]
    pub fn interval(first: usize, last: usize) -> Self {
        Self {
            elems: (first..=last).collect(),
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.elems.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.elems.last().copied()
    }

    /// Number of handles in the set.
    #[must_use]
    pub fn card(&self) -> usize {
        self.elems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    #[must_use]
    pub fn contains(&self, i: usize) -> bool {
        self.elems.binary_search(&i).is_ok()
    }

    /// Inserts `i`, returning `false` if it was already present.
    pub fn insert(&mut self, i: usize) -> bool {
        match self.elems.binary_search(&i) {
            Ok(_) => false,
            Err(pos) => {
                self.elems.insert(pos, i);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.elems.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.elems.iter().copied()
    }

    /// `true` when the set is empty or holds every handle between its ends.
    #[must_use]
    pub fn is_interval(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last - first + 1 == self.card(),
            _ => true,
        }
    }

    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.iter().any(|i| other.contains(i))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.elems
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut elems: Vec<usize> = iter.into_iter().collect();
        elems.sort_unstable();
        elems.dedup();
        Self { elems }
    }
}

impl BitOr for &IndexSet {
    type Output = IndexSet;

    fn bitor(self, rhs: Self) -> IndexSet {
        let mut elems = Vec::with_capacity(self.card() + rhs.card());
        let (mut a, mut b) = (self.elems.iter().peekable(), rhs.elems.iter().peekable());
        loop {
            let next = match (a.peek(), b.peek()) {
                (Some(&&x), Some(&&y)) if x < y => a.next(),
                (Some(&&x), Some(&&y)) if y < x => b.next(),
                (Some(_), Some(_)) => {
                    b.next();
                    a.next()
                }
                (Some(_), None) => a.next(),
                (None, Some(_)) => b.next(),
                (None, None) => break,
            };
            if let Some(&v) = next {
                elems.push(v);
            }
        }
        IndexSet { elems }
    }
}

impl BitOr for IndexSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        &self | &rhs
    }
}

/// Role a prime plays in the modulus chain.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub enum PrimeRole {
    /// Carries ciphertext data, consumed level by level.
    Ctxt,
    /// Only used during key switching.
    Special,
    /// Smaller primes that allow finer modulus switching.
    Small,
}

impl core::fmt::Display for PrimeRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Ctxt => "ctxt",
            Self::Special => "special",
            Self::Small => "small",
        })
    }
}

/// An [`IndexSet`] tagged with the role of the primes it designates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeSet {
    role: PrimeRole,
    handles: IndexSet,
}

impl PrimeSet {
    #[must_use]
    pub const fn new(role: PrimeRole) -> Self {
        Self {
            role,
            handles: IndexSet::new(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> PrimeRole {
        self.role
    }

    #[must_use]
    pub const fn handles(&self) -> &IndexSet {
        &self.handles
    }

    pub(crate) fn insert(&mut self, handle: usize) -> bool {
        self.handles.insert(handle)
    }

    pub(crate) fn clear(&mut self) {
        self.handles.clear();
    }
}

impl core::ops::Deref for PrimeSet {
    type Target = IndexSet;

    fn deref(&self) -> &Self::Target {
        &self.handles
    }
}

/// Enumerates primes `q = k*m + 1` of exactly `bits` bits, largest first.
///
/// The search is bounded: once the candidates leave the bit size the
/// generator reports [`Error::ParameterSearch`].
#[derive(Clone, Debug)]
pub struct PrimeGenerator {
    bits: u32,
    step: u64,
    k: u64,
    k_min: u64,
}

impl PrimeGenerator {
    /// ## Arguments
    ///
    /// * `bits` - Bit size of the generated primes, in `2..=62`.
    /// * `m` - Every generated prime is `1 mod m`.
    pub fn new(bits: u32, m: u64) -> Result<Self> {
        if !(2..=62).contains(&bits) {
            return Err(Error::parameter(alloc::format!(
                "prime size must lie in 2..=62 bits, got {bits}"
            )));
        }
        if m == 0 {
            return Err(Error::parameter("m must be positive"));
        }
        // Odd candidates only.
        let step = if m % 2 == 1 { 2 * m } else { m };
        let upper: u64 = 1 << bits;
        let lower: u64 = 1 << (bits - 1);
        // Largest k with k*step + 1 < 2^bits, smallest with k*step + 1 >= 2^(bits-1).
        let k = (upper - 2) / step;
        let k_min = (lower - 1).div_ceil(step);

        Ok(Self {
            bits,
            step,
            k,
            k_min,
        })
    }

    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns the next prime, in decreasing order.
    pub fn next_prime(&mut self) -> Result<u64> {
        while self.k >= self.k_min && self.k > 0 {
            let candidate = self.k * self.step + 1;
            self.k -= 1;
            if is_prime(candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::search(alloc::format!(
            "no more {}-bit primes congruent to 1 mod {}",
            self.bits,
            self.step
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_set() {
        let mut s = IndexSet::new();
        assert!(s.is_empty());
        assert!(s.is_interval());
        assert!(s.insert(4));
        assert!(s.insert(2));
        assert!(!s.insert(4));
        assert_eq!(s.first(), Some(2));
        assert_eq!(s.last(), Some(4));
        assert_eq!(s.card(), 2);
        assert!(!s.is_interval());
        s.insert(3);
        assert!(s.is_interval());
        assert!(s.contains(3));
        assert!(!s.contains(5));
    }

    #[test]
    fn test_index_set_union() {
        let a: IndexSet = [0, 2, 4].into_iter().collect();
        let b: IndexSet = [1, 2, 7].into_iter().collect();
        let u = &a | &b;
        assert_eq!(u.as_slice(), &[0, 1, 2, 4, 7]);
        assert_eq!(&u | &IndexSet::new(), u);
        assert!(!a.is_disjoint(&b));
        assert!(a.is_disjoint(&IndexSet::interval(5, 6)));
        assert!(IndexSet::interval(3, 2).is_empty());
    }

    #[test]
    fn test_prime_set() {
        let mut s = PrimeSet::new(PrimeRole::Special);
        s.insert(3);
        assert_eq!(s.role(), PrimeRole::Special);
        assert_eq!(s.card(), 1);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_generator() {
        for (bits, m) in [(60, 3), (61, 4369), (40, 1 << 12), (43, 31)] {
            let mut generator = PrimeGenerator::new(bits, m).unwrap();
            let mut prev = u64::MAX;
            for _ in 0..5 {
                let q = generator.next_prime().unwrap();
                assert!(is_prime(q));
                assert_eq!(q % m, 1);
                assert_eq!(64 - q.leading_zeros(), bits);
                assert!(q < prev);
                prev = q;
            }
        }
    }

    #[test]
    fn test_generator_exhaustion() {
        // 5-bit primes that are 1 mod 8: 17 only.
        let mut generator = PrimeGenerator::new(5, 8).unwrap();
        assert_eq!(generator.next_prime(), Ok(17));
        assert!(matches!(generator.next_prime(), Err(Error::ParameterSearch(_))));
    }

    #[test]
    fn test_generator_invalid() {
        assert!(PrimeGenerator::new(1, 3).is_err());
        assert!(PrimeGenerator::new(63, 3).is_err());
        assert!(PrimeGenerator::new(20, 0).is_err());
    }
}
