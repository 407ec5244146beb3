//! Oblivious reduction of an encrypted number modulo another.
//!
//! Each iteration subtracts the modulus from the dividend in every slot
//! where the dividend is not smaller, using only encrypted indicators. The
//! number of iterations is public and fixed in advance, so the work done
//! never depends on the encrypted values.
//!
//! ```
//! use homomod::backend::clear::ClearScheme;
//! use homomod::{EncryptedBinaryNumber, IterationBound, ModularReducer};
//!
//! let scheme = ClearScheme::new(1);
//! let a = EncryptedBinaryNumber::encrypt(&scheme, &[20], 6).unwrap();
//! let m = EncryptedBinaryNumber::encrypt(&scheme, &[6], 6).unwrap();
//!
//! let r = ModularReducer::new(IterationBound::exact(6)).run(a, &m).unwrap();
//! assert_eq!(r.decrypt(&scheme).unwrap(), vec![2]);
//! ```

use crate::cipher::{CipheredBit, EncryptedBinaryNumber};
use crate::error::{Error, Result};
use crate::impls::numbers::{compare_less_than, select, subtract, Comparison};

use tracing::{instrument, trace};

/// Number of conditional subtractions a reduction performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IterationBound(u64);

impl IterationBound {
    /// A bound chosen by the caller.
    ///
    /// The caller must make sure it covers the largest possible quotient.
    /// Deriving it from a secret value, such as the modulus itself before
    /// encryption, leaks that value through the running time.
    #[must_use]
    pub const fn exact(iterations: u64) -> Self {
        Self(iterations)
    }

    /// The worst case over public parameters only: enough iterations for any
    /// dividend on `dividend_bits` bits and any modulus of at least
    /// `min_modulus`.
    ///
    /// ## Returns
    ///
    /// `ceil((2^dividend_bits - 1) / min_modulus)` iterations.
    ///
    /// ## Errors
    ///
    /// `Parameter` if `min_modulus` is zero or `dividend_bits` is not in `1..=64`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::IterationBound;
    ///
    /// let bound = IterationBound::worst_case(5, 6).unwrap();
    /// assert_eq!(bound.iterations(), 6);
    /// ```
    pub fn worst_case(dividend_bits: u32, min_modulus: u64) -> Result<Self> {
        if min_modulus == 0 {
            return Err(Error::parameter("modulus lower bound must be positive"));
        }
        if !(1..=64).contains(&dividend_bits) {
            return Err(Error::parameter(alloc::format!(
                "dividend width must lie in 1..=64, got {dividend_bits}"
            )));
        }
        let max_dividend = u64::MAX >> (64 - dividend_bits);
        Ok(Self(max_dividend.div_ceil(min_modulus)))
    }

    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.0
    }
}

/// Where a [`Reduction`] stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReductionState {
    Init,
    /// The next iteration to run.
    Reducing(u64),
    Done,
}

/// A reduction in progress, advanced one iteration at a time.
#[derive(Clone, Debug)]
pub struct Reduction<C: CipheredBit> {
    a: EncryptedBinaryNumber<C>,
    m: EncryptedBinaryNumber<C>,
    bound: IterationBound,
    state: ReductionState,
}

impl<C: CipheredBit> Reduction<C> {
    /// Prepares the reduction of `a` modulo `m`.
    ///
    /// Both operands must have the same width `L`, with a zero top bit so
    /// that the intermediate differences stay in range.
    ///
    /// ## Errors
    ///
    /// `Logic` if the operands differ in width or slot count.
    pub fn new(
        a: EncryptedBinaryNumber<C>,
        m: EncryptedBinaryNumber<C>,
        bound: IterationBound,
    ) -> Result<Self> {
        if a.width() != m.width() {
            return Err(Error::logic(alloc::format!(
                "dividend has {} bits, modulus has {}",
                a.width(),
                m.width()
            )));
        }
        if a.slot_count() != m.slot_count() {
            return Err(Error::logic("dividend and modulus disagree on slot count"));
        }
        Ok(Self {
            a,
            m,
            bound,
            state: ReductionState::Init,
        })
    }

    #[must_use]
    pub const fn state(&self) -> ReductionState {
        self.state
    }

    /// The dividend after the iterations run so far.
    #[must_use]
    pub const fn current(&self) -> &EncryptedBinaryNumber<C> {
        &self.a
    }

    /// Runs one iteration, or moves to `Done` when the bound is reached.
    ///
    /// ## Errors
    ///
    /// `Logic` if the reduction is already done.
    pub fn step(&mut self) -> Result<ReductionState> {
        let i = match self.state {
            ReductionState::Done => {
                return Err(Error::logic("reduction already done"));
            }
            ReductionState::Init => 0,
            ReductionState::Reducing(i) => i,
        };
        if i >= self.bound.iterations() {
            self.state = ReductionState::Done;
            return Ok(self.state);
        }

        let width = self.a.width();
        let diff = subtract(&self.a, &self.m)?.truncated(width)?;
        let Comparison { ge, .. } = compare_less_than(&self.a, &self.m)?;
        self.a = select(&ge, &diff, &self.a)?;
        trace!(iteration = i, bound = self.bound.iterations(), "reduction step");

        self.state = if i + 1 < self.bound.iterations() {
            ReductionState::Reducing(i + 1)
        } else {
            ReductionState::Done
        };
        Ok(self.state)
    }

    /// Runs the remaining iterations and returns the result.
    ///
    /// ## Errors
    ///
    /// `Logic` if the reduction is already done.
    pub fn finish(mut self) -> Result<EncryptedBinaryNumber<C>> {
        if self.state == ReductionState::Done {
            return Err(Error::logic("reduction already done"));
        }
        while self.step()? != ReductionState::Done {}
        Ok(self.a)
    }

    #[must_use]
    pub fn into_current(self) -> EncryptedBinaryNumber<C> {
        self.a
    }
}

/// Reduces encrypted numbers modulo encrypted moduli with a fixed number of
/// iterations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModularReducer {
    bound: IterationBound,
}

impl ModularReducer {
    #[must_use]
    pub const fn new(bound: IterationBound) -> Self {
        Self { bound }
    }

    #[must_use]
    pub const fn bound(&self) -> IterationBound {
        self.bound
    }

    /// Starts a stepwise reduction.
    ///
    /// ## Errors
    ///
    /// See [`Reduction::new`].
    pub fn start<C: CipheredBit>(
        &self,
        a: EncryptedBinaryNumber<C>,
        m: &EncryptedBinaryNumber<C>,
    ) -> Result<Reduction<C>> {
        Reduction::new(a, m.clone(), self.bound)
    }

    /// Computes `a mod m` in every slot.
    ///
    /// ## Arguments
    ///
    /// * `a` - The dividend, `L` bits with a zero top bit.
    /// * `m` - The modulus, same width and slot count as `a`, positive.
    ///
    /// ## Returns
    ///
    /// `a mod m` on `L` bits, provided the bound covers the quotient of
    /// every slot. A bound that is too small leaves a partially reduced
    /// value; this is not detected.
    ///
    /// ## Errors
    ///
    /// `Logic` if the operands differ in width or slot count.
    #[instrument(skip_all, fields(width = a.width(), bound = self.bound.iterations()))]
    pub fn run<C: CipheredBit>(
        &self,
        a: EncryptedBinaryNumber<C>,
        m: &EncryptedBinaryNumber<C>,
    ) -> Result<EncryptedBinaryNumber<C>> {
        let mut reduction = self.start(a, m)?;
        while reduction.step()? != ReductionState::Done {}
        Ok(reduction.into_current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::clear::{ClearBit, ClearScheme};
    use crate::backend::gf2::{Gf2Scheme, Parameters};

    fn reduce(values: &[u64], moduli: &[u64], width: usize, bound: u64) -> Vec<u64> {
        let scheme = ClearScheme::new(values.len());
        let a = EncryptedBinaryNumber::encrypt(&scheme, values, width).unwrap();
        let m = EncryptedBinaryNumber::encrypt(&scheme, moduli, width).unwrap();
        ModularReducer::new(IterationBound::exact(bound))
            .run(a, &m)
            .unwrap()
            .decrypt(&scheme)
            .unwrap()
    }

    #[test]
    fn test_worked_case() {
        assert_eq!(reduce(&[20], &[6], 6, 6), vec![2]);
    }

    #[test]
    fn test_all_small_moduli() {
        // Every 0 < M < 2^k and 0 <= A < M^2, on 2k + 1 bits with bound M.
        for k in 1..=4u32 {
            let width = 2 * k as usize + 1;
            for modulus in 1..(1u64 << k) {
                let values: Vec<u64> = (0..modulus * modulus).collect();
                let moduli = vec![modulus; values.len()];
                let expected: Vec<u64> = values.iter().map(|v| v % modulus).collect();
                assert_eq!(reduce(&values, &moduli, width, modulus), expected, "M = {modulus}");
            }
        }
    }

    #[test]
    fn test_mixed_moduli_in_slots() {
        let values = [0, 5, 44, 63, 17, 9];
        let moduli = [7, 5, 9, 8, 2, 10];
        let bound = IterationBound::worst_case(6, 2).unwrap();
        let expected: Vec<u64> = values.iter().zip(&moduli).map(|(a, m)| a % m).collect();
        assert_eq!(reduce(&values, &moduli, 7, bound.iterations()), expected);
    }

    #[test]
    fn test_random_12_bit() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let values: Vec<u64> = (0..512).map(|_| rng.gen_range(0..1 << 12)).collect();
        let moduli: Vec<u64> = (0..512).map(|_| rng.gen_range(200..1 << 12)).collect();
        let bound = IterationBound::worst_case(12, 200).unwrap();
        let expected: Vec<u64> = values.iter().zip(&moduli).map(|(a, m)| a % m).collect();
        assert_eq!(reduce(&values, &moduli, 13, bound.iterations()), expected);
    }

    #[test]
    fn test_zero_and_small_dividends() {
        assert_eq!(reduce(&[0, 0, 0], &[1, 6, 31], 6, 6), vec![0, 0, 0]);
        for bound in [0, 1, 5] {
            assert_eq!(reduce(&[3, 0, 30], &[7, 9, 31], 6, bound), vec![3, 0, 30]);
        }
    }

    #[test]
    fn test_bound_too_small() {
        assert_eq!(reduce(&[20], &[6], 6, 2), vec![8]);
    }

    #[test]
    fn test_worst_case_bound() {
        assert_eq!(IterationBound::worst_case(5, 6).unwrap().iterations(), 6);
        assert_eq!(IterationBound::worst_case(64, 1).unwrap().iterations(), u64::MAX);
        assert_eq!(IterationBound::worst_case(3, 8).unwrap().iterations(), 1);
        assert!(IterationBound::worst_case(5, 0).is_err());
        assert!(IterationBound::worst_case(0, 3).is_err());
        assert!(IterationBound::worst_case(65, 3).is_err());
    }

    #[test]
    fn test_states() {
        let scheme = ClearScheme::new(1);
        let a = EncryptedBinaryNumber::encrypt(&scheme, &[20], 6).unwrap();
        let m = EncryptedBinaryNumber::encrypt(&scheme, &[6], 6).unwrap();
        let mut reduction = ModularReducer::new(IterationBound::exact(2)).start(a, &m).unwrap();

        assert_eq!(reduction.state(), ReductionState::Init);
        assert_eq!(reduction.step().unwrap(), ReductionState::Reducing(1));
        assert_eq!(reduction.current().decrypt(&scheme).unwrap(), vec![14]);
        assert_eq!(reduction.step().unwrap(), ReductionState::Done);
        assert!(matches!(reduction.step(), Err(Error::Logic(_))));
        assert!(reduction.clone().finish().is_err());
        assert_eq!(reduction.into_current().decrypt(&scheme).unwrap(), vec![8]);
    }

    #[test]
    fn test_zero_bound_states() {
        let scheme = ClearScheme::new(1);
        let a = EncryptedBinaryNumber::encrypt(&scheme, &[9], 5).unwrap();
        let m = EncryptedBinaryNumber::encrypt(&scheme, &[4], 5).unwrap();
        let mut reduction = Reduction::new(a, m, IterationBound::exact(0)).unwrap();
        assert_eq!(reduction.step().unwrap(), ReductionState::Done);
        assert_eq!(reduction.into_current().decrypt(&scheme).unwrap(), vec![9]);
    }

    #[test]
    fn test_operand_mismatch() {
        let scheme = ClearScheme::new(1);
        let a = EncryptedBinaryNumber::encrypt(&scheme, &[9], 5).unwrap();
        let m = EncryptedBinaryNumber::encrypt(&scheme, &[4], 4).unwrap();
        let reducer = ModularReducer::new(IterationBound::exact(3));
        assert!(matches!(reducer.run(a.clone(), &m), Err(Error::Logic(_))));

        let m = EncryptedBinaryNumber::from_bits(vec![ClearBit::new(vec![false, true]); 5]).unwrap();
        assert!(matches!(reducer.run(a, &m), Err(Error::Logic(_))));
    }

    #[test]
    fn test_depth_is_data_independent() {
        let depth = |value: u64| {
            let scheme = ClearScheme::new(1);
            let a = EncryptedBinaryNumber::encrypt(&scheme, &[value], 5).unwrap();
            let m = EncryptedBinaryNumber::encrypt(&scheme, &[3], 5).unwrap();
            let r = ModularReducer::new(IterationBound::exact(4)).run(a, &m).unwrap();
            r.iter().map(ClearBit::depth).collect::<Vec<_>>()
        };
        assert_eq!(depth(0), depth(14));
        assert_eq!(depth(2), depth(9));
    }

    #[test]
    fn test_gf2_reduction() {
        let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32).unwrap()).unwrap();
        let m = EncryptedBinaryNumber::encrypt(&scheme, &[2], 3).unwrap();
        for value in [0, 1, 2, 3] {
            let a = EncryptedBinaryNumber::encrypt(&scheme, &[value], 3).unwrap();
            let r = ModularReducer::new(IterationBound::exact(2)).run(a, &m).unwrap();
            assert_eq!(r.decrypt(&scheme).unwrap(), vec![value % 2]);
        }
    }

    #[test]
    #[ignore = "Long test"]
    fn test_gf2_reduction_long() {
        let scheme = Gf2Scheme::generate(Parameters::new(1024, 32, 1, 32).unwrap()).unwrap();
        for (value, modulus) in [(3, 1), (2, 1), (3, 2), (1, 3), (0, 2)] {
            let a = EncryptedBinaryNumber::encrypt(&scheme, &[value], 3).unwrap();
            let m = EncryptedBinaryNumber::encrypt(&scheme, &[modulus], 3).unwrap();
            let r = ModularReducer::new(IterationBound::exact(3)).run(a, &m).unwrap();
            assert_eq!(r.decrypt(&scheme).unwrap(), vec![value % modulus]);
        }
    }
}
