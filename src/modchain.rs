//! Construction of the modulus chain of a [`Context`].
//!
//! The chain is made of three disjoint families of primes, each `1 mod m`:
//!
//! - two *small* primes of about two thirds of the regular size, used for
//!   finer-grained modulus switching;
//! - *ctxt* primes carrying the ciphertexts, added until their product reaches
//!   the requested bit budget;
//! - *special* primes only used during key switching, sized to cover the
//!   largest digit.
//!
//! Generation is deterministic: clearing the chain and building it again with
//! the same arguments reproduces it exactly.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::primes::{IndexSet, PrimeGenerator, PrimeRole};
use crate::security::BOOT_DFLT_SK_HWT;

use alloc::vec::Vec;
use tracing::instrument;

/// Bit size of ctxt primes.
pub const CTXT_PRIME_BITS: u32 = 60;
/// Bit size of special primes.
pub const SPECIAL_PRIME_BITS: u32 = 61;
/// Bit size of the first small prime, `ceil(2*CTXT_PRIME_BITS/3)`.
pub const SMALL_PRIME_BITS: u32 = (2 * CTXT_PRIME_BITS).div_ceil(3);
/// Largest accepted modulus-switching resolution, in bits.
pub const MAX_RESOLUTION: u32 = 10;

fn log2(q: u64) -> f64 {
    (q as f64).log2()
}

/// Smallest `d` with `p^d > bound`.
fn exponent_above(p: u64, bound: f64) -> u32 {
    let pf = p as f64;
    let mut d = 1;
    let mut power = pf;
    while power <= bound {
        power *= pf;
        d += 1;
    }
    d
}

/// Splits `handles` in order into `k` contiguous non-empty chunks of
/// near-equal total weight. Requires `1 <= k <= handles.len()`.
fn partition_digits(handles: &[usize], weights: &[f64], k: usize) -> Vec<IndexSet> {
    let n = handles.len();
    let total: f64 = weights.iter().sum();
    let mut digits = Vec::with_capacity(k);
    let mut current = IndexSet::new();
    let mut cumulative = 0.0;

    for (j, (&h, &w)) in handles.iter().zip(weights).enumerate() {
        current.insert(h);
        cumulative += w;

        let closed = digits.len();
        if closed + 1 == k {
            continue;
        }
        let primes_left = n - j - 1;
        let digits_left = k - closed - 1;
        let threshold = (closed + 1) as f64 * total / k as f64;
        if primes_left >= digits_left && (cumulative + 1e-9 >= threshold || primes_left == digits_left)
        {
            digits.push(core::mem::take(&mut current));
        }
    }
    digits.push(current);
    digits
}

impl Context {
    /// Builds the modulus chain.
    ///
    /// ## Arguments
    ///
    /// * `total_bits` - Bits of ciphertext modulus to provide through the ctxt primes.
    /// * `num_digits` - Number of key-switching digits (columns).
    /// * `bootstrappable` - Reserve room for recryption. Ignored for CKKS.
    /// * `sk_hwt` - Hamming weight of the secret key, `0` for dense keys.
    /// * `resolution` - Bit resolution of modulus switching, in `1..=10`.
    /// * `special_bits` - Bits of special primes, `0` to derive them from the digits.
    ///
    /// ## Errors
    ///
    /// `Logic` if the chain is not empty, `Parameter` on invalid arguments,
    /// `ParameterSearch` if the prime search runs out of candidates. On error
    /// the chain is left empty.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::{AlgebraicStructure, Context};
    ///
    /// let mut context = Context::new(AlgebraicStructure::bgv(31, 2, 1, &[], &[]).unwrap());
    /// context.build_mod_chain(200, 2, false, 0, 3, 0).unwrap();
    /// assert_eq!(context.num_digits(), 2);
    /// assert_eq!(context.small_primes().card(), 2);
    /// ```
    #[instrument(skip_all, fields(m = self.m(), total_bits = total_bits, num_digits = num_digits))]
    pub fn build_mod_chain(
        &mut self,
        total_bits: u64,
        num_digits: usize,
        bootstrappable: bool,
        sk_hwt: i64,
        resolution: u32,
        special_bits: u64,
    ) -> Result<()> {
        if !self.moduli.is_empty() {
            return Err(Error::logic("the modulus chain is already built"));
        }
        if total_bits == 0 {
            return Err(Error::parameter("total_bits must be positive"));
        }
        if num_digits == 0 {
            return Err(Error::parameter("at least one digit is required"));
        }
        if !(1..=MAX_RESOLUTION).contains(&resolution) {
            return Err(Error::parameter(alloc::format!(
                "resolution must lie in 1..={MAX_RESOLUTION}, got {resolution}"
            )));
        }
        if sk_hwt < 0 {
            return Err(Error::parameter(alloc::format!(
                "secret key weight must be non-negative, got {sk_hwt}"
            )));
        }

        let result = self.fill_mod_chain(
            total_bits,
            num_digits,
            bootstrappable,
            sk_hwt,
            resolution,
            special_bits,
        );
        if result.is_err() {
            self.clear_mod_chain();
        }
        result
    }

    fn fill_mod_chain(
        &mut self,
        total_bits: u64,
        num_digits: usize,
        mut bootstrappable: bool,
        sk_hwt: i64,
        resolution: u32,
        special_bits: u64,
    ) -> Result<()> {
        if bootstrappable && self.is_ckks() {
            tracing::warn!("bootstrapping is not supported for CKKS, flag ignored");
            bootstrappable = false;
        }

        self.hwt_param = if bootstrappable && sk_hwt == 0 {
            BOOT_DFLT_SK_HWT
        } else {
            sk_hwt
        };

        let mut budget = total_bits as f64;
        if bootstrappable {
            // BGV only, so p is a positive prime.
            let p = self.p() as u64;
            let bound = 2.0 * self.bound_for_recryption();
            let d = exponent_above(p, bound);
            self.e_prime_param = self.r();
            self.e_param = self.e_prime_param + d;
            budget += f64::from(d) * log2(p);
            tracing::debug!(e = self.e_param, e_prime = self.e_prime_param, "bootstrapping room");
        }

        let m = self.m();
        for bits in [SMALL_PRIME_BITS, SMALL_PRIME_BITS + resolution] {
            let mut generator = PrimeGenerator::new(bits, m)?;
            let q = self.fresh_prime(&mut generator)?;
            self.add_prime(q, PrimeRole::Small)?;
        }

        let mut generator = PrimeGenerator::new(CTXT_PRIME_BITS, m)?;
        let mut ctxt_bits = 0.0;
        while ctxt_bits < budget {
            let q = self.fresh_prime(&mut generator)?;
            self.add_prime(q, PrimeRole::Ctxt)?;
            ctxt_bits += log2(q);
        }

        let handles: Vec<usize> = self.ctxt_primes.iter().collect();
        let weights: Vec<f64> = handles.iter().map(|&h| log2(self.moduli[h])).collect();
        let k = num_digits.min(handles.len());
        if k < num_digits {
            tracing::warn!(
                requested = num_digits,
                used = k,
                "fewer ctxt primes than digits, clamping"
            );
        }
        self.digits = partition_digits(&handles, &weights, k);
        for (i, digit) in self.digits.iter().enumerate() {
            tracing::debug!(digit = i, primes = digit.card(), "digit formed");
        }

        let max_digit_bits = self
            .digits
            .iter()
            .map(|digit| digit.iter().map(|h| log2(self.moduli[h])).sum::<f64>())
            .fold(0.0, f64::max);
        let target = if special_bits == 0 {
            max_digit_bits + (num_digits as f64) * f64::from(resolution)
        } else {
            special_bits as f64
        };
        let mut generator = PrimeGenerator::new(SPECIAL_PRIME_BITS, m)?;
        let mut bits = 0.0;
        while bits < target {
            let q = self.fresh_prime(&mut generator)?;
            self.add_prime(q, PrimeRole::Special)?;
            bits += log2(q);
        }

        tracing::info!(
            ctxt = self.ctxt_primes.card(),
            special = self.special_primes.card(),
            small = self.small_primes.card(),
            bits_of_q = self.bit_size_of_q(),
            "modulus chain built"
        );
        Ok(())
    }

    fn fresh_prime(&self, generator: &mut PrimeGenerator) -> Result<u64> {
        loop {
            let q = generator.next_prime()?;
            if !self.in_chain(q) {
                return Ok(q);
            }
        }
    }

    /// Empties the modulus chain and resets every parameter derived while building it.
    pub fn clear_mod_chain(&mut self) {
        self.moduli.clear();
        self.ctxt_primes.clear();
        self.special_primes.clear();
        self.small_primes.clear();
        self.digits.clear();
        self.hwt_param = 0;
        self.e_param = 0;
        self.e_prime_param = 0;
        self.recryption = None;
    }
}
