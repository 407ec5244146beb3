use crate::algebra::AlgebraicStructure;
use crate::error::{Error, Result};
use crate::primes::{IndexSet, PrimeRole, PrimeSet};
use crate::security::estimate_security;

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use primality_test::is_prime;

/// Default standard deviation of the RLWE error distribution.
pub const DEFAULT_STDEV: f64 = 3.2;
/// Default confidence factor of the noise bounds.
pub const DEFAULT_SCALE: f64 = 10.0;

/// Data attached to a context by [`Context::enable_bootstrapping`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecryptionData {
    mvec: Vec<u64>,
    build_cache: bool,
    also_thick: bool,
}

impl RecryptionData {
    #[must_use]
    pub fn new(mvec: Vec<u64>, build_cache: bool, also_thick: bool) -> Self {
        Self {
            mvec,
            build_cache,
            also_thick,
        }
    }

    /// Factorization of `m` used to build the recryption linear maps.
    #[must_use]
    pub fn mvec(&self) -> &[u64] {
        &self.mvec
    }

    #[must_use]
    pub const fn build_cache(&self) -> bool {
        self.build_cache
    }

    /// `true` for thick bootstrapping, `false` for thin only.
    #[must_use]
    pub const fn also_thick(&self) -> bool {
        self.also_thick
    }
}

/// The parameter context.
///
/// A `Context` holds the algebraic structure of the plaintext space, the
/// modulus chain and the noise parameters every homomorphic operation reads
/// from. It is built once, through a [`ContextBuilder`](crate::ContextBuilder),
/// and afterwards shared by reference. It cannot be cloned.
///
/// ## Examples
///
/// ```
/// use homomod::{Bgv, ContextBuilder};
///
/// let context = ContextBuilder::<Bgv>::new().m(31).bits(120).build().unwrap();
/// assert_eq!(context.nslots(), 6);
/// assert!(context.bit_size_of_q() >= 120);
/// ```
#[derive(Debug, PartialEq)]
pub struct Context {
    pub(crate) algebra: AlgebraicStructure,
    pub(crate) moduli: Vec<u64>,
    pub(crate) ctxt_primes: PrimeSet,
    pub(crate) special_primes: PrimeSet,
    pub(crate) small_primes: PrimeSet,
    pub(crate) digits: Vec<IndexSet>,
    pub(crate) stdev: f64,
    pub(crate) scale: f64,
    pub(crate) hwt_param: i64,
    pub(crate) e_param: u32,
    pub(crate) e_prime_param: u32,
    pub(crate) recryption: Option<RecryptionData>,
}

impl Context {
    #[must_use]
    /// Creates a context with an empty modulus chain.
    ///
    /// ## Arguments
    ///
    /// * `algebra` - The algebraic structure of the plaintext space.
    pub const fn new(algebra: AlgebraicStructure) -> Self {
        Self {
            algebra,
            moduli: Vec::new(),
            ctxt_primes: PrimeSet::new(PrimeRole::Ctxt),
            special_primes: PrimeSet::new(PrimeRole::Special),
            small_primes: PrimeSet::new(PrimeRole::Small),
            digits: Vec::new(),
            stdev: DEFAULT_STDEV,
            scale: DEFAULT_SCALE,
            hwt_param: 0,
            e_param: 0,
            e_prime_param: 0,
            recryption: None,
        }
    }

    #[must_use]
    pub const fn algebra(&self) -> &AlgebraicStructure {
        &self.algebra
    }

    #[must_use]
    pub const fn m(&self) -> u64 {
        self.algebra.m()
    }

    #[must_use]
    pub const fn p(&self) -> i64 {
        self.algebra.p()
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.algebra.r()
    }

    #[must_use]
    pub const fn phi_m(&self) -> u64 {
        self.algebra.phi_m()
    }

    #[must_use]
    pub const fn ord_p(&self) -> u64 {
        self.algebra.ord_p()
    }

    #[must_use]
    pub const fn nslots(&self) -> u64 {
        self.algebra.nslots()
    }

    #[must_use]
    pub const fn is_ckks(&self) -> bool {
        self.algebra.is_ckks()
    }

    #[must_use]
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    #[must_use]
    pub const fn ctxt_primes(&self) -> &PrimeSet {
        &self.ctxt_primes
    }

    #[must_use]
    pub const fn special_primes(&self) -> &PrimeSet {
        &self.special_primes
    }

    #[must_use]
    pub const fn small_primes(&self) -> &PrimeSet {
        &self.small_primes
    }

    /// Key-switching digits. Their union is the set of ctxt primes.
    #[must_use]
    pub fn digits(&self) -> &[IndexSet] {
        &self.digits
    }

    #[must_use]
    pub fn num_digits(&self) -> usize {
        self.digits.len()
    }

    #[must_use]
    pub const fn stdev(&self) -> f64 {
        self.stdev
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Hamming weight of the secret key, `0` for a dense key.
    #[must_use]
    pub const fn hwt_param(&self) -> i64 {
        self.hwt_param
    }

    #[must_use]
    pub const fn e_param(&self) -> u32 {
        self.e_param
    }

    #[must_use]
    pub const fn e_prime_param(&self) -> u32 {
        self.e_prime_param
    }

    #[must_use]
    pub const fn recryption_data(&self) -> Option<&RecryptionData> {
        self.recryption.as_ref()
    }

    #[must_use]
    pub const fn is_bootstrappable(&self) -> bool {
        self.recryption.is_some()
    }

    fn check_unbuilt(&self, what: &str) -> Result<()> {
        if self.moduli.is_empty() {
            Ok(())
        } else {
            Err(Error::logic(alloc::format!(
                "{what} cannot change once the modulus chain is built"
            )))
        }
    }

    /// Sets the standard deviation of the error distribution.
    ///
    /// ## Errors
    ///
    /// `Parameter` if `stdev` is not a positive number, `Logic` once the
    /// modulus chain has been built.
    pub fn set_stdev(&mut self, stdev: f64) -> Result<()> {
        self.check_unbuilt("stdev")?;
        if !(stdev.is_finite() && stdev > 0.0) {
            return Err(Error::parameter(alloc::format!(
                "stdev must be positive, got {stdev}"
            )));
        }
        self.stdev = stdev;
        Ok(())
    }

    /// Sets the confidence factor used by the noise bounds.
    ///
    /// ## Errors
    ///
    /// Same conditions as [`Context::set_stdev`].
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        self.check_unbuilt("scale")?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::parameter(alloc::format!(
                "scale must be positive, got {scale}"
            )));
        }
        self.scale = scale;
        Ok(())
    }

    /// Handles of the ctxt and special primes.
    #[must_use]
    pub fn full_primes(&self) -> IndexSet {
        self.ctxt_primes.handles() | self.special_primes.handles()
    }

    /// Handles of every prime of the chain.
    #[must_use]
    pub fn all_primes(&self) -> IndexSet {
        &(self.small_primes.handles() | self.ctxt_primes.handles()) | self.special_primes.handles()
    }

    /// The first `n` ctxt primes, or all of them when there are fewer.
    #[must_use]
    pub fn ctxt_primes_prefix(&self, n: usize) -> IndexSet {
        self.ctxt_primes.iter().take(n).collect()
    }

    /// The prime at handle `i`.
    pub fn ith_prime(&self, i: usize) -> Result<u64> {
        self.moduli.get(i).copied().ok_or_else(|| {
            Error::logic(alloc::format!(
                "prime handle {i} out of range ({} primes)",
                self.moduli.len()
            ))
        })
    }

    #[must_use]
    pub fn num_primes(&self) -> usize {
        self.moduli.len()
    }

    #[must_use]
    pub fn in_chain(&self, q: u64) -> bool {
        self.moduli.contains(&q)
    }

    /// `true` when some prime of the chain divides `n`.
    #[must_use]
    pub fn is_zero_divisor(&self, n: &BigUint) -> bool {
        self.moduli
            .iter()
            .any(|&q| (n % BigUint::from(q)).is_zero())
    }

    fn check_handles(&self, set: &IndexSet) -> Result<()> {
        match set.last() {
            Some(last) if last >= self.moduli.len() => Err(Error::logic(alloc::format!(
                "index set reaches handle {last} but the chain holds {} primes",
                self.moduli.len()
            ))),
            _ => Ok(()),
        }
    }

    /// Product of the primes designated by `set`, `1` for the empty set.
    pub fn product_of_primes(&self, set: &IndexSet) -> Result<BigUint> {
        self.check_handles(set)?;
        Ok(set
            .iter()
            .fold(BigUint::one(), |acc, i| acc * self.moduli[i]))
    }

    /// Natural logarithm of the prime at handle `i`.
    pub fn log_of_prime(&self, i: usize) -> Result<f64> {
        Ok((self.ith_prime(i)? as f64).ln())
    }

    /// Natural logarithm of the product of the primes designated by `set`.
    pub fn log_of_product(&self, set: &IndexSet) -> Result<f64> {
        self.check_handles(set)?;
        Ok(set.iter().map(|i| (self.moduli[i] as f64).ln()).sum())
    }

    /// Bit size of `Q`, the product of the ctxt and special primes.
    #[must_use]
    pub fn bit_size_of_q(&self) -> u64 {
        let full = self.full_primes();
        if full.is_empty() {
            return 0;
        }
        // Handles of the full set are always in range.
        self.product_of_primes(&full).map_or(0, |q| q.bits())
    }

    #[must_use]
    /// Estimates the security level of the context, in bits.
    ///
    /// The error is taken with standard deviation `s = stdev`, scaled by
    /// `sqrt(m)` when `m` is not a power of two, and `alpha = s/Q`.
    ///
    /// ## Errors
    ///
    /// `Logic` if the modulus chain is empty.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::{Ckks, ContextBuilder};
    ///
    /// let context = ContextBuilder::<Ckks>::new().m(1 << 15).bits(200).build().unwrap();
    /// assert!(context.security_level().unwrap() > 80.0);
    /// ```
    pub fn security_level(&self) -> Result<f64> {
        let full = self.full_primes();
        if full.is_empty() {
            return Err(Error::logic(
                "security level cannot be determined as the modulus chain is empty",
            ));
        }

        let mut s = self.stdev;
        if self.algebra.pow2() == 0 {
            s *= (self.m() as f64).sqrt();
        }
        let log2_alpha_inv = (self.log_of_product(&full)? - s.ln()) / core::f64::consts::LN_2;
        Ok(estimate_security(self.phi_m(), log2_alpha_inv, self.hwt_param))
    }

    /// Bound on the L-infinity norm of a ring element of degree `degree` with
    /// coefficients uniform in `[-magnitude, magnitude]`.
    #[must_use]
    pub fn noise_bound_for_uniform(&self, magnitude: f64, degree: u64) -> f64 {
        self.scale * (degree as f64 / 3.0).sqrt() * magnitude
    }

    /// Bound for coefficients uniform modulo `modulus`.
    #[must_use]
    pub fn noise_bound_for_mod(&self, modulus: u64, degree: u64) -> f64 {
        let modulus_f = modulus as f64;
        let mut var = modulus_f * modulus_f / 12.0;
        if modulus % 2 == 0 {
            var += 1.0 / 6.0;
        }
        self.scale * (degree as f64 * var).sqrt()
    }

    /// Bound for Gaussian coefficients of standard deviation `sigma`.
    #[must_use]
    pub fn noise_bound_for_gaussian(&self, sigma: f64, degree: u64) -> f64 {
        self.scale * (degree as f64).sqrt() * sigma
    }

    /// Bound for coefficients in `{-1, 0, 1}`, non-zero with probability `prob`.
    #[must_use]
    pub fn noise_bound_for_small(&self, prob: f64, degree: u64) -> f64 {
        self.scale * (degree as f64).sqrt() * prob.sqrt()
    }

    /// Bound for a `{-1, 0, 1}` element with exactly `hwt` non-zero coefficients.
    #[must_use]
    pub fn noise_bound_for_hwt(&self, hwt: u64) -> f64 {
        self.scale * (hwt as f64).sqrt()
    }

    /// Standard deviation of the noise left after the key switching step of recryption.
    #[must_use]
    pub fn std_dev_for_recryption(&self) -> f64 {
        let m = self.m() as f64;
        let phi_m = self.phi_m() as f64;
        let k = self.algebra.factors().len() as i32;
        0.5 * ((phi_m / m) * self.hwt_param as f64 * 2f64.powi(k) / 3.0).sqrt()
    }

    /// High-probability bound on the noise entering recryption.
    #[must_use]
    pub fn bound_for_recryption(&self) -> f64 {
        0.5 + self.scale * self.std_dev_for_recryption()
    }

    /// Attaches recryption data, making the context bootstrappable.
    ///
    /// ## Arguments
    ///
    /// * `mvec` - Pairwise coprime factors of `m`.
    /// * `build_cache` - Whether the recryption maps should be cached.
    /// * `also_thick` - Whether thick bootstrapping is supported on top of thin.
    ///
    /// ## Errors
    ///
    /// `Logic` if the modulus chain was built without bootstrapping room
    /// (`e_param == 0`), `Parameter` if `mvec` does not factor `m`.
    pub fn enable_bootstrapping(
        &mut self,
        mvec: Vec<u64>,
        build_cache: bool,
        also_thick: bool,
    ) -> Result<()> {
        if self.e_param == 0 {
            return Err(Error::logic(
                "the modulus chain has no room for bootstrapping (e = 0)",
            ));
        }
        if mvec.is_empty() || mvec.contains(&0) || mvec.contains(&1) {
            return Err(Error::parameter(alloc::format!(
                "mvec {mvec:?} must hold factors greater than one"
            )));
        }
        let coprime = mvec.iter().enumerate().all(|(i, &a)| {
            mvec[i + 1..]
                .iter()
                .all(|&b| crate::algebra::gcd(a, b) == 1)
        });
        let product = mvec.iter().try_fold(1u64, |acc, &f| acc.checked_mul(f));
        if !coprime || product != Some(self.m()) {
            return Err(Error::parameter(alloc::format!(
                "mvec {mvec:?} is not a coprime factorization of m = {}",
                self.m()
            )));
        }

        tracing::info!(?mvec, build_cache, also_thick, "bootstrapping enabled");
        self.recryption = Some(RecryptionData::new(mvec, build_cache, also_thick));
        Ok(())
    }

    /// Appends `q` to the chain with the given role and returns its handle.
    ///
    /// ## Errors
    ///
    /// `Parameter` if `q` is not a prime congruent to 1 mod `m` or is
    /// already part of the chain.
    pub fn add_prime(&mut self, q: u64, role: PrimeRole) -> Result<usize> {
        if !is_prime(q) || q % self.m() != 1 {
            return Err(Error::parameter(alloc::format!(
                "{q} is not a prime congruent to 1 mod {}",
                self.m()
            )));
        }
        if self.in_chain(q) {
            return Err(Error::parameter(alloc::format!(
                "prime {q} is already in the chain"
            )));
        }

        let handle = self.moduli.len();
        self.moduli.push(q);
        match role {
            PrimeRole::Ctxt => self.ctxt_primes.insert(handle),
            PrimeRole::Special => self.special_primes.insert(handle),
            PrimeRole::Small => self.small_primes.insert(handle),
        };
        tracing::debug!(q, handle, %role, "prime added");
        Ok(handle)
    }

    pub fn add_small_prime(&mut self, q: u64) -> Result<usize> {
        self.add_prime(q, PrimeRole::Small)
    }

    pub fn add_ctxt_prime(&mut self, q: u64) -> Result<usize> {
        self.add_prime(q, PrimeRole::Ctxt)
    }

    pub fn add_special_prime(&mut self, q: u64) -> Result<usize> {
        self.add_prime(q, PrimeRole::Special)
    }

    /// Role of the prime at handle `i`.
    pub fn role_of(&self, i: usize) -> Result<PrimeRole> {
        [&self.ctxt_primes, &self.special_primes, &self.small_primes]
            .into_iter()
            .find(|set| set.contains(i))
            .map(|set| set.role())
            .ok_or_else(|| Error::logic(alloc::format!("prime handle {i} out of range")))
    }
}

fn fmt_handles(set: &IndexSet) -> alloc::string::String {
    let handles: Vec<alloc::string::String> =
        set.iter().map(|i| alloc::format!("{i}")).collect();
    alloc::format!("[{}]", handles.join(" "))
}

impl core::fmt::Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alg = &self.algebra;
        if alg.is_ckks() {
            writeln!(f, "m = {}, precision = {}", alg.m(), alg.r())?;
        } else {
            writeln!(f, "m = {}, p = {}, r = {}", alg.m(), alg.p(), alg.r())?;
        }
        writeln!(f, "phi(m) = {}", alg.phi_m())?;
        writeln!(f, "ord(p) = {}", alg.ord_p())?;
        writeln!(f, "nslots = {}", alg.nslots())?;
        writeln!(f, "gens = {:?}, ords = {:?}", alg.gens(), alg.ords())?;
        writeln!(f, "stdev = {}, scale = {}", self.stdev, self.scale)?;

        for set in [&self.ctxt_primes, &self.special_primes, &self.small_primes] {
            writeln!(f, "{} primes = {}", set.role(), fmt_handles(set))?;
            for i in set.iter() {
                let q = self.moduli[i];
                writeln!(f, "  q[{i}] = {q} ({:.1} bits)", (q as f64).log2())?;
            }
        }
        for (i, digit) in self.digits.iter().enumerate() {
            writeln!(f, "digit {i} = {}", fmt_handles(digit))?;
        }
        writeln!(f, "hwt = {}, e = {}, e' = {}", self.hwt_param, self.e_param, self.e_prime_param)?;
        if let Some(rec) = &self.recryption {
            writeln!(
                f,
                "bootstrappable: mvec = {:?}, thick = {}",
                rec.mvec(),
                rec.also_thick()
            )?;
        }
        writeln!(f, "bits of Q = {}", self.bit_size_of_q())?;
        match self.security_level() {
            Ok(security) => write!(f, "security = {security:.1}"),
            Err(_) => write!(f, "security = n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::PrimeGenerator;

    fn bare(m: u64) -> Context {
        Context::new(AlgebraicStructure::bgv(m, 2, 1, &[], &[]).unwrap())
    }

    fn primes(bits: u32, m: u64, n: usize) -> Vec<u64> {
        let mut generator = PrimeGenerator::new(bits, m).unwrap();
        (0..n).map(|_| generator.next_prime().unwrap()).collect()
    }

    #[test]
    fn test_new_context() {
        let context = bare(31);
        assert_eq!(context.m(), 31);
        assert_eq!(context.nslots(), 6);
        assert_eq!(context.num_primes(), 0);
        assert_eq!(context.bit_size_of_q(), 0);
        assert_eq!(context.stdev(), DEFAULT_STDEV);
        assert_eq!(context.scale(), DEFAULT_SCALE);
        assert!(!context.is_bootstrappable());
    }

    #[test]
    fn test_security_level_empty_chain() {
        let context = bare(31);
        assert!(matches!(context.security_level(), Err(Error::Logic(_))));
    }

    #[test]
    fn test_add_prime() {
        let mut context = bare(31);
        let qs = primes(60, 31, 3);
        assert_eq!(context.add_small_prime(qs[0]), Ok(0));
        assert_eq!(context.add_ctxt_prime(qs[1]), Ok(1));
        assert_eq!(context.add_special_prime(qs[2]), Ok(2));
        assert!(matches!(
            context.add_ctxt_prime(qs[1]),
            Err(Error::Parameter(_))
        ));
        assert!(matches!(context.add_ctxt_prime(33), Err(Error::Parameter(_))));

        assert_eq!(context.full_primes().as_slice(), &[1, 2]);
        assert_eq!(context.all_primes().as_slice(), &[0, 1, 2]);
        assert_eq!(context.role_of(0), Ok(PrimeRole::Small));
        assert_eq!(context.role_of(2), Ok(PrimeRole::Special));
        assert!(context.role_of(3).is_err());
        assert_eq!(context.ith_prime(1), Ok(qs[1]));
        assert!(context.ith_prime(3).is_err());
        assert!(context.in_chain(qs[2]));
        assert!(!context.in_chain(7));
    }

    #[test]
    fn test_products_and_logs() {
        let mut context = bare(31);
        let qs = primes(60, 31, 2);
        context.add_ctxt_prime(qs[0]).unwrap();
        context.add_ctxt_prime(qs[1]).unwrap();

        let all = context.full_primes();
        let product = context.product_of_primes(&all).unwrap();
        assert_eq!(product, BigUint::from(qs[0]) * BigUint::from(qs[1]));
        assert_eq!(context.bit_size_of_q(), product.bits());
        assert_eq!(context.bit_size_of_q(), 120);

        let log = context.log_of_product(&all).unwrap();
        let expected = (qs[0] as f64).ln() + (qs[1] as f64).ln();
        assert!((log - expected).abs() < 1e-9);
        assert!(context.log_of_product(&IndexSet::interval(0, 2)).is_err());
        assert!(context.product_of_primes(&IndexSet::interval(1, 2)).is_err());
        assert_eq!(context.product_of_primes(&IndexSet::new()), Ok(BigUint::one()));

        assert!(context.is_zero_divisor(&(BigUint::from(qs[1]) * 5u32)));
        assert!(!context.is_zero_divisor(&BigUint::from(5u32)));
        assert_eq!(context.ctxt_primes_prefix(1).as_slice(), &[0]);
        assert_eq!(context.ctxt_primes_prefix(5).card(), 2);
    }

    #[test]
    fn test_security_level_formula() {
        let mut context = bare(31);
        let q = primes(60, 31, 1)[0];
        context.add_ctxt_prime(q).unwrap();
        let s = DEFAULT_STDEV * 31f64.sqrt();
        let log2_alpha_inv = (q as f64).log2() - s.log2();
        let expected = estimate_security(30, log2_alpha_inv, 0);
        assert!((context.security_level().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_noise_bounds() {
        let context = bare(31);
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(context.noise_bound_for_uniform(2.0, 300), 10.0 * 10.0 * 2.0));
        assert!(close(context.noise_bound_for_mod(3, 4), 10.0 * (4.0 * 9.0 / 12.0f64).sqrt()));
        assert!(close(
            context.noise_bound_for_mod(4, 4),
            10.0 * (4.0 * (16.0 / 12.0 + 1.0 / 6.0f64)).sqrt()
        ));
        assert!(close(context.noise_bound_for_gaussian(3.2, 16), 10.0 * 4.0 * 3.2));
        assert!(close(context.noise_bound_for_small(0.25, 16), 10.0 * 4.0 * 0.5));
        assert!(close(context.noise_bound_for_hwt(64), 80.0));
    }

    #[test]
    fn test_recryption_bounds() {
        let mut context = bare(31);
        context.hwt_param = 120;
        // k = 1
        let expected = 0.5 * ((30.0 / 31.0) * 120.0 * 2.0 / 3.0f64).sqrt();
        assert!((context.std_dev_for_recryption() - expected).abs() < 1e-12);
        assert!((context.bound_for_recryption() - (0.5 + 10.0 * expected)).abs() < 1e-12);
    }

    #[test]
    fn test_setters() {
        let mut context = bare(31);
        context.set_stdev(4.0).unwrap();
        context.set_scale(6.0).unwrap();
        assert_eq!(context.stdev(), 4.0);
        assert_eq!(context.noise_bound_for_hwt(4), 12.0);
        assert!(matches!(context.set_scale(0.0), Err(Error::Parameter(_))));
        assert!(matches!(context.set_stdev(f64::NAN), Err(Error::Parameter(_))));

        context.add_ctxt_prime(primes(60, 31, 1)[0]).unwrap();
        assert!(matches!(context.set_stdev(3.2), Err(Error::Logic(_))));
    }

    #[test]
    fn test_enable_bootstrapping_checks() {
        let mut context = bare(105);
        assert!(matches!(
            context.enable_bootstrapping(vec![3, 5, 7], false, false),
            Err(Error::Logic(_))
        ));
        context.e_param = 4;
        assert!(matches!(
            context.enable_bootstrapping(vec![15, 5], false, false),
            Err(Error::Parameter(_))
        ));
        assert!(matches!(
            context.enable_bootstrapping(vec![3, 5], false, false),
            Err(Error::Parameter(_))
        ));
        context.enable_bootstrapping(vec![15, 7], true, false).unwrap();
        assert!(context.is_bootstrappable());
        assert_eq!(context.recryption_data().unwrap().mvec(), &[15, 7]);
    }

    #[test]
    fn test_equality() {
        let mut a = bare(31);
        let b = bare(31);
        assert_eq!(a, b);
        a.add_ctxt_prime(primes(60, 31, 1)[0]).unwrap();
        assert_ne!(a, b);
        assert_ne!(bare(31), bare(127));
    }

    #[test]
    fn test_display() {
        let mut context = bare(31);
        let printout = context.to_string();
        assert!(printout.contains("m = 31, p = 2, r = 1"));
        assert!(printout.contains("security = n/a"));
        context.add_ctxt_prime(primes(60, 31, 1)[0]).unwrap();
        assert!(context.to_string().contains("bits of Q = 60"));
    }
}
