//! Algebraic structure of the plaintext space `Z[X]/(Phi_m(X), p^r)`.
//!
//! Holds the cyclotomic index `m`, the plaintext characteristic `p`, the
//! lifting/precision exponent `r` and everything derived from them: `phi(m)`,
//! the order of `p` modulo `m`, the number of slots and a generator set for
//! `Z_m^* / <p>`.

use crate::error::{Error, Result};
use crate::security::estimate_security;

use alloc::vec::Vec;
use primality_test::is_prime;
use prime_factorization::Factorization;

/// Which family of scheme the parameters are meant for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    Bgv,
    Ckks,
}

/// Largest cyclotomic index accepted for BGV. Generator computation keeps one
/// flag per residue of `Z_m`.
pub const MAX_BGV_M: u64 = 1 << 20;

/// Algebraic parameters of a context. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgebraicStructure {
    kind: SchemeKind,
    m: u64,
    p: i64,
    r: u32,
    phi_m: u64,
    ord_p: u64,
    nslots: u64,
    gens: Vec<u64>,
    ords: Vec<i64>,
    pow2: u32,
    factors: Vec<u64>,
}

pub(crate) const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

const fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

/// Distinct prime factors of `n` with their multiplicity.
fn factorize(n: u64) -> Vec<(u64, u32)> {
    if n < 2 {
        return Vec::new();
    }
    let mut factors: Vec<(u64, u32)> = Factorization::run(n).prime_factor_repr();
    factors.sort_unstable_by_key(|&(q, _)| q);
    factors
}

/// Euler's totient of `n`.
#[must_use]
pub fn phi(n: u64) -> u64 {
    factorize(n)
        .iter()
        .fold(n, |acc, &(q, _)| acc / q * (q - 1))
}

/// Multiplicative order of `a` modulo `m`, `None` when `a` is not invertible.
#[must_use]
pub fn multiplicative_order(a: u64, m: u64) -> Option<u64> {
    if m == 1 {
        return Some(1);
    }
    let a = a % m;
    if gcd(a, m) != 1 {
        return None;
    }
    let mut x = a;
    let mut k = 1;
    while x != 1 {
        x = mul_mod(x, a, m);
        k += 1;
    }
    Some(k)
}

/// Greedily picks generators of `Z_m^* / <p>`, largest quotient order first.
///
/// An order is recorded as negative when `g^ord` is in the subgroup but not
/// equal to `1` in `Z_m^*`.
fn compute_generators(m: u64, p_mod_m: u64, phi_m: u64) -> (Vec<u64>, Vec<i64>) {
    let size = m as usize;
    let mut in_subgroup = alloc::vec![false; size];
    let mut card: u64 = 0;

    let mut x = 1 % m;
    loop {
        if in_subgroup[x as usize] {
            break;
        }
        in_subgroup[x as usize] = true;
        card += 1;
        x = mul_mod(x, p_mod_m, m);
    }

    let mut gens = Vec::new();
    let mut ords = Vec::new();
    while card < phi_m {
        let remaining = phi_m / card;
        let mut best: Option<(u64, u64)> = None;
        for g in 2..m {
            if in_subgroup[g as usize] || gcd(g, m) != 1 {
                continue;
            }
            let mut k = 1;
            let mut y = g;
            while !in_subgroup[y as usize] {
                y = mul_mod(y, g, m);
                k += 1;
            }
            if best.map_or(true, |(_, bk)| k > bk) {
                best = Some((g, k));
                if k == remaining {
                    break;
                }
            }
        }
        let Some((g, k)) = best else { break };

        let members: Vec<usize> = (0..size).filter(|&i| in_subgroup[i]).collect();
        let mut gj = 1 % m;
        for _ in 1..k {
            gj = mul_mod(gj, g, m);
            for &h in &members {
                in_subgroup[mul_mod(h as u64, gj, m) as usize] = true;
            }
        }
        card *= k;

        let good = mul_mod(gj, g, m) == 1;
        gens.push(g);
        ords.push(if good { k as i64 } else { -(k as i64) });
    }
    (gens, ords)
}

impl AlgebraicStructure {
    /// Builds the structure of a BGV plaintext space `Z[X]/(Phi_m(X), p^r)`.
    ///
    /// When `gens` is empty the generators are computed, otherwise `gens` and
    /// `ords` are validated against `m` and `p`.
    pub fn bgv(m: u64, p: u64, r: u32, gens: &[u64], ords: &[i64]) -> Result<Self> {
        if !(2..=MAX_BGV_M).contains(&m) {
            return Err(Error::parameter(alloc::format!(
                "m must lie in 2..={MAX_BGV_M}, got {m}"
            )));
        }
        if !is_prime(p) {
            return Err(Error::parameter(alloc::format!("p must be prime, got {p}")));
        }
        if r < 1 {
            return Err(Error::parameter("r must be at least 1"));
        }
        if gcd(p, m) != 1 {
            return Err(Error::parameter(alloc::format!(
                "p = {p} must be coprime with m = {m}"
            )));
        }
        if p.checked_pow(r).map_or(true, |v| v > i64::MAX as u64) {
            return Err(Error::parameter(alloc::format!("p^r = {p}^{r} overflows")));
        }

        let ord_p = multiplicative_order(p, m)
            .ok_or_else(|| Error::parameter("p is not invertible modulo m"))?;
        Self::assemble(SchemeKind::Bgv, m, p as i64, r, p % m, ord_p, gens, ords)
    }

    /// Builds the structure of a CKKS context with `m` a power of two and `r`
    /// bits of precision. Slots are the conjugate pairs of roots of unity.
    pub fn ckks(m: u64, precision: u32, gens: &[u64], ords: &[i64]) -> Result<Self> {
        if m < 4 || !m.is_power_of_two() {
            return Err(Error::parameter(alloc::format!(
                "m must be a power of two of at least 4 for CKKS, got {m}"
            )));
        }
        if !(1..=60).contains(&precision) {
            return Err(Error::parameter(alloc::format!(
                "precision must lie in 1..=60, got {precision}"
            )));
        }
        Self::assemble(SchemeKind::Ckks, m, -1, precision, m - 1, 2, gens, ords)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        kind: SchemeKind,
        m: u64,
        p: i64,
        r: u32,
        p_mod_m: u64,
        ord_p: u64,
        gens: &[u64],
        ords: &[i64],
    ) -> Result<Self> {
        let factors: Vec<u64> = factorize(m).into_iter().map(|(q, _)| q).collect();
        let phi_m = phi(m);
        let nslots = phi_m / ord_p;
        let pow2 = if m.is_power_of_two() {
            m.trailing_zeros()
        } else {
            0
        };

        let (gens, ords) = if gens.is_empty() && ords.is_empty() {
            if kind == SchemeKind::Ckks && m >= 8 {
                // Z_m^* = <-1> x <5> for m a power of two.
                (alloc::vec![5], alloc::vec![nslots as i64])
            } else {
                compute_generators(m, p_mod_m, phi_m)
            }
        } else {
            Self::check_generators(m, nslots, gens, ords)?;
            (gens.to_vec(), ords.to_vec())
        };

        Ok(Self {
            kind,
            m,
            p,
            r,
            phi_m,
            ord_p,
            nslots,
            gens,
            ords,
            pow2,
            factors,
        })
    }

    fn check_generators(m: u64, nslots: u64, gens: &[u64], ords: &[i64]) -> Result<()> {
        if gens.len() != ords.len() {
            return Err(Error::parameter(alloc::format!(
                "{} generators but {} orders",
                gens.len(),
                ords.len()
            )));
        }
        if let Some(g) = gens.iter().find(|&&g| g == 0 || g >= m || gcd(g, m) != 1) {
            return Err(Error::parameter(alloc::format!(
                "generator {g} is not a unit modulo {m}"
            )));
        }
        let product = ords
            .iter()
            .try_fold(1u64, |acc, &o| acc.checked_mul(o.unsigned_abs()));
        if ords.contains(&0) || product != Some(nslots) {
            return Err(Error::parameter(alloc::format!(
                "orders {ords:?} do not multiply to the {nslots} slots"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn kind(&self) -> SchemeKind {
        self.kind
    }

    #[must_use]
    pub const fn is_ckks(&self) -> bool {
        matches!(self.kind, SchemeKind::Ckks)
    }

    #[must_use]
    pub const fn m(&self) -> u64 {
        self.m
    }

    /// Plaintext characteristic, `-1` for CKKS.
    #[must_use]
    pub const fn p(&self) -> i64 {
        self.p
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.r
    }

    /// `p^r` for BGV, `None` for CKKS.
    #[must_use]
    pub fn p2r(&self) -> Option<u64> {
        match self.kind {
            SchemeKind::Bgv => (self.p as u64).checked_pow(self.r),
            SchemeKind::Ckks => None,
        }
    }

    #[must_use]
    pub const fn phi_m(&self) -> u64 {
        self.phi_m
    }

    #[must_use]
    pub const fn ord_p(&self) -> u64 {
        self.ord_p
    }

    #[must_use]
    pub const fn nslots(&self) -> u64 {
        self.nslots
    }

    #[must_use]
    pub fn gens(&self) -> &[u64] {
        &self.gens
    }

    #[must_use]
    pub fn ords(&self) -> &[i64] {
        &self.ords
    }

    /// `log2(m)` when `m` is a power of two, `0` otherwise.
    #[must_use]
    pub const fn pow2(&self) -> u32 {
        self.pow2
    }

    /// Distinct prime factors of `m`, in increasing order.
    #[must_use]
    pub fn factors(&self) -> &[u64] {
        &self.factors
    }
}

/// Returns the smallest cyclotomic index `m` meeting the given constraints.
///
/// ## Arguments
///
/// * `security` - Minimum estimated security, in bits.
/// * `bits` - Bit size of the ciphertext modulus the ring must support.
/// * `c` - Number of key-switching columns. Each column needs about one more
///   prime's worth of room in the modulus, which lowers the security margin.
/// * `p` - Plaintext characteristic.
/// * `d` - Required order of `p` modulo `m` (`0` or `1` for no constraint).
/// * `s` - Minimum number of plaintext slots.
/// * `chosen_m` - A preselected `m` to validate instead of searching (`0` to search).
///
/// ## Errors
///
/// `ParameterSearch` when no `m` below `2^17` fits, `Parameter` when
/// `chosen_m` does not satisfy the constraints.
///
/// ## Examples
///
/// ```
/// use homomod::algebra::find_m;
///
/// let m = find_m(80, 200, 2, 2, 0, 1, 0).unwrap();
/// assert!(m % 2 == 1);
/// ```
pub fn find_m(
    security: u32,
    bits: u64,
    c: u64,
    p: u64,
    d: u64,
    s: u64,
    chosen_m: u64,
) -> Result<u64> {
    const SEARCH_LIMIT: u64 = 1 << 17;
    const STDEV: f64 = 3.2;

    let fits = |m: u64| -> bool {
        if m < 3 || gcd(m, p) != 1 {
            return false;
        }
        let phi_m = phi(m);
        let budget = bits as f64 + c as f64 * crate::modchain::CTXT_PRIME_BITS as f64;
        let noise = if m.is_power_of_two() {
            STDEV
        } else {
            STDEV * (m as f64).sqrt()
        };
        if estimate_security(phi_m, budget - noise.log2(), 0) < f64::from(security) {
            return false;
        }
        let Some(ord) = multiplicative_order(p, m) else {
            return false;
        };
        (d <= 1 || ord == d) && phi_m / ord >= s
    };

    if chosen_m != 0 {
        return if fits(chosen_m) {
            Ok(chosen_m)
        } else {
            Err(Error::parameter(alloc::format!(
                "m = {chosen_m} does not meet the requested constraints"
            )))
        };
    }

    (3..SEARCH_LIMIT).find(|&m| fits(m)).ok_or_else(|| {
        Error::search(alloc::format!(
            "no m below {SEARCH_LIMIT} gives {security} bits of security for {bits} bits of modulus"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phi() {
        assert_eq!(phi(1), 1);
        assert_eq!(phi(3), 2);
        assert_eq!(phi(12), 4);
        assert_eq!(phi(31), 30);
        assert_eq!(phi(4369), 4096);
        assert_eq!(phi(1024), 512);
    }

    #[test]
    fn test_multiplicative_order() {
        assert_eq!(multiplicative_order(2, 3), Some(2));
        assert_eq!(multiplicative_order(2, 7), Some(3));
        assert_eq!(multiplicative_order(2, 31), Some(5));
        assert_eq!(multiplicative_order(2, 4), None);
    }

    #[test]
    fn test_bgv_defaults() {
        let alg = AlgebraicStructure::bgv(3, 2, 1, &[], &[]).unwrap();
        assert_eq!(alg.phi_m(), 2);
        assert_eq!(alg.ord_p(), 2);
        assert_eq!(alg.nslots(), 1);
        assert!(alg.gens().is_empty());
        assert_eq!(alg.pow2(), 0);
        assert_eq!(alg.factors(), &[3]);
        assert_eq!(alg.p2r(), Some(2));
    }

    #[test]
    fn test_bgv_generators() {
        for (m, p) in [(31, 2), (127, 2), (105, 2), (91, 3), (257, 3), (4369, 2)] {
            let alg = AlgebraicStructure::bgv(m, p, 1, &[], &[]).unwrap();
            assert_eq!(alg.phi_m() % alg.ord_p(), 0);
            assert_eq!(alg.nslots(), alg.phi_m() / alg.ord_p());
            assert_eq!(alg.gens().len(), alg.ords().len());
            let product: u64 = alg.ords().iter().map(|o| o.unsigned_abs()).product();
            assert_eq!(product, alg.nslots(), "m = {m}");
        }
    }

    #[test]
    fn test_ckks() {
        let alg = AlgebraicStructure::ckks(4, 20, &[], &[]).unwrap();
        assert_eq!(alg.p(), -1);
        assert_eq!(alg.nslots(), 1);
        assert!(alg.gens().is_empty());
        assert_eq!(alg.pow2(), 2);

        let alg = AlgebraicStructure::ckks(1 << 12, 30, &[], &[]).unwrap();
        assert_eq!(alg.nslots(), 1 << 10);
        assert_eq!(alg.gens(), &[5]);
        assert_eq!(alg.ords(), &[1 << 10]);
        assert_eq!(alg.p2r(), None);
    }

    #[test]
    fn test_invalid() {
        assert!(AlgebraicStructure::bgv(1, 2, 1, &[], &[]).is_err());
        assert!(AlgebraicStructure::bgv(9, 4, 1, &[], &[]).is_err());
        assert!(AlgebraicStructure::bgv(9, 3, 1, &[], &[]).is_err());
        assert!(AlgebraicStructure::bgv(9, 2, 0, &[], &[]).is_err());
        assert!(AlgebraicStructure::bgv(9, 2, 64, &[], &[]).is_err());
        assert!(AlgebraicStructure::ckks(12, 20, &[], &[]).is_err());
        assert!(AlgebraicStructure::ckks(16, 0, &[], &[]).is_err());
        assert!(AlgebraicStructure::ckks(16, 61, &[], &[]).is_err());
    }

    #[test]
    fn test_bgv_m_is_bounded() {
        assert!(matches!(
            AlgebraicStructure::bgv((1 << 33) + 1, 2, 1, &[], &[]),
            Err(Error::Parameter(_))
        ));
        assert!(matches!(
            AlgebraicStructure::bgv(MAX_BGV_M + 1, 2, 1, &[], &[]),
            Err(Error::Parameter(_))
        ));
        assert!(matches!(
            AlgebraicStructure::bgv(u64::MAX, 2, 1, &[3], &[1]),
            Err(Error::Parameter(_))
        ));
    }

    #[test]
    fn test_supplied_generators() {
        // 2 has order 5 mod 31: 6 slots.
        let alg = AlgebraicStructure::bgv(31, 2, 1, &[3], &[6]).unwrap();
        assert_eq!(alg.gens(), &[3]);
        assert!(AlgebraicStructure::bgv(31, 2, 1, &[3], &[5]).is_err());
        assert!(AlgebraicStructure::bgv(31, 2, 1, &[3, 5], &[6]).is_err());
        assert!(AlgebraicStructure::bgv(31, 2, 1, &[31], &[6]).is_err());
    }

    #[test]
    fn test_find_m() {
        let m = find_m(80, 200, 2, 2, 0, 1, 0).unwrap();
        assert!(gcd(m, 2) == 1);
        assert!(find_m(80, 200, 2, 2, 0, 1, m).is_ok());
        // Smaller candidates do not fit.
        for smaller in 3..m {
            assert!(find_m(80, 200, 2, 2, 0, 1, smaller).is_err());
        }
    }

    #[test]
    fn test_find_m_order_constraint() {
        let m = find_m(0, 10, 1, 2, 5, 1, 0).unwrap();
        assert_eq!(multiplicative_order(2, m), Some(5));
        assert_eq!(m, 31);
    }

    #[test]
    fn test_find_m_exhausted() {
        assert!(matches!(
            find_m(1000, 100_000, 3, 2, 0, 1, 0),
            Err(Error::ParameterSearch(_))
        ));
    }
}
