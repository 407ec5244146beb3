//! Closed-form estimate of the bit security of the underlying RLWE instance.
//!
//! The estimate uses affine approximations of the lwe-estimator
//! (<https://bitbucket.org/malb/lwe-estimator>, August 2020). With
//! `X = n / log2(1/alpha)` the security is approximated by `slope*X + constant`,
//! where the slope and constant depend on the Hamming weight of the secret key.

/// Smallest secret-key Hamming weight for which an estimate is available.
pub const MIN_SK_HWT: i64 = 120;

/// Hamming weight used for bootstrappable contexts when none is requested.
pub const BOOT_DFLT_SK_HWT: i64 = MIN_SK_HWT;

/// One row of the piecewise-linear security model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HwtRow {
    pub weight: f64,
    pub slope: f64,
    pub constant: f64,
}

const fn row(weight: f64, slope: f64, constant: f64) -> HwtRow {
    HwtRow {
        weight,
        slope,
        constant,
    }
}

/// Affine coefficients for dense `{-1, 0, 1}` keys.
pub const DENSE_ROW: HwtRow = row(0.0, 3.8, -20.0);

/// Affine coefficients for sparse keys, sorted by increasing weight.
pub const HWT_TABLE: &[HwtRow] = &[
    row(120.0, 2.4, 19.0),
    row(150.0, 2.67, 13.0),
    row(180.0, 2.83, 10.0),
    row(210.0, 3.0, 6.0),
    row(240.0, 3.1, 3.0),
    row(270.0, 3.2, 1.0),
    row(300.0, 3.3, -3.0),
    row(330.0, 3.35, -4.0),
    row(360.0, 3.4, -5.0),
    row(390.0, 3.45, -7.0),
    row(420.0, 3.5, -10.0),
    row(450.0, 3.55, -12.0),
];

/// Returns the `(slope, constant)` pair used for a key of Hamming weight `hwt`,
/// or `None` when no estimate is defined for that weight.
fn coefficients(hwt: i64) -> Option<(f64, f64)> {
    if hwt < 0 || (hwt > 0 && hwt < MIN_SK_HWT) {
        return None;
    }
    if hwt == 0 {
        return Some((DENSE_ROW.slope, DENSE_ROW.constant));
    }

    let weight = hwt as f64;
    let upper = HWT_TABLE.partition_point(|r| r.weight <= weight);
    if upper >= HWT_TABLE.len() {
        // No extrapolation past the heaviest tabulated weight.
        let last = HWT_TABLE[HWT_TABLE.len() - 1];
        return Some((last.slope, last.constant));
    }

    // `hwt >= MIN_SK_HWT` guarantees `upper >= 1`.
    let lo = HWT_TABLE[upper - 1];
    let hi = HWT_TABLE[upper];
    let frac = (weight - lo.weight) / (hi.weight - lo.weight);
    Some((
        lo.slope + frac * (hi.slope - lo.slope),
        lo.constant + frac * (hi.constant - lo.constant),
    ))
}

/// Estimates the security level, in bits, of an RLWE instance.
///
/// ## Arguments
///
/// * `n` - The LWE dimension, `phi(m)`.
/// * `log2_alpha_inv` - `log2(1/alpha)` where `alpha` is the relative noise.
/// * `hwt` - Hamming weight of the secret key, `0` for dense keys.
///
/// ## Returns
///
/// The estimate, never negative. `0` means the parameters are insecure or
/// that no estimate is available (sparse keys lighter than [`MIN_SK_HWT`]).
///
/// ## Examples
///
/// ```
/// use homomod::security::estimate_security;
///
/// let bits = estimate_security(16384, 300.0, 0);
/// assert!(bits > 180.0);
/// assert_eq!(estimate_security(16384, 300.0, 64), 0.0);
/// ```
#[must_use]
pub fn estimate_security(n: u64, log2_alpha_inv: f64, hwt: i64) -> f64 {
    let Some((slope, constant)) = coefficients(hwt) else {
        return 0.0;
    };
    if !(log2_alpha_inv.is_finite() && log2_alpha_inv > 0.0) {
        return 0.0;
    }

    let x = n as f64 / log2_alpha_inv;
    let ret = slope.mul_add(x, constant);
    if ret < 0.0 {
        0.0
    } else {
        ret
    }
}
