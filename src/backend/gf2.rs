//! A public-key bit encryption scheme over `GF(2)[X]`.
//!
//! The secret key is a random polynomial `S` of degree `d`. Each of the `tau`
//! public key entries is `S·q + X·r`, with `q` of degree `dp` and `r` of
//! degree `delta`. A bit is encrypted as itself plus a random subset sum of
//! the public key, and decrypted as the constant term of its remainder
//! modulo `S`.
//!
//! The noise of a fresh ciphertext has degree `delta + 1`. An `and` gate adds
//! noise degrees, so a bit stays decryptable while the product of its noise
//! terms has degree below `d`. A circuit whose deepest monomial multiplies
//! `D` fresh ciphertexts needs `D·(delta + 1) < d`.

use crate::cipher::{CipheredBit, EncryptionScheme};
use crate::error::{Error, Result};
use crate::polynomial::Polynomial;

use alloc::vec::Vec;

/// Parameters of the scheme.
///
/// ## Fields
///
/// * `d` - The degree of the secret key.
/// * `dp` - Such that `d+dp` is the degree of the public key.
/// * `delta` - The noise parameter.
/// * `tau` - The size of public key.
///
/// ## Examples
///
/// ```
/// use homomod::backend::gf2::Parameters;
///
/// let parameters = Parameters::new(256, 32, 1, 32).unwrap();
/// assert_eq!(parameters.d(), 256);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    d: u16,
    dp: u16,
    delta: u16,
    tau: u16,
}

impl Parameters {
    /// Creates a new set of parameters.
    ///
    /// ## Arguments
    ///
    /// * `d` - The degree of the secret key.
    /// * `dp` - Such that `d+dp` is the degree of the public key.
    /// * `delta` - The noise parameter.
    /// * `tau` - The size of the public key.
    ///
    /// ## Errors
    ///
    /// `Parameter` if `delta` is not strictly less than `d`, or if any
    /// parameter is zero.
    pub fn new(d: u16, dp: u16, delta: u16, tau: u16) -> Result<Self> {
        if d == 0 || dp == 0 || delta == 0 || tau == 0 {
            return Err(Error::parameter("parameters must be strictly positive"));
        }
        if delta >= d {
            return Err(Error::parameter(alloc::format!(
                "delta ({delta}) must be strictly less than d ({d})"
            )));
        }
        Ok(Self { d, dp, delta, tau })
    }

    #[must_use]
    pub const fn d(&self) -> u16 {
        self.d
    }

    #[must_use]
    pub const fn dp(&self) -> u16 {
        self.dp
    }

    #[must_use]
    pub const fn delta(&self) -> u16 {
        self.delta
    }

    #[must_use]
    pub const fn tau(&self) -> u16 {
        self.tau
    }

    /// Largest number of fresh ciphertexts a single monomial of a circuit may
    /// multiply together before decryption fails.
    #[must_use]
    pub const fn max_product_degree(&self) -> u16 {
        (self.d - 1) / (self.delta + 1)
    }
}

/// The secret key. Zeroized when dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey(Polynomial);

impl SecretKey {
    /// Rebuilds a secret key from the bytes of [`SecretKey::get_bytes`].
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::backend::gf2::SecretKey;
    ///
    /// // INSECURE!!! Only for demonstration purposes
    /// let sk = SecretKey::new(&[5, 14, 8]);
    /// assert_eq!(SecretKey::new(&sk.get_bytes()), sk);
    /// ```
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self(Polynomial::from_bytes(bytes))
    }

    fn random(d: u16) -> Result<Self> {
        Polynomial::random(usize::from(d)).map(Self)
    }

    #[must_use]
    pub fn get_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The public key: `tau` encryptions of zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Vec<Polynomial>);

impl PublicKey {
    /// Rebuilds a public key from the bytes of [`PublicKey::get_bytes`].
    #[must_use]
    pub fn new(bytes: &[Vec<u8>]) -> Self {
        Self(bytes.iter().map(|b| Polynomial::from_bytes(b)).collect())
    }

    fn random(params: &Parameters, secret_key: &SecretKey) -> Result<Self> {
        let x = Polynomial::monomial(1);
        let list = (0..params.tau)
            .map(|_| {
                let q = Polynomial::random(usize::from(params.dp))?;
                let r = Polynomial::random(usize::from(params.delta))?;
                Ok(secret_key.0.mul(&q).add(&r.mul(&x)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(list))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get_bytes(&self) -> Vec<Vec<u8>> {
        self.0.iter().map(Polynomial::to_bytes).collect()
    }
}

/// An encrypted bit. It has a single slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gf2Bit(Polynomial);

impl Gf2Bit {
    #[must_use]
    pub fn polynomial(&self) -> &Polynomial {
        &self.0
    }
}

impl CipheredBit for Gf2Bit {
    fn xor(&self, other: &Self) -> Self {
        Self(self.0.add(&other.0))
    }

    fn and(&self, other: &Self) -> Self {
        Self(self.0.mul(&other.0))
    }

    fn not(&self) -> Self {
        Self(self.0.add(&Polynomial::constant(true)))
    }

    fn trivial(&self, bit: bool) -> Self {
        Self(Polynomial::constant(bit))
    }

    fn slot_count(&self) -> usize {
        1
    }
}

/// A key pair with its parameters.
#[derive(Clone, Debug)]
pub struct Gf2Scheme {
    parameters: Parameters,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Gf2Scheme {
    /// Generates a fresh key pair.
    ///
    /// ## Errors
    ///
    /// `Parameter` if the system random source fails.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::backend::gf2::{Gf2Scheme, Parameters};
    /// use homomod::{CipheredBit, EncryptionScheme};
    ///
    /// let scheme = Gf2Scheme::generate(Parameters::new(64, 32, 8, 32).unwrap()).unwrap();
    /// let a = scheme.encrypt(&[true]).unwrap();
    /// let b = scheme.encrypt(&[false]).unwrap();
    /// assert_eq!(scheme.decrypt(&a.xor(&b)).unwrap(), vec![true]);
    /// ```
    pub fn generate(parameters: Parameters) -> Result<Self> {
        let secret_key = SecretKey::random(parameters.d)?;
        let public_key = PublicKey::random(&parameters, &secret_key)?;
        tracing::debug!(
            d = parameters.d,
            dp = parameters.dp,
            delta = parameters.delta,
            tau = parameters.tau,
            "generated gf2 key pair"
        );
        Ok(Self {
            parameters,
            secret_key,
            public_key,
        })
    }

    /// Assembles a scheme from previously saved keys.
    ///
    /// ## Errors
    ///
    /// `Parameter` if the public key does not have `tau` entries.
    pub fn from_keys(
        parameters: Parameters,
        secret_key: SecretKey,
        public_key: PublicKey,
    ) -> Result<Self> {
        if public_key.len() != usize::from(parameters.tau) {
            return Err(Error::parameter(alloc::format!(
                "public key has {} entries, expected {}",
                public_key.len(),
                parameters.tau
            )));
        }
        Ok(Self {
            parameters,
            secret_key,
            public_key,
        })
    }

    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn random_subset(&self) -> Result<Vec<u8>> {
        let mut subset = alloc::vec![0u8; self.public_key.len().div_ceil(8)];
        getrandom::getrandom(&mut subset)
            .map_err(|e| Error::parameter(alloc::format!("random source failed: {e}")))?;
        Ok(subset)
    }
}

impl EncryptionScheme for Gf2Scheme {
    type Bit = Gf2Bit;

    fn slot_count(&self) -> usize {
        1
    }

    fn encrypt(&self, bits: &[bool]) -> Result<Gf2Bit> {
        let &[bit] = bits else {
            return Err(Error::parameter(alloc::format!(
                "{} bits for a single slot",
                bits.len()
            )));
        };
        let subset = self.random_subset()?;
        let c = self
            .public_key
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| subset[i / 8] & (1 << (i % 8)) != 0)
            .fold(Polynomial::constant(bit), |acc, (_, p)| acc.add(p));
        Ok(Gf2Bit(c))
    }

    fn decrypt(&self, bit: &Gf2Bit) -> Result<Vec<bool>> {
        Ok(alloc::vec![bit.0.rem(&self.secret_key.0).evaluate(false)])
    }
}
