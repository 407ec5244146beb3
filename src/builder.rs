//! Typestate builder for [`Context`].
//!
//! The scheme is a type parameter, so setters that only make sense for one
//! scheme do not exist on the other:
//!
//! ```compile_fail
//! use homomod::{Ckks, ContextBuilder};
//!
//! // `p` is a BGV-only parameter.
//! let _ = ContextBuilder::<Ckks>::new().p(3);
//! ```
//!
//! ```compile_fail
//! use homomod::{Bgv, ContextBuilder};
//!
//! // `precision` is a CKKS-only parameter.
//! let _ = ContextBuilder::<Bgv>::new().precision(30);
//! ```

use crate::algebra::{AlgebraicStructure, SchemeKind};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::modchain::MAX_RESOLUTION;

use alloc::vec::Vec;
use core::marker::PhantomData;
use tracing::instrument;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Bgv {}
    impl Sealed for super::Ckks {}
}

/// A homomorphic encryption scheme a [`ContextBuilder`] can target.
pub trait Scheme: sealed::Sealed {
    const KIND: SchemeKind;
    const NAME: &'static str;
    const DEFAULT_M: u64;
    const DEFAULT_P: i64;
    const DEFAULT_R: u32;
}

/// Brakerski-Gentry-Vaikuntanathan, exact arithmetic modulo `p^r`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bgv;

/// Cheon-Kim-Kim-Song, approximate arithmetic on complex slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ckks;

impl Scheme for Bgv {
    const KIND: SchemeKind = SchemeKind::Bgv;
    const NAME: &'static str = "BGV";
    const DEFAULT_M: u64 = 3;
    const DEFAULT_P: i64 = 2;
    const DEFAULT_R: u32 = 1;
}

impl Scheme for Ckks {
    const KIND: SchemeKind = SchemeKind::Ckks;
    const NAME: &'static str = "CKKS";
    const DEFAULT_M: u64 = 4;
    const DEFAULT_P: i64 = -1;
    const DEFAULT_R: u32 = 20;
}

/// Builder of [`Context`] objects.
///
/// ## Examples
///
/// ```
/// use homomod::{Bgv, ContextBuilder};
///
/// let context = ContextBuilder::<Bgv>::new()
///     .m(127)
///     .p(2)
///     .r(1)
///     .bits(200)
///     .c(2)
///     .build()
///     .unwrap();
/// assert_eq!(context.num_digits(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextBuilder<S: Scheme> {
    m: u64,
    p: i64,
    r: u32,
    c: usize,
    gens: Vec<u64>,
    ords: Vec<i64>,
    bits: u64,
    sk_hwt: i64,
    resolution: u32,
    bits_in_special_primes: u64,
    build_mod_chain: bool,
    mvec: Vec<u64>,
    build_cache: bool,
    thick: bool,
    bootstrappable: bool,
    _scheme: PhantomData<S>,
}

impl<S: Scheme> Default for ContextBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scheme> ContextBuilder<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            m: S::DEFAULT_M,
            p: S::DEFAULT_P,
            r: S::DEFAULT_R,
            c: 3,
            gens: Vec::new(),
            ords: Vec::new(),
            bits: 300,
            sk_hwt: 0,
            resolution: 3,
            bits_in_special_primes: 0,
            build_mod_chain: true,
            mvec: Vec::new(),
            build_cache: false,
            thick: false,
            bootstrappable: false,
            _scheme: PhantomData,
        }
    }

    #[must_use]
    pub fn m(mut self, m: u64) -> Self {
        self.m = m;
        self
    }

    /// Number of columns of the key-switching matrices.
    #[must_use]
    pub fn c(mut self, c: usize) -> Self {
        self.c = c;
        self
    }

    /// Generators of `Z_m^* / <p>`, computed when left empty.
    #[must_use]
    pub fn gens(mut self, gens: Vec<u64>) -> Self {
        self.gens = gens;
        self
    }

    #[must_use]
    pub fn ords(mut self, ords: Vec<i64>) -> Self {
        self.ords = ords;
        self
    }

    /// Bits of ciphertext modulus provided by the ctxt primes.
    #[must_use]
    pub fn bits(mut self, bits: u64) -> Self {
        self.bits = bits;
        self
    }

    #[must_use]
    pub fn sk_hwt(mut self, sk_hwt: i64) -> Self {
        self.sk_hwt = sk_hwt;
        self
    }

    #[must_use]
    pub fn resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn bits_in_special_primes(mut self, bits: u64) -> Self {
        self.bits_in_special_primes = bits;
        self
    }

    /// Whether `build` also builds the modulus chain.
    #[must_use]
    pub fn build_mod_chain(mut self, yes: bool) -> Self {
        self.build_mod_chain = yes;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.c < 1 {
            return Err(Error::parameter("c must be at least 1"));
        }
        if self.bits == 0 {
            return Err(Error::parameter("bits must be positive"));
        }
        if self.sk_hwt < 0 {
            return Err(Error::parameter(alloc::format!(
                "sk_hwt must be non-negative, got {}",
                self.sk_hwt
            )));
        }
        if !(1..=MAX_RESOLUTION).contains(&self.resolution) {
            return Err(Error::parameter(alloc::format!(
                "resolution must lie in 1..={MAX_RESOLUTION}, got {}",
                self.resolution
            )));
        }
        if self.bootstrappable {
            if self.mvec.is_empty() {
                return Err(Error::parameter("bootstrapping requires mvec"));
            }
            if !self.build_mod_chain {
                return Err(Error::parameter(
                    "bootstrapping requires building the modulus chain",
                ));
            }
        }
        Ok(())
    }

    /// Validates the configuration and builds the context.
    ///
    /// ## Errors
    ///
    /// `Parameter` for an invalid configuration, `ParameterSearch` when the
    /// modulus chain cannot be filled.
    #[instrument(skip_all, fields(scheme = S::NAME, m = self.m))]
    pub fn build(&self) -> Result<Context> {
        self.validate()?;

        let algebra = match S::KIND {
            SchemeKind::Bgv => {
                let p = u64::try_from(self.p)
                    .map_err(|_| Error::parameter(alloc::format!("invalid p = {}", self.p)))?;
                AlgebraicStructure::bgv(self.m, p, self.r, &self.gens, &self.ords)?
            }
            SchemeKind::Ckks => AlgebraicStructure::ckks(self.m, self.r, &self.gens, &self.ords)?,
        };

        let mut context = Context::new(algebra);
        if self.build_mod_chain {
            context.build_mod_chain(
                self.bits,
                self.c,
                self.bootstrappable,
                self.sk_hwt,
                self.resolution,
                self.bits_in_special_primes,
            )?;
        }
        if self.bootstrappable {
            context.enable_bootstrapping(self.mvec.clone(), self.build_cache, self.thick)?;
        }

        let security = context.security_level().ok();
        tracing::info!(
            nslots = context.nslots(),
            bits_of_q = context.bit_size_of_q(),
            ?security,
            "context built"
        );
        Ok(context)
    }
}

impl ContextBuilder<Bgv> {
    #[must_use]
    pub fn p(mut self, p: u64) -> Self {
        self.p = p as i64;
        self
    }

    /// Hensel lifting exponent: the plaintext space is modulo `p^r`.
    #[must_use]
    pub fn r(mut self, r: u32) -> Self {
        self.r = r;
        self
    }

    /// Coprime factorization of `m` used by bootstrapping.
    #[must_use]
    pub fn mvec(mut self, mvec: Vec<u64>) -> Self {
        self.mvec = mvec;
        self
    }

    #[must_use]
    pub fn thinboot(mut self) -> Self {
        self.thick = false;
        self
    }

    #[must_use]
    pub fn thickboot(mut self) -> Self {
        self.thick = true;
        self
    }

    #[must_use]
    pub fn build_cache(mut self, yes: bool) -> Self {
        self.build_cache = yes;
        self
    }

    #[must_use]
    pub fn bootstrappable(mut self, yes: bool) -> Self {
        self.bootstrappable = yes;
        self
    }
}

impl ContextBuilder<Ckks> {
    /// Bits of precision of the encoded values.
    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.r = precision;
        self
    }
}

impl<S: Scheme> core::fmt::Display for ContextBuilder<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ContextBuilder<{}> {{m = {}", S::NAME, self.m)?;
        match S::KIND {
            SchemeKind::Bgv => write!(f, ", p = {}, r = {}", self.p, self.r)?,
            SchemeKind::Ckks => write!(f, ", precision = {}", self.r)?,
        }
        write!(
            f,
            ", c = {}, gens = {:?}, ords = {:?}, bits = {}, sk_hwt = {}, resolution = {}, \
             bits_in_special_primes = {}, build_mod_chain = {}",
            self.c,
            self.gens,
            self.ords,
            self.bits,
            self.sk_hwt,
            self.resolution,
            self.bits_in_special_primes,
            self.build_mod_chain
        )?;
        if matches!(S::KIND, SchemeKind::Bgv) {
            write!(
                f,
                ", mvec = {:?}, build_cache = {}, thick = {}, bootstrappable = {}",
                self.mvec, self.build_cache, self.thick, self.bootstrappable
            )?;
        }
        write!(f, "}}")
    }
}
