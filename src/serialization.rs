//! Persistence of [`Context`] objects.
//!
//! A context is stored in two parts:
//!
//! - the *base*, `[m p r gens ords]`, which is what is needed to construct the
//!   context;
//! - the *chain*, holding everything built afterwards: noise parameters, the
//!   primes with their roles, the digits and bootstrapping data.
//!
//! Both parts have a textual (JSON) and a binary (bincode) encoding. Reading
//! a chain validates the whole record before touching the context.

use crate::algebra::AlgebraicStructure;
use crate::context::{Context, RecryptionData};
use crate::error::{Error, Result};
use crate::primes::{IndexSet, PrimeRole};

use alloc::string::ToString;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Upper bound on the size of a binary record.
const MAX_BINARY_SIZE: usize = 1 << 24;

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_BINARY_SIZE>()
}

/// The data needed to construct a context: `[m p r gens ords]`.
///
/// `p == -1` designates a CKKS context, in which case `r` is the precision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ContextBase {
    pub m: u64,
    pub p: i64,
    pub r: u32,
    pub gens: Vec<u64>,
    pub ords: Vec<i64>,
}

/// One prime of the modulus chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct PrimeRecord {
    pub value: u64,
    pub role: PrimeRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct RecryptionRecord {
    pub mvec: Vec<u64>,
    pub build_cache: bool,
    pub also_thick: bool,
}

/// Everything attached to a context after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ChainData {
    pub stdev: f64,
    pub scale: f64,
    pub primes: Vec<PrimeRecord>,
    pub digits: Vec<Vec<usize>>,
    pub hwt: i64,
    pub e: u32,
    pub e_prime: u32,
    pub recryption: Option<RecryptionRecord>,
}

#[derive(Serialize, Deserialize, bincode::Encode, bincode::Decode)]
struct ContextRecord {
    base: ContextBase,
    chain: ChainData,
}

fn inconsistent(error: Error) -> Error {
    match error {
        Error::Serialization(_) => error,
        other => Error::serialization(other.to_string()),
    }
}

impl Context {
    /// Constructs a context with an empty chain from its base.
    pub fn from_base(base: &ContextBase) -> Result<Self> {
        let algebra = if base.p == -1 {
            AlgebraicStructure::ckks(base.m, base.r, &base.gens, &base.ords)?
        } else {
            let p = u64::try_from(base.p)
                .map_err(|_| Error::parameter(alloc::format!("invalid p = {}", base.p)))?;
            AlgebraicStructure::bgv(base.m, p, base.r, &base.gens, &base.ords)?
        };
        Ok(Self::new(algebra))
    }

    #[must_use]
    pub fn base(&self) -> ContextBase {
        ContextBase {
            m: self.m(),
            p: self.p(),
            r: self.r(),
            gens: self.algebra.gens().to_vec(),
            ords: self.algebra.ords().to_vec(),
        }
    }

    #[must_use]
    pub fn chain_data(&self) -> ChainData {
        let primes = self
            .moduli
            .iter()
            .enumerate()
            .map(|(i, &value)| PrimeRecord {
                value,
                // Every handle of the chain belongs to exactly one set.
                role: self.role_of(i).unwrap_or(PrimeRole::Ctxt),
            })
            .collect();
        ChainData {
            stdev: self.stdev,
            scale: self.scale,
            primes,
            digits: self.digits.iter().map(|d| d.as_slice().to_vec()).collect(),
            hwt: self.hwt_param,
            e: self.e_param,
            e_prime: self.e_prime_param,
            recryption: self.recryption.as_ref().map(RecryptionRecord::from),
        }
    }

    /// Attaches a chain to a context whose chain is empty.
    ///
    /// The record is validated against a scratch context first, so on error
    /// `self` is left untouched.
    ///
    /// ## Errors
    ///
    /// `Logic` if the chain of `self` is not empty, `Serialization` if the
    /// record is inconsistent.
    pub fn set_chain_data(&mut self, chain: &ChainData) -> Result<()> {
        if !self.moduli.is_empty() {
            return Err(Error::logic(
                "cannot read a modulus chain into a context that already has one",
            ));
        }

        let mut scratch = Self::new(self.algebra.clone());
        scratch.set_stdev(chain.stdev).map_err(inconsistent)?;
        scratch.set_scale(chain.scale).map_err(inconsistent)?;
        for record in &chain.primes {
            scratch
                .add_prime(record.value, record.role)
                .map_err(inconsistent)?;
        }

        let digits: Vec<IndexSet> = chain
            .digits
            .iter()
            .map(|d| d.iter().copied().collect())
            .collect();
        let total: usize = digits.iter().map(IndexSet::card).sum();
        let union = digits.iter().fold(IndexSet::new(), |acc, d| &acc | d);
        if total != union.card() || &union != scratch.ctxt_primes.handles() {
            return Err(Error::serialization(
                "digits do not partition the ctxt primes",
            ));
        }
        if chain.digits.iter().any(|d| d.len() != IndexSet::from_iter(d.iter().copied()).card()) {
            return Err(Error::serialization("digit with repeated handles"));
        }
        scratch.digits = digits;

        if chain.hwt < 0 {
            return Err(Error::serialization(alloc::format!(
                "negative secret key weight {}",
                chain.hwt
            )));
        }
        if chain.e < chain.e_prime || (chain.e == 0) != (chain.e_prime == 0) {
            return Err(Error::serialization(alloc::format!(
                "inconsistent bootstrapping exponents e = {}, e' = {}",
                chain.e,
                chain.e_prime
            )));
        }
        scratch.hwt_param = chain.hwt;
        scratch.e_param = chain.e;
        scratch.e_prime_param = chain.e_prime;

        if let Some(rec) = &chain.recryption {
            scratch
                .enable_bootstrapping(rec.mvec.clone(), rec.build_cache, rec.also_thick)
                .map_err(inconsistent)?;
        }

        *self = scratch;
        Ok(())
    }

    pub fn write_base_text<W: Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer(w, &self.base())?;
        Ok(())
    }

    pub fn read_base_text<R: Read>(r: R) -> Result<ContextBase> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn write_base_binary<W: Write>(&self, mut w: W) -> Result<()> {
        bincode::encode_into_std_write(self.base(), &mut w, bincode_config())?;
        Ok(())
    }

    pub fn read_base_binary<R: Read>(mut r: R) -> Result<ContextBase> {
        Ok(bincode::decode_from_std_read(&mut r, bincode_config())?)
    }

    pub fn write_chain_text<W: Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer(w, &self.chain_data())?;
        Ok(())
    }

    /// Reads a chain written by [`Context::write_chain_text`] into `self`.
    pub fn read_chain_text<R: Read>(&mut self, r: R) -> Result<()> {
        let chain: ChainData = serde_json::from_reader(r)?;
        self.set_chain_data(&chain)
    }

    pub fn write_chain_binary<W: Write>(&self, mut w: W) -> Result<()> {
        bincode::encode_into_std_write(self.chain_data(), &mut w, bincode_config())?;
        Ok(())
    }

    /// Reads a chain written by [`Context::write_chain_binary`] into `self`.
    pub fn read_chain_binary<R: Read>(&mut self, mut r: R) -> Result<()> {
        let chain: ChainData = bincode::decode_from_std_read(&mut r, bincode_config())?;
        self.set_chain_data(&chain)
    }

    fn record(&self) -> ContextRecord {
        ContextRecord {
            base: self.base(),
            chain: self.chain_data(),
        }
    }

    fn from_record(record: &ContextRecord) -> Result<Self> {
        let mut context = Self::from_base(&record.base).map_err(inconsistent)?;
        context.set_chain_data(&record.chain)?;
        Ok(context)
    }

    /// Writes the whole context, base followed by chain, as JSON.
    ///
    /// ## Examples
    ///
    /// ```
    /// use homomod::{Bgv, Context, ContextBuilder};
    ///
    /// let context = ContextBuilder::<Bgv>::new().m(31).bits(120).build().unwrap();
    ///
    /// let mut buffer = Vec::new();
    /// context.write_text(&mut buffer).unwrap();
    /// let restored = Context::from_text(buffer.as_slice()).unwrap();
    /// assert_eq!(context, restored);
    /// ```
    pub fn write_text<W: Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer_pretty(w, &self.record())?;
        Ok(())
    }

    pub fn from_text<R: Read>(r: R) -> Result<Self> {
        let record: ContextRecord = serde_json::from_reader(r)?;
        Self::from_record(&record)
    }

    pub fn write_binary<W: Write>(&self, mut w: W) -> Result<()> {
        bincode::encode_into_std_write(self.record(), &mut w, bincode_config())?;
        Ok(())
    }

    pub fn from_binary<R: Read>(mut r: R) -> Result<Self> {
        let record: ContextRecord = bincode::decode_from_std_read(&mut r, bincode_config())?;
        Self::from_record(&record)
    }
}

impl From<&RecryptionData> for RecryptionRecord {
    fn from(data: &RecryptionData) -> Self {
        Self {
            mvec: data.mvec().to_vec(),
            build_cache: data.build_cache(),
            also_thick: data.also_thick(),
        }
    }
}
