//! Parameter contexts for homomorphic encryption, and oblivious modular
//! reduction of encrypted binary numbers.
//!
//! # Usage
//!
//! The crate has two halves.
//!
//! A [`Context`] gathers everything a BGV or CKKS deployment agrees on before
//! any key exists: the cyclotomic ring and its slot structure, the chain of
//! ciphertext, special and small primes, the key-switching digits, the noise
//! bounds and an estimate of the security level. It is built with a
//! [`ContextBuilder`] whose scheme is fixed in its type, and can be written to
//! and read back from JSON or bincode.
//!
//! On the encrypted side, numbers are bit-sliced into [`EncryptedBinaryNumber`]s
//! over any [`EncryptionScheme`]. [`ModularReducer`] reduces one modulo
//! another with a public, fixed number of encrypted conditional
//! subtractions. Two schemes ship with the crate: [`backend::gf2`], a
//! public-key scheme over `GF(2)[X]`, and [`backend::clear`], an insecure
//! identity scheme with many slots for exercising circuits.
//!
//! # Examples
//!
//! ## Building a context
//!
//! ```
//! use homomod::{Bgv, ContextBuilder};
//!
//! let context = ContextBuilder::<Bgv>::new()
//!     .m(31)
//!     .p(2)
//!     .bits(120)
//!     .build()
//!     .unwrap();
//!
//! assert!(context.bit_size_of_q() >= 120);
//! assert_eq!(context.full_primes().card(), context.ctxt_primes().card() + context.special_primes().card());
//! ```
//!
//! ## Reducing under encryption
//!
//! ```
//! use homomod::backend::gf2::{Gf2Scheme, Parameters};
//! use homomod::{EncryptedBinaryNumber, IterationBound, ModularReducer};
//!
//! // -----------------------------------  d  dp delta tau
//! let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32).unwrap()).unwrap();
//!
//! let a = EncryptedBinaryNumber::encrypt(&scheme, &[3], 3).unwrap();
//! let m = EncryptedBinaryNumber::encrypt(&scheme, &[2], 3).unwrap();
//!
//! let r = ModularReducer::new(IterationBound::exact(2)).run(a, &m).unwrap();
//! assert_eq!(r.decrypt(&scheme).unwrap(), vec![1]);
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and spans. It installs no subscriber.

extern crate alloc;

pub mod algebra;
pub mod backend;
mod builder;
mod cipher;
mod context;
mod error;
pub mod impls;
pub mod modchain;
pub mod operations;
pub mod polynomial;
pub mod prelude;
pub mod primes;
mod reduction;
pub mod security;
pub mod serialization;

pub use algebra::{AlgebraicStructure, SchemeKind};
pub use builder::{Bgv, Ckks, ContextBuilder, Scheme};
pub use cipher::{CipheredBit, EncryptedBinaryNumber, EncryptionScheme};
pub use context::{Context, RecryptionData};
pub use error::{Error, Result};
pub use impls::numbers::Comparison;
pub use primes::{IndexSet, PrimeRole, PrimeSet};
pub use reduction::{IterationBound, ModularReducer, Reduction, ReductionState};
pub use serialization::{ChainData, ContextBase};
