//! Usage: `use homomod::prelude::*;`

pub use crate::backend::clear::{ClearBit, ClearScheme};
pub use crate::backend::gf2::{Gf2Bit, Gf2Scheme, Parameters, PublicKey, SecretKey};
pub use crate::impls::numbers::{
    HomomorphicAddition, HomomorphicNotGate, HomomorphicSubtraction, HomomorphicXorGate,
};
pub use crate::operations::*;
pub use crate::{
    Bgv, CipheredBit, Ckks, Context, ContextBuilder, EncryptedBinaryNumber, EncryptionScheme,
    IterationBound, ModularReducer,
};
