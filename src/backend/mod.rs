//! Implementations of [`EncryptionScheme`](crate::EncryptionScheme).

pub mod clear;
pub mod gf2;
