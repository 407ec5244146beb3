//! Ready-made homomorphic operations.

pub mod numbers;
