// src/util/mod.rs
pub mod fast_math;
pub mod polynomial;

pub use polynomial::Polynomial;
