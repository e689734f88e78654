//! # Ring Module
//!
//! Provides the [`Ring`] struct for the plaintext space Z_N of the cryptosystem
//! and the big-integer helpers it is built on.

pub mod helper;
pub mod math;

pub use helper::lcm;
pub use math::Ring;
