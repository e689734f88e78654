//! # Paillier Module
//!
//! Additively homomorphic encryption over Z_N:
//! `combine` multiplies ciphertexts (plaintexts add), `scale` raises a
//! ciphertext to a public scalar (plaintext is multiplied).

pub mod keys;
pub mod primes;

pub use keys::{PrivateKey, PublicKey, generate_keypair};

use num_bigint::BigUint;

use serde::{Deserialize, Serialize};

/// An element of Z*_{N^2}. Opaque outside of the key operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext(pub(crate) BigUint);
