//! # enc-bloom
//!
//! Privacy-preserving set membership over a Bloom filter whose bits are
//! encrypted one by one under Paillier.
//!
//! The filter owner builds an [`EncryptedFilter`] and keeps the [`Decryptor`].
//! A querier holding only the public key runs a [`QueryEngine`] in one of three
//! [`QueryMode`]s (union, intersection, cardinality) and sends back blinded
//! [`ResultPair`]s, which only the decryptor can interpret.

pub mod bloom;
pub mod decryptor;
pub mod engine;
pub mod entropy;
pub mod errors;
pub mod filter;
pub mod paillier;
pub mod params;
pub mod ring;

pub use bloom::BloomFilter;
pub use decryptor::{Decryptor, Outcome};
pub use engine::{QueryEngine, QueryMode, ResultPair};
pub use entropy::{EntropySource, OsEntropy, SeededEntropy};
pub use errors::{EncBloomError, Result};
pub use filter::EncryptedFilter;
pub use params::EncBloomParams;
