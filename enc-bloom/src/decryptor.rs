//! # Decryptor
//!
//! The filter owner's side of the protocol. Holds the private key and turns
//! result pairs back into protocol answers; nothing else in the crate can
//! decrypt.

use crate::engine::{QueryMode, ResultPair};
use crate::errors::{EncBloomError, Result};
use crate::filter::EncryptedFilter;
use crate::paillier::{Ciphertext, PrivateKey, PublicKey};

use itertools::Itertools;

use num_bigint::BigUint;
use num_traits::Zero;

/// Decoded meaning of a [`ResultPair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Union: the element already belongs to the owner's set.
    Present,
    /// Union: the element is missing and must be merged in.
    Missing(BigUint),
    /// Intersection: a common member, with its value.
    Common(BigUint),
    /// Intersection: not a common member.
    NotCommon,
    /// Cardinality: counts towards the intersection size.
    Match,
    /// Cardinality: does not count.
    NoMatch,
}

impl Outcome {
    /// True when the queried element is (per the filter) in the owner's set.
    pub fn is_member(&self) -> bool {
        matches!(self, Outcome::Present | Outcome::Common(_) | Outcome::Match)
    }
}

pub struct Decryptor {
    private_key: PrivateKey,
}

impl Decryptor {
    pub fn new(private_key: PrivateKey) -> Self {
        Self { private_key }
    }

    pub fn public_key(&self) -> &PublicKey {
        self.private_key.public_key()
    }

    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint> {
        self.private_key.decrypt(c)
    }

    /// Recovers the plaintext bits of an encrypted filter: a slot decrypting to 1 is an unset bit.
    pub fn decrypt_filter(&self, filter: &EncryptedFilter) -> Result<Vec<bool>> {
        filter
            .slots()
            .iter()
            .map(|slot| {
                let complement = self.decrypt(slot)?;
                match complement.to_u32_digits().as_slice() {
                    [] => Ok(true),
                    [1] => Ok(false),
                    _ => Err(EncBloomError::InvalidCiphertext(format!(
                        "Filter slot decrypts to {}, expected 0 or 1",
                        complement
                    ))),
                }
            })
            .collect()
    }

    /// Interprets `pair` under the policy of `mode`.
    pub fn interpret(&self, mode: QueryMode, pair: &ResultPair) -> Result<Outcome> {
        match mode {
            QueryMode::Union => {
                let m0 = self.decrypt(&pair.c0)?;
                let m1 = self.decrypt(&pair.c1)?;
                match (m0.is_zero(), m1.is_zero()) {
                    (true, true) => Ok(Outcome::Present),
                    (_, false) => {
                        let ring = &self.public_key().ring;
                        Ok(Outcome::Missing(ring.mul(&m0, &ring.inv(&m1)?)))
                    }
                    (false, true) => Err(EncBloomError::InvalidCiphertext(
                        "Union pair has a zero divisor but a non-zero numerator".into(),
                    )),
                }
            }
            QueryMode::Intersection => {
                if self.decrypt(&pair.c1)?.is_zero() {
                    Ok(Outcome::Common(self.decrypt(&pair.c0)?))
                } else {
                    Ok(Outcome::NotCommon)
                }
            }
            QueryMode::Cardinality => {
                if self.decrypt(&pair.c0)?.is_zero() {
                    Ok(Outcome::Match)
                } else {
                    Ok(Outcome::NoMatch)
                }
            }
        }
    }

    /// Intersection cardinality from a batch of Cardinality-mode pairs.
    pub fn tally(&self, pairs: &[ResultPair]) -> Result<usize> {
        pairs.iter().try_fold(0usize, |count, pair| {
            Ok(count + usize::from(self.decrypt(&pair.c0)?.is_zero()))
        })
    }

    /// The distinct missing elements among a batch of Union-mode pairs, in first-seen order.
    pub fn union_additions(&self, pairs: &[ResultPair]) -> Result<Vec<BigUint>> {
        let outcomes = pairs
            .iter()
            .map(|pair| self.interpret(QueryMode::Union, pair))
            .collect::<Result<Vec<_>>>()?;

        Ok(outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Outcome::Missing(v) => Some(v),
                _ => None,
            })
            .unique()
            .collect())
    }
}
