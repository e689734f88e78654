//! Response construction per query mode.
//!
//! Each mode turns the aggregate `E(d)`, the element value `v` and fresh
//! blinding scalars into a [`ResultPair`] using only public-key operations.
//! Union shares one scalar between both components so the key holder can
//! divide them; Intersection draws two independent scalars so no ratio leaks `d`.

use crate::engine::ResultPair;
use crate::entropy::{EntropySource, sample_unit};
use crate::errors::{EncBloomError, Result};
use crate::paillier::{Ciphertext, PublicKey};

use num_bigint::BigUint;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// `(E(d·v·b), E(d·b))`: recovers a missing element for a set union.
    Union,
    /// `(E(v + d·b1), E(d·b2))`: reveals `v` only for common members.
    Intersection,
    /// `(E(d·b), E(d·b))`: zero iff common member, for cardinality tallies.
    Cardinality,
}

impl QueryMode {
    pub const ALL: [QueryMode; 3] = [
        QueryMode::Union,
        QueryMode::Intersection,
        QueryMode::Cardinality,
    ];

    /// Number of independent blinding scalars drawn per query.
    pub fn blind_count(&self) -> usize {
        match self {
            QueryMode::Union | QueryMode::Cardinality => 1,
            QueryMode::Intersection => 2,
        }
    }

    /// Builds this mode's result pair from the aggregate `E(d)` and element value `v`.
    pub fn respond(
        &self,
        public_key: &PublicKey,
        aggregate: &Ciphertext,
        v: &BigUint,
        source: &dyn EntropySource,
    ) -> Result<ResultPair> {
        let blinds = (0..self.blind_count())
            .map(|_| sample_unit(source, &public_key.ring))
            .collect::<Result<Vec<_>>>()?;

        match self {
            QueryMode::Union => union_response(public_key, aggregate, v, &blinds[0]),
            QueryMode::Intersection => {
                intersection_response(public_key, aggregate, v, (&blinds[0], &blinds[1]), source)
            }
            QueryMode::Cardinality => cardinality_response(public_key, aggregate, &blinds[0]),
        }
    }
}

fn union_response(
    pk: &PublicKey,
    aggregate: &Ciphertext,
    v: &BigUint,
    b: &BigUint,
) -> Result<ResultPair> {
    let vb = pk.ring.mul(v, b);

    Ok(ResultPair {
        c0: pk.scale(aggregate, &vb),
        c1: pk.scale(aggregate, b),
    })
}

fn intersection_response(
    pk: &PublicKey,
    aggregate: &Ciphertext,
    v: &BigUint,
    (b1, b2): (&BigUint, &BigUint),
    source: &dyn EntropySource,
) -> Result<ResultPair> {
    let encrypted_v = pk.encrypt(v, source)?;

    Ok(ResultPair {
        c0: pk.combine(&encrypted_v, &pk.scale(aggregate, b1)),
        c1: pk.scale(aggregate, b2),
    })
}

fn cardinality_response(
    pk: &PublicKey,
    aggregate: &Ciphertext,
    b: &BigUint,
) -> Result<ResultPair> {
    let c0 = pk.scale(aggregate, b);

    Ok(ResultPair { c1: c0.clone(), c0 })
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryMode::Union => "union",
            QueryMode::Intersection => "intersection",
            QueryMode::Cardinality => "cardinality",
        };
        f.write_str(name)
    }
}

impl FromStr for QueryMode {
    type Err = EncBloomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "union" => Ok(QueryMode::Union),
            "intersection" => Ok(QueryMode::Intersection),
            "cardinality" => Ok(QueryMode::Cardinality),
            other => Err(EncBloomError::InvalidParameters(format!(
                "Unknown query mode '{}'",
                other
            ))),
        }
    }
}
