//! # Query Engine
//!
//! Key-less side of the protocol. A [`QueryEngine`] hashes an element,
//! homomorphically sums the complement ciphertexts at the hashed slots into
//! `E(d)`, and hands the aggregate to its [`QueryMode`] to build a blinded
//! [`ResultPair`]. Every successful query is appended to an ordered log.

pub mod mode;

pub use mode::QueryMode;

use crate::entropy::{EntropySource, OsEntropy};
use crate::errors::Result;
use crate::filter::EncryptedFilter;
use crate::paillier::Ciphertext;

use serde::{Deserialize, Serialize};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Two ciphertexts whose meaning depends on the engine's mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPair {
    pub c0: Ciphertext,
    pub c1: Ciphertext,
}

pub struct QueryEngine<S: EntropySource = OsEntropy> {
    filter: Arc<EncryptedFilter>,
    mode: QueryMode,
    source: S,
    log: Mutex<Vec<ResultPair>>,
}

impl QueryEngine<OsEntropy> {
    /// Engine drawing its blinding scalars from the OS CSPRNG.
    pub fn new(filter: Arc<EncryptedFilter>, mode: QueryMode) -> Self {
        Self::with_source(filter, mode, OsEntropy)
    }
}

impl<S: EntropySource> QueryEngine<S> {
    pub fn with_source(filter: Arc<EncryptedFilter>, mode: QueryMode, source: S) -> Self {
        log::debug!(
            "query engine ready: mode={}, L={}, k={}",
            mode,
            filter.length(),
            filter.hash_count()
        );

        Self {
            filter,
            mode,
            source,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn filter(&self) -> &Arc<EncryptedFilter> {
        &self.filter
    }

    /// `E(d)` with `d = Σ (1 - bit(idx_j))` over the element's k hash indices.
    ///
    /// Deterministic and mode independent: repeated indices contribute once per occurrence.
    pub fn aggregate(&self, element: &[u8]) -> Ciphertext {
        let indices = self.filter.hash_indices(element);
        let public_key = self.filter.public_key();

        public_key.combine_all(indices.iter().filter_map(|&i| self.filter.slot(i)))
    }

    /// Runs one query and returns its result pair.
    ///
    /// On error the log is left untouched.
    pub fn query(&self, element: &[u8]) -> Result<ResultPair> {
        self.query_indexed(element).map(|(_, pair)| pair)
    }

    /// Like [`QueryEngine::query`], also returning the log position the pair landed at.
    pub fn query_indexed(&self, element: &[u8]) -> Result<(usize, ResultPair)> {
        let public_key = self.filter.public_key();
        let v = public_key.ring.from_bytes_be(element);
        let aggregate = self.aggregate(element);

        let pair = self.mode.respond(public_key, &aggregate, &v, &self.source)?;

        let mut log = self.lock_log();
        let position = log.len();
        log.push(pair.clone());
        drop(log);

        log::trace!("query #{} answered in {} mode", position, self.mode);
        Ok((position, pair))
    }

    /// Snapshot of every pair emitted so far, in log order.
    pub fn log(&self) -> Vec<ResultPair> {
        self.lock_log().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A push either happened or did not, so a poisoned log is still consistent.
    fn lock_log(&self) -> MutexGuard<'_, Vec<ResultPair>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::BloomFilter;
    use crate::decryptor::Decryptor;
    use crate::entropy::SeededEntropy;
    use crate::errors::EncBloomError;

    use num_bigint::BigUint;
    use num_traits::Zero;

    struct ExhaustedEntropy;

    impl EntropySource for ExhaustedEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<()> {
            Err(EncBloomError::Randomness("exhausted".into()))
        }
    }

    fn setup() -> (Arc<EncryptedFilter>, Decryptor) {
        let mut plain = BloomFilter::new(64, 3);
        plain.insert(&[7]);
        plain.insert(&[9, 9]);

        let source = SeededEntropy::new(1);
        let (filter, decryptor) = EncryptedFilter::build_with_source(plain, 128, &source).unwrap();
        (Arc::new(filter), decryptor)
    }

    #[test]
    fn test_aggregate_counts_unset_bits() -> Result<()> {
        let (filter, decryptor) = setup();
        let engine = QueryEngine::with_source(filter.clone(), QueryMode::Union, SeededEntropy::new(2));

        assert!(decryptor.decrypt(&engine.aggregate(&[7]))?.is_zero());

        let element = b"definitely absent";
        let expected = filter
            .hash_indices(element)
            .iter()
            .filter(|&&i| !filter.plain_filter().bit(i))
            .count();
        assert_eq!(decryptor.decrypt(&engine.aggregate(element))?, BigUint::from(expected));
        Ok(())
    }

    #[test]
    fn test_aggregate_is_mode_independent() {
        let (filter, _) = setup();
        let union = QueryEngine::with_source(filter.clone(), QueryMode::Union, SeededEntropy::new(3));
        let card = QueryEngine::with_source(filter, QueryMode::Cardinality, SeededEntropy::new(4));
        assert_eq!(union.aggregate(b"x"), card.aggregate(b"x"));
    }

    #[test]
    fn test_log_grows_in_order() -> Result<()> {
        let (filter, _) = setup();
        let engine = QueryEngine::with_source(filter, QueryMode::Cardinality, SeededEntropy::new(5));
        assert!(engine.is_empty());

        let mut emitted = Vec::new();
        let elements: [&[u8]; 4] = [&[7], b"a", b"b", &[9, 9]];
        for element in elements {
            let (position, pair) = engine.query_indexed(element)?;
            assert_eq!(position, emitted.len());
            emitted.push(pair);
        }

        assert_eq!(engine.len(), 4);
        assert_eq!(engine.log(), emitted);
        Ok(())
    }

    #[test]
    fn test_failed_query_leaves_log_untouched() {
        let (filter, _) = setup();
        for mode in QueryMode::ALL {
            let engine = QueryEngine::with_source(filter.clone(), mode, ExhaustedEntropy);
            assert!(matches!(engine.query(&[7]), Err(EncBloomError::Randomness(_))));
            assert!(engine.is_empty());
        }
    }

    #[test]
    fn test_seeded_engines_replay() -> Result<()> {
        let (filter, _) = setup();
        let a = QueryEngine::with_source(filter.clone(), QueryMode::Intersection, SeededEntropy::new(6));
        let b = QueryEngine::with_source(filter, QueryMode::Intersection, SeededEntropy::new(6));
        assert_eq!(a.query(b"replay")?, b.query(b"replay")?);
        Ok(())
    }
}
