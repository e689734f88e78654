//! Encrypted complement filter.

use crate::bloom::BloomFilter;
use crate::decryptor::Decryptor;
use crate::entropy::{EntropySource, OsEntropy};
use crate::errors::{EncBloomError, Result};
use crate::paillier::{Ciphertext, PrivateKey, PublicKey};

use num_bigint::BigUint;

/// A Bloom filter whose slot `i` holds `E(1 - bit(i))`.
///
/// The plaintext filter is moved in and only ever lent out by shared
/// reference, so the complement relationship holds for the structure's lifetime.
#[derive(Debug, Clone)]
pub struct EncryptedFilter {
    filter: BloomFilter,
    public_key: PublicKey,
    slots: Vec<Ciphertext>,
}

impl EncryptedFilter {
    /// Generates a `key_size`-bit keypair and encrypts `filter` under it.
    ///
    /// The private half comes back wrapped in a [`Decryptor`] for the filter owner.
    pub fn build(filter: BloomFilter, key_size: u64) -> Result<(Self, Decryptor)> {
        Self::build_with_source(filter, key_size, &OsEntropy)
    }

    pub fn build_with_source(
        filter: BloomFilter,
        key_size: u64,
        source: &dyn EntropySource,
    ) -> Result<(Self, Decryptor)> {
        check_dimensions(&filter)?;

        let private_key = PrivateKey::try_with(key_size, source)?;
        let encrypted = Self::with_public_key(filter, private_key.public_key(), source)?;

        Ok((encrypted, Decryptor::new(private_key)))
    }

    /// Encrypts `filter` under a caller-supplied public key.
    pub fn with_public_key(
        filter: BloomFilter,
        public_key: &PublicKey,
        source: &dyn EntropySource,
    ) -> Result<Self> {
        check_dimensions(&filter)?;

        let slots = (0..filter.length())
            .map(|i| {
                let complement = BigUint::from(u8::from(!filter.bit(i)));
                public_key.encrypt(&complement, source)
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "encrypted filter built: L={}, k={}, {} bits set, {}-bit modulus",
            filter.length(),
            filter.hash_count(),
            filter.count_ones(),
            public_key.key_size()
        );

        Ok(Self {
            filter,
            public_key: public_key.clone(),
            slots,
        })
    }

    pub fn length(&self) -> usize {
        self.filter.length()
    }

    pub fn hash_count(&self) -> usize {
        self.filter.hash_count()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The source filter, for hashing and diagnostics.
    pub fn plain_filter(&self) -> &BloomFilter {
        &self.filter
    }

    pub fn slot(&self, index: usize) -> Option<&Ciphertext> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[Ciphertext] {
        &self.slots
    }

    pub fn hash_indices(&self, element: &[u8]) -> Vec<usize> {
        self.filter.hash_indices(element)
    }
}

fn check_dimensions(filter: &BloomFilter) -> Result<()> {
    if filter.length() == 0 {
        return Err(EncBloomError::Dimension(
            "Filter length must be positive".into(),
        ));
    }
    if filter.hash_count() == 0 {
        return Err(EncBloomError::Dimension(
            "Hash count must be positive".into(),
        ));
    }
    Ok(())
}
