//! Configuration surface: modulus size and query mode.

use crate::bloom::BloomFilter;
use crate::decryptor::Decryptor;
use crate::engine::{QueryEngine, QueryMode};
use crate::entropy::OsEntropy;
use crate::errors::{EncBloomError, Result};
use crate::filter::EncryptedFilter;
use crate::paillier::keys::MIN_KEY_SIZE;

use serde::{Deserialize, Serialize};

use std::sync::Arc;

pub const DEFAULT_KEY_SIZE: u64 = 512;

/// Parameters shared by both protocol parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncBloomParams {
    /// Bit length of the Paillier modulus N.
    pub key_size: u64,
    /// Response policy of every engine built from these parameters.
    pub mode: QueryMode,
}

impl Default for EncBloomParams {
    fn default() -> Self {
        Self {
            key_size: DEFAULT_KEY_SIZE,
            mode: QueryMode::Union,
        }
    }
}

impl EncBloomParams {
    pub fn try_with(key_size: u64, mode: QueryMode) -> Result<Self> {
        if key_size < MIN_KEY_SIZE {
            return Err(EncBloomError::InvalidParameters(format!(
                "Key size must be at least {} bits, got {}",
                MIN_KEY_SIZE, key_size
            )));
        }

        if key_size % 2 != 0 {
            return Err(EncBloomError::InvalidParameters(format!(
                "Key size must be even, got {}",
                key_size
            )));
        }

        Ok(Self { key_size, mode })
    }

    /// Same as [`EncBloomParams::try_with`] with the mode given by name.
    pub fn parse(key_size: u64, mode: &str) -> Result<Self> {
        Self::try_with(key_size, mode.parse()?)
    }

    /// Encrypts `filter` and wires up both roles: the key-less engine for the
    /// querier and the decryptor for the filter owner.
    pub fn setup(&self, filter: BloomFilter) -> Result<(QueryEngine<OsEntropy>, Decryptor)> {
        let (encrypted, decryptor) = EncryptedFilter::build(filter, self.key_size)?;
        Ok((QueryEngine::new(Arc::new(encrypted), self.mode), decryptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = EncBloomParams::default();
        assert_eq!(params.key_size, 512);
        assert_eq!(params.mode, QueryMode::Union);
    }

    #[test]
    fn test_validation() {
        assert!(EncBloomParams::try_with(256, QueryMode::Cardinality).is_ok());
        assert!(EncBloomParams::try_with(32, QueryMode::Union).is_err());
        assert!(EncBloomParams::try_with(257, QueryMode::Union).is_err());
        assert!(EncBloomParams::parse(256, "cardinality").is_ok());
        assert!(EncBloomParams::parse(256, "xor").is_err());
    }

    #[test]
    fn test_setup_wires_both_roles() -> Result<()> {
        let mut plain = BloomFilter::new(32, 2);
        plain.insert(b"shared");

        let params = EncBloomParams::try_with(128, QueryMode::Intersection)?;
        let (engine, decryptor) = params.setup(plain)?;
        assert_eq!(engine.mode(), QueryMode::Intersection);
        assert_eq!(engine.filter().public_key(), decryptor.public_key());

        let pair = engine.query(b"shared")?;
        assert!(decryptor.interpret(params.mode, &pair)?.is_member());
        Ok(())
    }
}
