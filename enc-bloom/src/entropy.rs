//! Secure randomness as an injected capability.
//!
//! Every random draw in the crate (prime search, encryption nonces, blinding
//! scalars) goes through an [`EntropySource`], so tests can swap the OS source
//! for a seeded one without touching the protocol code.

use crate::errors::{EncBloomError, Result};
use crate::ring::Ring;

use num_bigint::BigUint;
use num_traits::Zero;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};

use std::sync::Mutex;

/// A source of uniformly random bytes.
///
/// Implementations must be cryptographically secure in production and must
/// report exhaustion as [`EncBloomError::Randomness`] instead of degrading.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EncBloomError::Randomness(format!("OS entropy unavailable: {}", e)))
    }
}

/// A ChaCha-based generator seeded from a `u64`, for reproducible runs.
#[derive(Debug)]
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EncBloomError::Randomness("seeded generator lock poisoned".into()))?;
        rng.fill_bytes(dest);
        Ok(())
    }
}

/// Uniform integer in `[0, 2^bits)`.
pub fn random_bits(source: &dyn EntropySource, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Ok(BigUint::zero());
    }

    let nbytes = bits.div_ceil(8) as usize;
    let mut bytes = vec![0u8; nbytes];
    source.fill(&mut bytes)?;

    // mask so the value is < 2^bits
    let excess = 8 * nbytes as u64 - bits;
    if excess > 0 {
        bytes[0] &= 0xFFu8 >> excess;
    }

    Ok(BigUint::from_bytes_be(&bytes))
}

/// Uniform integer in `[0, bound)` by rejection sampling.
pub fn random_below(source: &dyn EntropySource, bound: &BigUint) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(EncBloomError::InvalidParameters(
            "Sampling bound must be positive".into(),
        ));
    }

    let bits = bound.bits();
    loop {
        let candidate = random_bits(source, bits)?;
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

fn try_unit(ring: &Ring, candidate: BigUint) -> Result<BigUint> {
    if ring.is_unit(&candidate) {
        Ok(candidate)
    } else {
        Err(EncBloomError::NonInvertibleScalar)
    }
}

/// Uniform element of the unit group of Z_N.
///
/// Non-invertible draws are discarded and resampled; only a failing entropy
/// source ends the loop with an error.
pub fn sample_unit(source: &dyn EntropySource, ring: &Ring) -> Result<BigUint> {
    loop {
        let candidate = random_below(source, ring.modulus())?;
        match try_unit(ring, candidate) {
            Ok(unit) => return Ok(unit),
            Err(EncBloomError::NonInvertibleScalar) => {
                log::trace!("discarding non-invertible draw");
                continue;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bits_respects_width() -> Result<()> {
        let source = SeededEntropy::new(7);
        for bits in [1u64, 7, 8, 9, 63, 130] {
            for _ in 0..50 {
                assert!(random_bits(&source, bits)?.bits() <= bits);
            }
        }
        Ok(())
    }

    #[test]
    fn test_random_below_bound() -> Result<()> {
        let source = SeededEntropy::new(11);
        let bound = BigUint::from(1000u32);
        for _ in 0..200 {
            assert!(random_below(&source, &bound)? < bound);
        }
        assert!(random_below(&source, &BigUint::zero()).is_err());
        Ok(())
    }

    #[test]
    fn test_sample_unit_is_invertible() -> Result<()> {
        // 2 * 3 * 5 * 7: most residues share a factor with N, so retries are exercised
        let ring = Ring::try_with(BigUint::from(210u32))?;
        let source = SeededEntropy::new(3);
        for _ in 0..100 {
            let unit = sample_unit(&source, &ring)?;
            assert!(ring.is_unit(&unit));
        }
        Ok(())
    }

    #[test]
    fn test_seeded_entropy_is_reproducible() -> Result<()> {
        let (a, b) = (SeededEntropy::new(42), SeededEntropy::new(42));
        let (mut x, mut y) = ([0u8; 32], [0u8; 32]);
        a.fill(&mut x)?;
        b.fill(&mut y)?;
        assert_eq!(x, y);
        Ok(())
    }

    #[test]
    fn test_os_entropy_fills() -> Result<()> {
        let mut buf = [0u8; 64];
        OsEntropy.fill(&mut buf)?;
        assert!(buf.iter().any(|&b| b != 0));
        Ok(())
    }
}
