//! Probable-prime generation for Paillier moduli.

use crate::entropy::{EntropySource, random_below, random_bits};
use crate::errors::{EncBloomError, Result};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Miller-Rabin rounds; the error bound is 4^-40.
pub const MILLER_RABIN_ROUNDS: usize = 40;

const SMALL_PRIMES: [u32; 46] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199,
];

/// Draws a random `bits`-wide probable prime with its two top bits set,
/// so that the product of two such primes has exactly `2 * bits` bits.
pub fn generate_prime(bits: u64, source: &dyn EntropySource) -> Result<BigUint> {
    if bits < 16 {
        return Err(EncBloomError::KeyGeneration(format!(
            "Prime width must be at least 16 bits, got {}",
            bits
        )));
    }

    let max_attempts = 100 * bits;
    let top_bits = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2));

    for _ in 0..max_attempts {
        let candidate = random_bits(source, bits)? | &top_bits | BigUint::one();
        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, source)? {
            return Ok(candidate);
        }
    }

    Err(EncBloomError::KeyGeneration(format!(
        "No {}-bit prime found after {} attempts",
        bits, max_attempts
    )))
}

/// Trial division by small primes followed by `rounds` Miller-Rabin rounds with random bases.
pub fn is_probable_prime(n: &BigUint, rounds: usize, source: &dyn EntropySource) -> Result<bool> {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return Ok(false);
        }
        if SMALL_PRIMES.contains(&small) {
            return Ok(true);
        }
    }

    for &p in SMALL_PRIMES.iter() {
        if (n % p).is_zero() {
            return Ok(false);
        }
    }

    // n - 1 = d * 2^s with d odd
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    // bases are drawn from [2, n - 2]
    let base_range = n - 3u32;

    'witness: for _ in 0..rounds {
        let a = random_below(source, &base_range)? + &two;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x == one {
                return Ok(false);
            }
        }

        return Ok(false);
    }

    Ok(true)
}

/// True when `p` and `q` are usable Paillier factors: distinct and with
/// `gcd(pq, (p - 1)(q - 1)) == 1`.
pub fn are_valid_factors(p: &BigUint, q: &BigUint) -> bool {
    if p == q {
        return false;
    }
    let one = BigUint::one();
    let n = p * q;
    let phi = (p - &one) * (q - &one);
    n.gcd(&phi).is_one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::SeededEntropy;

    #[test]
    fn test_small_numbers() -> Result<()> {
        let source = SeededEntropy::new(1);
        let primes = [2u32, 3, 5, 13, 199, 211, 7919, 104_729];
        let composites = [0u32, 1, 4, 9, 221, 561, 7917, 104_730];

        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), 20, &source)?, "{} is prime", p);
        }
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 20, &source)?, "{} is composite", c);
        }
        Ok(())
    }

    #[test]
    fn test_mersenne_prime() -> Result<()> {
        let source = SeededEntropy::new(2);
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m127, 20, &source)?);
        assert!(!is_probable_prime(&((BigUint::one() << 128u32) - 1u32), 20, &source)?);
        Ok(())
    }

    #[test]
    fn test_generated_prime_width() -> Result<()> {
        let source = SeededEntropy::new(5);
        for bits in [32u64, 64, 128] {
            let p = generate_prime(bits, &source)?;
            assert_eq!(p.bits(), bits);
            assert!(p.bit(bits - 2));
            assert!(is_probable_prime(&p, 20, &source)?);
        }
        Ok(())
    }

    #[test]
    fn test_too_narrow_prime_is_rejected() {
        let source = SeededEntropy::new(5);
        assert!(matches!(
            generate_prime(8, &source),
            Err(EncBloomError::KeyGeneration(_))
        ));
    }

    #[test]
    fn test_valid_factors() {
        let p = BigUint::from(11u32);
        let q = BigUint::from(13u32);
        assert!(are_valid_factors(&p, &q));
        assert!(!are_valid_factors(&p, &p));
        // 3 divides 7 - 1, so gcd(21, 12) = 3
        assert!(!are_valid_factors(&BigUint::from(3u32), &BigUint::from(7u32)));
    }
}
