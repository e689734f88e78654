use crate::entropy::{EntropySource, sample_unit};
use crate::errors::{EncBloomError, Result};
use crate::paillier::Ciphertext;
use crate::paillier::primes::{are_valid_factors, generate_prime};
use crate::ring::{Ring, lcm};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use serde::{Deserialize, Serialize};

/// Smallest accepted modulus width.
pub const MIN_KEY_SIZE: u64 = 64;

const MAX_FACTOR_ATTEMPTS: usize = 64;

/// Paillier public key with generator `g = N + 1`.
///
/// Everything a querier needs: encryption, ciphertext composition and scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// Plaintext space Z_N.
    pub ring: Ring,
    /// Cached N^2, the ciphertext modulus.
    pub n_squared: BigUint,
}

/// Paillier decryption trapdoor.
///
/// Deliberately neither `Debug` nor `Serialize`: it never leaves the key holder.
#[derive(Clone)]
pub struct PrivateKey {
    public_key: PublicKey,
    /// lambda = lcm(p - 1, q - 1)
    lambda: BigUint,
    /// mu = lambda^-1 mod N
    mu: BigUint,
}

impl PublicKey {
    pub fn try_with(n: BigUint) -> Result<Self> {
        let n_squared = &n * &n;
        Ok(Self {
            ring: Ring::try_with(n)?,
            n_squared,
        })
    }

    /// The modulus N.
    pub fn n(&self) -> &BigUint {
        self.ring.modulus()
    }

    /// Bit length of N.
    pub fn key_size(&self) -> u64 {
        self.n().bits()
    }

    /// Encrypts `m mod N` as `(1 + mN) * r^N mod N^2` with a fresh unit `r`.
    pub fn encrypt(&self, m: &BigUint, source: &dyn EntropySource) -> Result<Ciphertext> {
        let r = sample_unit(source, &self.ring)?;
        let m = self.ring.normalize(m);

        // g^m = (1 + N)^m = 1 + mN (mod N^2)
        let g_m = (BigUint::one() + &m * self.n()) % &self.n_squared;
        let r_n = r.modpow(self.n(), &self.n_squared);

        Ok(Ciphertext((g_m * r_n) % &self.n_squared))
    }

    /// Homomorphic addition: decrypts to the sum of both plaintexts mod N.
    pub fn combine(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        Ciphertext((&a.0 * &b.0) % &self.n_squared)
    }

    /// Homomorphic sum of any number of ciphertexts.
    ///
    /// The empty sum is the trivial (unrandomized) encryption of zero.
    pub fn combine_all<'a, I>(&self, ciphertexts: I) -> Ciphertext
    where
        I: IntoIterator<Item = &'a Ciphertext>,
    {
        ciphertexts
            .into_iter()
            .fold(Ciphertext(BigUint::one()), |acc, c| self.combine(&acc, c))
    }

    /// Homomorphic multiplication by a public scalar: decrypts to `s * m mod N`.
    pub fn scale(&self, c: &Ciphertext, s: &BigUint) -> Ciphertext {
        Ciphertext(c.0.modpow(s, &self.n_squared))
    }

    /// A ciphertext is well formed when it is a unit of Z_{N^2}.
    pub fn validate(&self, c: &Ciphertext) -> Result<()> {
        if c.0.is_zero() || c.0 >= self.n_squared {
            return Err(EncBloomError::InvalidCiphertext(
                "Ciphertext is outside [1, N^2)".into(),
            ));
        }
        if !c.0.gcd(self.n()).is_one() {
            return Err(EncBloomError::InvalidCiphertext(
                "Ciphertext shares a factor with N".into(),
            ));
        }
        Ok(())
    }
}

impl PrivateKey {
    /// Generates a fresh keypair whose modulus has exactly `key_size` bits.
    ///
    /// # Errors
    /// `KeyGeneration` if `key_size` is odd or below [`MIN_KEY_SIZE`], or if the
    /// prime search fails (including entropy failures during the search).
    pub fn try_with(key_size: u64, source: &dyn EntropySource) -> Result<Self> {
        if key_size < MIN_KEY_SIZE || key_size % 2 != 0 {
            return Err(EncBloomError::KeyGeneration(format!(
                "Modulus size must be even and at least {} bits, got {}",
                MIN_KEY_SIZE, key_size
            )));
        }

        let half = key_size / 2;
        for _ in 0..MAX_FACTOR_ATTEMPTS {
            let p = generate_prime(half, source).map_err(into_keygen)?;
            let q = generate_prime(half, source).map_err(into_keygen)?;
            if !are_valid_factors(&p, &q) {
                continue;
            }

            let key = Self::from_factors(&p, &q).map_err(into_keygen)?;
            log::debug!("generated {}-bit Paillier modulus", key.public_key.key_size());
            return Ok(key);
        }

        Err(EncBloomError::KeyGeneration(format!(
            "Could not find valid factors after {} attempts",
            MAX_FACTOR_ATTEMPTS
        )))
    }

    /// Builds the key from two known primes.
    pub fn from_factors(p: &BigUint, q: &BigUint) -> Result<Self> {
        if !are_valid_factors(p, q) {
            return Err(EncBloomError::KeyGeneration(
                "Factors must be distinct with gcd(pq, (p-1)(q-1)) = 1".into(),
            ));
        }

        let one = BigUint::one();
        let public_key = PublicKey::try_with(p * q)?;
        let lambda = lcm(&(p - &one), &(q - &one));
        let mu = public_key.ring.inv(&lambda)?;

        Ok(Self {
            public_key,
            lambda,
            mu,
        })
    }

    pub fn get_public_key(&self) -> PublicKey {
        self.public_key.clone()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// `m = L(c^lambda mod N^2) * mu mod N` where `L(x) = (x - 1) / N`.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint> {
        let pk = &self.public_key;
        pk.validate(c)?;

        let u = c.0.modpow(&self.lambda, &pk.n_squared);
        let l = (u - BigUint::one()) / pk.n();

        Ok(pk.ring.mul(&l, &self.mu))
    }
}

/// `generateKeypair(bits)`: both halves at once.
pub fn generate_keypair(
    key_size: u64,
    source: &dyn EntropySource,
) -> Result<(PublicKey, PrivateKey)> {
    let private_key = PrivateKey::try_with(key_size, source)?;
    Ok((private_key.get_public_key(), private_key))
}

fn into_keygen(e: EncBloomError) -> EncBloomError {
    match e {
        EncBloomError::KeyGeneration(_) => e,
        other => EncBloomError::KeyGeneration(other.to_string()),
    }
}
