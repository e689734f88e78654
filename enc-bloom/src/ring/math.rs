//! Implementation of ring ops over Z_N using big-integer modular arithmetic.

use crate::errors::{EncBloomError, Result};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use serde::{Deserialize, Serialize};

/// Represents the finite ring Z_N, the plaintext space of the cryptosystem.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub modulus: BigUint,
}

impl Ring {
    /// Create a new Ring with the given modulus.
    ///
    /// The modulus must be greater than 1.
    pub fn try_with(modulus: BigUint) -> Result<Self> {
        if modulus <= BigUint::one() {
            return Err(EncBloomError::InvalidModulus(format!(
                "Modulus must be greater than 1, got {}",
                modulus
            )));
        }

        Ok(Ring { modulus })
    }

    /// Returns the modulus of the ring.
    ///
    /// # Example
    ///
    /// ```
    /// # use enc_bloom::ring::Ring;
    /// # use num_bigint::BigUint;
    /// let ring = Ring::try_with(BigUint::from(13u32)).unwrap();
    /// assert_eq!(ring.modulus(), &BigUint::from(13u32));
    /// ```
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Normalizes a value to be within the range `[0, modulus - 1]`.
    ///
    /// # Example
    ///
    /// ```
    /// # use enc_bloom::ring::Ring;
    /// # use num_bigint::BigUint;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// assert_eq!(ring.normalize(&BigUint::from(15u32)), BigUint::from(5u32));
    /// assert_eq!(ring.normalize(&BigUint::from(10u32)), BigUint::from(0u32));
    /// ```
    pub fn normalize(&self, value: &BigUint) -> BigUint {
        value % &self.modulus
    }

    /// Reads a big-endian byte string as an unsigned integer and reduces it mod N.
    ///
    /// The empty string maps to zero.
    pub fn from_bytes_be(&self, bytes: &[u8]) -> BigUint {
        self.normalize(&BigUint::from_bytes_be(bytes))
    }

    /// Computes `(a * b) mod modulus`.
    ///
    /// # Example
    ///
    /// ```
    /// # use enc_bloom::ring::Ring;
    /// # use num_bigint::BigUint;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// assert_eq!(ring.mul(&BigUint::from(7u32), &BigUint::from(5u32)), BigUint::from(5u32));
    /// assert_eq!(ring.mul(&BigUint::from(4u32), &BigUint::from(5u32)), BigUint::from(0u32));
    /// ```
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    /// Returns true when `a` is a unit of the ring, i.e. non-zero and `gcd(a, modulus) == 1`.
    pub fn is_unit(&self, a: &BigUint) -> bool {
        let a_norm = self.normalize(a);
        !a_norm.is_zero() && a_norm.gcd(&self.modulus).is_one()
    }

    /// Computes the modular multiplicative inverse `a^-1 mod modulus`.
    ///
    /// The inverse exists if and only if `gcd(a, modulus) == 1`.
    ///
    /// # Errors
    ///
    /// Returns `EncBloomError::NoInverse` if the inverse does not exist or if `a` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// # use enc_bloom::ring::Ring;
    /// # use num_bigint::BigUint;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// assert_eq!(ring.inv(&BigUint::from(3u32)).unwrap(), BigUint::from(7u32));
    /// assert!(ring.inv(&BigUint::from(2u32)).is_err());
    /// assert!(ring.inv(&BigUint::from(0u32)).is_err());
    /// ```
    pub fn inv(&self, a: &BigUint) -> Result<BigUint> {
        let a_norm = self.normalize(a);
        if a_norm.is_zero() {
            return Err(EncBloomError::NoInverse(format!(
                "Cannot invert 0 in mod {}",
                self.modulus
            )));
        }

        a_norm.modinv(&self.modulus).ok_or_else(|| {
            EncBloomError::NoInverse(format!(
                "Modular inverse does not exist for {} mod {} (gcd={})",
                a_norm,
                self.modulus,
                a_norm.gcd(&self.modulus)
            ))
        })
    }
}
