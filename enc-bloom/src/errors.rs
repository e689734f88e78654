#[derive(thiserror::Error, Debug)]
pub enum EncBloomError {
    /// The cryptosystem could not produce a keypair at the requested modulus size.
    #[error("KeyGeneration: {0}")]
    KeyGeneration(String),
    /// Zero-length filter or zero hash count handed to the builder.
    #[error("Dimension: {0}")]
    Dimension(String),
    /// The secure entropy source failed while sampling.
    #[error("Randomness: {0}")]
    Randomness(String),
    /// A sampled blinding scalar shares a factor with N.
    /// Only produced inside the sampling loop, which resamples on it.
    #[error("Sampled scalar is not a unit of Z_N")]
    NonInvertibleScalar,
    /// Error when trying to find a modular inverse that doesn't exist (gcd(a, N) != 1).
    #[error("NoInverse: {0}")]
    NoInverse(String),
    /// Error when creating a ring with an invalid modulus (N <= 1).
    #[error("InvalidModulus: {0}")]
    InvalidModulus(String),
    #[error("InvalidCiphertext: {0}")]
    InvalidCiphertext(String),

    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, EncBloomError>;
