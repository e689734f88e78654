use num_bigint::BigUint;
use num_integer::Integer;

/// Least common multiple of two unsigned integers.
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    a.lcm(b)
}
