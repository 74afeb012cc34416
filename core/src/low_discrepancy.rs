//! Low Discrepancy Sequences

use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Number of prime bases available for radical inverses.
pub const PRIME_TABLE_SIZE: usize = 1000;

lazy_static! {
    /// The first `PRIME_TABLE_SIZE` primes.
    pub static ref PRIMES: Vec<u64> = first_primes(PRIME_TABLE_SIZE);
}

/// Returns the first `n` primes using a sieve sized by the prime number
/// theorem bound.
///
/// * `n` - Number of primes.
fn first_primes(n: usize) -> Vec<u64> {
    let nf = n.max(6) as f64;
    let limit = (nf * (nf.ln() + nf.ln().ln())).ceil() as usize + 1;
    let mut composite = vec![false; limit + 1];
    let mut primes = Vec::with_capacity(n);
    for i in 2..=limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u64);
        if primes.len() == n {
            break;
        }
        let mut j = i * i;
        while j <= limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

/// Reflects the base-b digits of `a` about the radix point.
///
/// * `base_index` - Index into `PRIMES` selecting the base.
/// * `a`          - The value.
pub fn radical_inverse(base_index: usize, a: u64) -> Float {
    let base = PRIMES[base_index];
    let inv_base = 1.0 / base as f64;
    let mut reversed: u64 = 0;
    let mut inv_base_n = 1.0;
    let mut a = a;
    while a > 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed = reversed * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    ((reversed as f64 * inv_base_n) as Float).min(ONE_MINUS_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn prime_table() {
        assert_eq!(PRIMES.len(), PRIME_TABLE_SIZE);
        assert_eq!(&PRIMES[..6], &[2, 3, 5, 7, 11, 13]);
        assert_eq!(PRIMES[PRIME_TABLE_SIZE - 1], 7919);
    }

    #[test]
    fn van_der_corput_base_two() {
        assert_eq!(radical_inverse(0, 0), 0.0);
        assert!(approx_eq!(Float, radical_inverse(0, 1), 0.5));
        assert!(approx_eq!(Float, radical_inverse(0, 2), 0.25));
        assert!(approx_eq!(Float, radical_inverse(0, 3), 0.75));
        assert!(approx_eq!(Float, radical_inverse(1, 1), 1.0 / 3.0));
        assert!(approx_eq!(Float, radical_inverse(1, 5), 7.0 / 9.0));
    }
}
