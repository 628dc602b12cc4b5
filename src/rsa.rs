//! RSA-style permutation used by the `secure` algorithm to obfuscate port
//! allocation order.

use crate::arith;
use crate::error::CrunchNatError;

/// Default `(p, q, e)` triple used when the `secure` algorithm is selected
/// without explicit keys: `n = 251 * 257 = 64507`.
pub const DEFAULT_P: u32 = 251;
pub const DEFAULT_Q: u32 = 257;
pub const DEFAULT_E: u32 = 19;

/// The largest `n = p * q` this core will accept: the usable port space
/// (`PORTS_PER_IP - RESERVED_PORTS`).
pub const MAX_N: u32 = 64512;

/// An immutable bijection on `[0, n)` built from small primes `p`, `q` and
/// exponent `e`.
///
/// `encrypt` and `decrypt` are mutual inverses on the full range `[0, n)`:
/// callers must never invoke either with an input outside that range (see
/// `SPEC_FULL.md` §9, Open Question (c)).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsaPermutation {
    n: u32,
    e: u32,
    d: u32,
}

impl RsaPermutation {
    /// Build a permutation from `p`, `q`, `e`.
    ///
    /// Fails with [`CrunchNatError::InvalidKeys`] if `p * q` exceeds
    /// [`MAX_N`], or if `e` has no inverse modulo `(p - 1) * (q - 1)`.
    pub fn new(p: u32, q: u32, e: u32) -> Result<Self, CrunchNatError> {
        let n = p.checked_mul(q).ok_or(CrunchNatError::InvalidKeys {
            reason: "p * q overflowed",
        })?;
        if n > MAX_N {
            return Err(CrunchNatError::InvalidKeys {
                reason: "p * q exceeds usable port space",
            });
        }
        let phi = (p - 1) * (q - 1);
        let d = arith::mod_inverse(e, phi).ok_or(CrunchNatError::InvalidKeys {
            reason: "e has no inverse modulo (p-1)*(q-1)",
        })?;
        Ok(Self { n, e, d })
    }

    /// Build the default permutation: `(p, q, e) = (251, 257, 19)`.
    pub fn default_keys() -> Self {
        Self::new(DEFAULT_P, DEFAULT_Q, DEFAULT_E).expect("default RSA keys are always valid")
    }

    /// The size of the domain/range, `n = p * q`.
    pub const fn n(&self) -> u32 {
        self.n
    }

    /// Map `x` to `x^e mod n`.
    ///
    /// # Panics
    ///
    /// Panics (debug builds) if `x >= n()`; see the type-level invariant.
    pub fn encrypt(&self, x: u32) -> u32 {
        debug_assert!(x < self.n, "encrypt called outside [0, n)");
        arith::mod_pow(x, self.e, self.n)
    }

    /// Map `y` to `y^d mod n`, the inverse of [`Self::encrypt`].
    pub fn decrypt(&self, y: u32) -> u32 {
        debug_assert!(y < self.n, "decrypt called outside [0, n)");
        arith::mod_pow(y, self.d, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_round_trip_over_full_domain() {
        let rsa = RsaPermutation::default_keys();
        assert_eq!(rsa.n(), 64507);
        for x in 0..rsa.n() {
            assert_eq!(rsa.decrypt(rsa.encrypt(x)), x);
        }
    }

    #[test]
    fn encrypt_is_a_permutation() {
        let rsa = RsaPermutation::default_keys();
        let mut seen = std::collections::HashSet::new();
        for x in 0..rsa.n() {
            assert!(seen.insert(rsa.encrypt(x)), "encrypt produced a duplicate");
        }
    }

    #[test]
    fn rejects_oversized_product() {
        assert!(matches!(
            RsaPermutation::new(300, 300, 19),
            Err(CrunchNatError::InvalidKeys { .. })
        ));
    }

    #[test]
    fn rejects_non_invertible_exponent() {
        // e=2 shares a factor with phi=(3-1)*(5-1)=8.
        assert!(matches!(
            RsaPermutation::new(3, 5, 2),
            Err(CrunchNatError::InvalidKeys { .. })
        ));
    }
}
