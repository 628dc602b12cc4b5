//! Modular arithmetic primitives underlying [`crate::rsa::RsaPermutation`].
//!
//! All operations here work on non-negative integers and all divisions are
//! floor division, matching the numeric semantics required throughout the
//! core (`SPEC_FULL.md` §4.1).

/// Extended Euclidean algorithm: returns `(g, x, y)` such that
/// `a*x + b*y == g == gcd(a, b)`.
///
/// Implemented iteratively (not the textbook recursive formulation) per the
/// Design Notes: the recursion depth for arbitrary inputs is unbounded,
/// while an iterative implementation is bounded by `O(log(min(a, b)))`
/// stack-free steps.
///
/// # Panics
///
/// Panics if `a == 0 && b == 0`, for which no gcd is defined.
pub fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    assert!(a != 0 || b != 0, "extended_gcd is undefined for (0, 0)");

    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i64, 0i64);
    let (mut old_t, mut t) = (0i64, 1i64);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
        (old_t, t) = (t, old_t - quotient * t);
    }

    (old_r, old_s, old_t)
}

/// Compute `a^-1 mod m`, returning a value in `[0, m)`.
///
/// Fails if `gcd(a, m) != 1`, in which case no inverse exists.
pub fn mod_inverse(a: u32, m: u32) -> Option<u32> {
    let (g, x, _) = extended_gcd(i64::from(a), i64::from(m));
    if g != 1 {
        return None;
    }
    let m = i64::from(m);
    Some(((x % m + m) % m) as u32)
}

/// Compute `base^exp mod modulus` by repeated squaring.
///
/// `modulus` is bounded to `2^20` by the rest of this core, so 64-bit
/// intermediate products never overflow.
pub fn mod_pow(base: u32, exp: u32, modulus: u32) -> u32 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    let mut base = u64::from(base) % u64::from(modulus);
    let mut exp = exp;
    let modulus = u64::from(modulus);
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        exp >>= 1;
        base = base * base % modulus;
    }
    result as u32
}
