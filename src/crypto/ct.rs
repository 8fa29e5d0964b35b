//! Constant-time comparison of secrets, tags and digests
//!
//! Every tag and digest check in this crate goes through [`constant_time_eq`].
//! Comparing secret-derived bytes with `==` leaks the position of the first
//! mismatch through timing.

use subtle::ConstantTimeEq;

/// Compare two byte sequences without an early exit.
///
/// Sequences of different length are unequal; the length itself is not
/// treated as secret. Equal-length inputs are folded over their full length
/// before the result is produced.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
