//! Small helpers shared across the crate.

use subtle::ConstantTimeEq;

/// Constant-time byte-sequence equality.
///
/// Sequences of different lengths compare unequal without leaking
/// where they differ.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// XOR `src` into `dst` in place. The slices must have equal length.
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}
