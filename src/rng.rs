//! Injectable random-byte source.
//!
//! Defaults to the operating system CSPRNG. Tests may install a
//! deterministic source with [`set_random_source`]; replacement is
//! meant for process setup and is not synchronized against concurrent
//! library calls.

use std::sync::RwLock;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::ID_LENGTH_BITS;

/// Fills a buffer with random bytes.
pub type RandomSource = fn(&mut [u8]);

fn os_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

static RANDOM_SOURCE: RwLock<RandomSource> = RwLock::new(os_random);

/// Replace the process-wide random source.
///
/// Intended for deterministic tests. Call during setup, before any
/// splitting begins.
pub fn set_random_source(fill: RandomSource) {
    *RANDOM_SOURCE.write().expect("random source lock poisoned") = fill;
}

pub(crate) fn fill(buf: &mut [u8]) {
    let source = *RANDOM_SOURCE.read().expect("random source lock poisoned");
    source(buf);
}

pub(crate) fn random_bytes(n: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; n]);
    fill(&mut buf);
    buf
}

/// Draw a random 15-bit share-set identifier.
pub(crate) fn random_identifier() -> u16 {
    let mut buf = [0u8; 2];
    fill(&mut buf);
    u16::from_be_bytes(buf) & ((1 << ID_LENGTH_BITS) - 1)
}
