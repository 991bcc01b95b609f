//! GF(2^8) arithmetic and Lagrange interpolation.
//!
//! Uses the irreducible polynomial x^8 + x^4 + x^3 + x + 1 (0x11B)
//! with the generator x + 1, matching SLIP-0039. Exp and log tables
//! are built at compile time and drive both multiplication and the
//! log-space interpolation used by the secret sharing engine.

use zeroize::Zeroizing;

use crate::{Error, MnemonicError};

/// The reducing polynomial, with the x^8 term.
const POLYNOMIAL: u16 = 0x11B;

const fn build_tables() -> ([u8; 255], [u8; 256]) {
    let mut exp = [0u8; 255];
    let mut log = [0u8; 256];
    let mut poly: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = poly as u8;
        log[poly as usize] = i as u8;
        // Multiply by the generator x + 1 and reduce.
        poly = (poly << 1) ^ poly;
        if poly & 0x100 != 0 {
            poly ^= POLYNOMIAL;
        }
        i += 1;
    }
    (exp, log)
}

const TABLES: ([u8; 255], [u8; 256]) = build_tables();

/// exp[i] = (x+1)^i. Indices are taken mod 255 by the callers.
static EXP: [u8; 255] = TABLES.0;

/// log[exp[i]] = i. log[0] is unused; zero factors short-circuit.
static LOG: [u8; 256] = TABLES.1;

/// Add two field elements.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiply two field elements.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
}

#[inline]
fn mod_255(n: i32) -> usize {
    n.rem_euclid(255) as usize
}

/// Lagrange interpolation of the sharing polynomial at `x`.
///
/// Each point is an x-coordinate paired with a vector of y-values, one
/// per byte position of the share; the result carries the interpolated
/// value for every byte position. If `x` coincides with one of the
/// points its y-vector is returned directly.
///
/// # Errors
///
/// Fails if two points share an x-coordinate or the y-vectors have
/// different lengths.
pub(crate) fn interpolate(points: &[(u8, &[u8])], x: u8) -> Result<Zeroizing<Vec<u8>>, Error> {
    if points.is_empty() {
        return Err(MnemonicError::Empty.into());
    }
    let mut seen = [false; 256];
    for (xi, _) in points {
        if seen[*xi as usize] {
            return Err(MnemonicError::DuplicateIndices.into());
        }
        seen[*xi as usize] = true;
    }
    let len = points[0].1.len();
    if points.iter().any(|(_, y)| y.len() != len) {
        return Err(MnemonicError::UnequalLengths.into());
    }

    if seen[x as usize] {
        let (_, y) = points.iter().find(|(xi, _)| *xi == x).unwrap();
        return Ok(Zeroizing::new(y.to_vec()));
    }

    // Work in log space: the basis coefficient for point i is
    //   prod_m (x_m + x) / ((x_i + x) * prod_{m != i} (x_i + x_m))
    // where log(x_i + x_i) = log(0) = 0 drops out of the inner sum.
    let log_prod: i32 = points
        .iter()
        .map(|(xi, _)| LOG[(xi ^ x) as usize] as i32)
        .sum();

    let mut result = Zeroizing::new(vec![0u8; len]);
    for (xi, yi) in points {
        let log_basis = mod_255(
            log_prod
                - LOG[(xi ^ x) as usize] as i32
                - points
                    .iter()
                    .map(|(xj, _)| LOG[(xj ^ xi) as usize] as i32)
                    .sum::<i32>(),
        );
        for (r, y) in result.iter_mut().zip(yi.iter()) {
            if *y != 0 {
                *r ^= EXP[(LOG[*y as usize] as usize + log_basis) % 255];
            }
        }
    }
    Ok(result)
}
