//! Raw secret splitting and recovery.
//!
//! Splits a byte secret into x-indexed shares over GF(2^8) and
//! recovers it from a threshold of them. Two x-coordinates at the top
//! of the byte range are reserved: 255 for the secret itself and 254
//! for an HMAC digest that authenticates reconstruction. Generated
//! member indices stay in [0, 16), so the reserved rows never collide.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    gf256, rng, util, Error, MnemonicError, DIGEST_INDEX, DIGEST_LENGTH_BYTES, MAX_SHARE_COUNT,
    SECRET_INDEX,
};

/// A point on the sharing polynomial: x-coordinate plus per-byte
/// y-values.
#[derive(Debug, Clone)]
pub(crate) struct RawShare {
    pub x: u8,
    pub data: Zeroizing<Vec<u8>>,
}

impl RawShare {
    pub(crate) fn new(x: u8, data: Vec<u8>) -> Self {
        Self {
            x,
            data: Zeroizing::new(data),
        }
    }
}

fn share_digest(random_part: &[u8], shared_secret: &[u8]) -> [u8; DIGEST_LENGTH_BYTES] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(random_part).expect("HMAC accepts any key length");
    mac.update(shared_secret);
    let code = mac.finalize().into_bytes();
    let mut digest = [0u8; DIGEST_LENGTH_BYTES];
    digest.copy_from_slice(&code[..DIGEST_LENGTH_BYTES]);
    digest
}

/// Split `secret` into `share_count` shares, any `threshold` of which
/// recover it.
///
/// With a threshold of 1 every share is a plain copy of the secret and
/// no digest row exists. Otherwise `threshold - 2` shares are random,
/// and the digest and secret rows complete the polynomial; the
/// remaining shares are interpolated from those.
pub(crate) fn split_secret(
    threshold: u8,
    share_count: u8,
    secret: &[u8],
) -> Result<Vec<RawShare>, Error> {
    if threshold < 1 {
        return Err(Error::argument("threshold must be at least 1"));
    }
    if threshold > share_count {
        return Err(Error::argument("threshold must not exceed the share count"));
    }
    if share_count > MAX_SHARE_COUNT {
        return Err(Error::argument(format!(
            "no more than {MAX_SHARE_COUNT} shares can be created"
        )));
    }
    if secret.len() < DIGEST_LENGTH_BYTES {
        return Err(Error::argument("secret is too short to split"));
    }

    if threshold == 1 {
        return Ok((0..share_count)
            .map(|x| RawShare::new(x, secret.to_vec()))
            .collect());
    }

    let random_share_count = threshold as usize - 2;
    let mut shares: Vec<RawShare> = (0..random_share_count)
        .map(|x| RawShare::new(x as u8, rng::random_bytes(secret.len()).to_vec()))
        .collect();

    let random_part = rng::random_bytes(secret.len() - DIGEST_LENGTH_BYTES);
    let mut digest_row = Zeroizing::new(Vec::with_capacity(secret.len()));
    digest_row.extend_from_slice(&share_digest(&random_part, secret));
    digest_row.extend_from_slice(&random_part);

    let mut derived = Vec::with_capacity(share_count as usize - random_share_count);
    {
        let mut base: Vec<(u8, &[u8])> =
            shares.iter().map(|s| (s.x, s.data.as_slice())).collect();
        base.push((DIGEST_INDEX, &digest_row));
        base.push((SECRET_INDEX, secret));

        for x in random_share_count as u8..share_count {
            let data = gf256::interpolate(&base, x)?;
            derived.push(RawShare::new(x, data.to_vec()));
        }
    }
    shares.extend(derived);

    Ok(shares)
}

/// Recover the secret from `shares`.
///
/// The caller supplies exactly the threshold of shares it declared.
/// For thresholds above 1 the digest row is interpolated alongside the
/// secret and verified in constant time; a mismatch means the shares
/// are inconsistent or too few.
pub(crate) fn recover_secret(
    threshold: u8,
    shares: &[RawShare],
) -> Result<Zeroizing<Vec<u8>>, Error> {
    if shares.is_empty() {
        return Err(MnemonicError::Empty.into());
    }
    if threshold == 1 {
        return Ok(shares[0].data.clone());
    }

    let points: Vec<(u8, &[u8])> = shares.iter().map(|s| (s.x, s.data.as_slice())).collect();
    let shared_secret = gf256::interpolate(&points, SECRET_INDEX)?;
    let digest_row = gf256::interpolate(&points, DIGEST_INDEX)?;

    let (digest, random_part) = digest_row.split_at(DIGEST_LENGTH_BYTES);
    if !util::ct_eq(digest, &share_digest(random_part, &shared_secret)) {
        return Err(MnemonicError::DigestMismatch.into());
    }
    Ok(shared_secret)
}
