//! Passphrase encryption of the master secret.
//!
//! A four-round unbalanced Feistel network whose round function is
//! PBKDF2-HMAC-SHA256. Decrypting with the wrong passphrase succeeds
//! and yields a different, equally plausible secret; there is nothing
//! to brute-force against except the final secret's own use.
//!
//! For non-extendable share sets the share-set identifier is mixed
//! into the PBKDF2 salt, binding the ciphertext to one set. Extendable
//! sets leave it out, so re-splits under the same passphrase decrypt
//! to the same master secret regardless of identifier.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::rs1024::Customization;
use crate::{util, Error, BASE_ITERATION_COUNT, ID_LENGTH_BITS, MIN_STRENGTH_BITS, ROUND_COUNT};

fn salt(identifier: u16, extendable: bool) -> Vec<u8> {
    if extendable {
        return Vec::new();
    }
    let mut salt = Customization::Shamir.as_bytes().to_vec();
    salt.extend_from_slice(&identifier.to_be_bytes());
    salt
}

fn round_function(step: u8, passphrase: &[u8], exponent: u8, salt: &[u8], block: &[u8], out: &mut [u8]) {
    let mut password = Zeroizing::new(Vec::with_capacity(1 + passphrase.len()));
    password.push(step);
    password.extend_from_slice(passphrase);

    let mut round_salt = Zeroizing::new(Vec::with_capacity(salt.len() + block.len()));
    round_salt.extend_from_slice(salt);
    round_salt.extend_from_slice(block);

    // Exact by construction: 10000 << e is always a multiple of 4.
    let iterations = (BASE_ITERATION_COUNT << exponent) / ROUND_COUNT;
    pbkdf2_hmac::<Sha256>(&password, &round_salt, iterations, out);
}

fn feistel(
    input: &[u8],
    passphrase: &[u8],
    exponent: u8,
    salt: &[u8],
    rounds: impl Iterator<Item = u8>,
) -> Zeroizing<Vec<u8>> {
    let half = input.len() / 2;
    let mut left = Zeroizing::new(input[..half].to_vec());
    let mut right = Zeroizing::new(input[half..].to_vec());
    let mut work = Zeroizing::new(vec![0u8; half]);

    for step in rounds {
        round_function(step, passphrase, exponent, salt, &right, &mut work);
        util::xor_into(&mut work, &left);
        std::mem::swap(&mut left, &mut right);
        std::mem::swap(&mut right, &mut work);
    }

    let mut output = Zeroizing::new(Vec::with_capacity(input.len()));
    output.extend_from_slice(&right);
    output.extend_from_slice(&left);
    output
}

fn check_secret_length(len: usize) -> Result<(), Error> {
    if len % 2 != 0 {
        return Err(Error::argument(
            "master secret must have an even number of bytes",
        ));
    }
    Ok(())
}

fn check_parameters(identifier: u16, iteration_exponent: u8) -> Result<(), Error> {
    if identifier >= 1 << ID_LENGTH_BITS {
        return Err(Error::argument("identifier does not fit in 15 bits"));
    }
    if iteration_exponent >= 16 {
        return Err(Error::argument("iteration exponent does not fit in 4 bits"));
    }
    Ok(())
}

/// Encrypt a master secret under a passphrase.
pub fn encrypt(
    master_secret: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    identifier: u16,
    extendable: bool,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    check_secret_length(master_secret.len())?;
    check_parameters(identifier, iteration_exponent)?;
    let salt = salt(identifier, extendable);
    Ok(feistel(
        master_secret,
        passphrase.as_bytes(),
        iteration_exponent,
        &salt,
        0..ROUND_COUNT as u8,
    ))
}

/// Decrypt a ciphertext produced by [`encrypt`].
pub fn decrypt(
    ciphertext: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    identifier: u16,
    extendable: bool,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    check_secret_length(ciphertext.len())?;
    check_parameters(identifier, iteration_exponent)?;
    let salt = salt(identifier, extendable);
    Ok(feistel(
        ciphertext,
        passphrase.as_bytes(),
        iteration_exponent,
        &salt,
        (0..ROUND_COUNT as u8).rev(),
    ))
}

/// A master secret after passphrase encryption, together with the
/// parameters every derived share will carry.
///
/// This is what actually gets split: group shares are points on a
/// polynomial through the ciphertext, never through the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedMasterSecret {
    /// Random 15-bit share-set identifier.
    pub identifier: u16,
    /// Whether the identifier is excluded from key derivation.
    pub extendable: bool,
    /// Work-factor knob; PBKDF2 runs 2500 * 2^e iterations per round.
    pub iteration_exponent: u8,
    /// The Feistel-encrypted master secret.
    pub ciphertext: Vec<u8>,
}

impl EncryptedMasterSecret {
    /// Construct by encrypting a master secret.
    ///
    /// The master secret must be at least 16 bytes and of even length.
    pub fn from_master_secret(
        master_secret: &[u8],
        passphrase: &str,
        identifier: u16,
        extendable: bool,
        iteration_exponent: u8,
    ) -> Result<Self, Error> {
        if master_secret.len() * 8 < MIN_STRENGTH_BITS {
            return Err(Error::argument(format!(
                "master secret must be at least {} bits",
                MIN_STRENGTH_BITS
            )));
        }
        let ciphertext = encrypt(
            master_secret,
            passphrase,
            iteration_exponent,
            identifier,
            extendable,
        )?;
        Ok(Self {
            identifier,
            extendable,
            iteration_exponent,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Decrypt back to the master secret.
    ///
    /// Succeeds for any passphrase; only the one used at encryption
    /// time returns the original secret.
    pub fn decrypt(&self, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
        decrypt(
            &self.ciphertext,
            passphrase,
            self.iteration_exponent,
            self.identifier,
            self.extendable,
        )
    }
}

impl Zeroize for EncryptedMasterSecret {
    fn zeroize(&mut self) {
        self.identifier.zeroize();
        self.extendable = false;
        self.iteration_exponent.zeroize();
        self.ciphertext.zeroize();
    }
}

impl Drop for EncryptedMasterSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: &[u8] = b"ABCDEFGHIJKLMNOP";

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let ciphertext = encrypt(MS, "TREZOR", 1, 0x1234, false).unwrap();
        assert_eq!(ciphertext.len(), MS.len());
        assert_ne!(&ciphertext[..], MS);
        let plaintext = decrypt(&ciphertext, "TREZOR", 1, 0x1234, false).unwrap();
        assert_eq!(&plaintext[..], MS);
    }

    #[test]
    fn test_wrong_passphrase_differs_silently() {
        let ciphertext = encrypt(MS, "TREZOR", 0, 7, false).unwrap();
        let plaintext = decrypt(&ciphertext, "trezor", 0, 7, false).unwrap();
        assert_eq!(plaintext.len(), MS.len());
        assert_ne!(&plaintext[..], MS);
    }

    #[test]
    fn test_extendable_ignores_identifier() {
        let a = encrypt(MS, "TREZOR", 1, 1, true).unwrap();
        let b = encrypt(MS, "TREZOR", 1, 2, true).unwrap();
        assert_eq!(&a[..], &b[..]);

        let a = encrypt(MS, "TREZOR", 1, 1, false).unwrap();
        let b = encrypt(MS, "TREZOR", 1, 2, false).unwrap();
        assert_ne!(&a[..], &b[..]);
    }

    #[test]
    fn test_iteration_exponent_changes_ciphertext() {
        let a = encrypt(MS, "TREZOR", 0, 1, true).unwrap();
        let b = encrypt(MS, "TREZOR", 2, 1, true).unwrap();
        assert_ne!(&a[..], &b[..]);
        let plain = decrypt(&b, "TREZOR", 2, 1, true).unwrap();
        assert_eq!(&plain[..], MS);
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(matches!(
            encrypt(b"0123456789abcdefg", "", 0, 0, true),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn test_ems_roundtrip() {
        let ems = EncryptedMasterSecret::from_master_secret(MS, "pass", 99, true, 2).unwrap();
        assert_eq!(ems.ciphertext.len(), MS.len());
        let recovered = ems.decrypt("pass").unwrap();
        assert_eq!(&recovered[..], MS);
    }

    #[test]
    fn test_ems_rejects_short_secret() {
        assert!(matches!(
            EncryptedMasterSecret::from_master_secret(b"too short", "", 0, true, 1),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn test_ems_zeroized_on_drop() {
        let mut ems =
            EncryptedMasterSecret::from_master_secret(MS, "", 1, true, 1).unwrap();
        ems.zeroize();
        assert!(ems.ciphertext.is_empty() || ems.ciphertext.iter().all(|b| *b == 0));
        assert_eq!(ems.identifier, 0);
    }
}
