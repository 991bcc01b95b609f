//! Two-level Shamir's Secret Sharing with mnemonic share encoding.
//!
//! Splits a high-entropy master secret into human-readable mnemonic
//! shares following SLIP-0039. Shares are organized in two levels: a
//! group threshold of groups must be satisfied, and within each group a
//! member threshold of shares. The master secret is encrypted with a
//! passphrase before splitting, so a wrong passphrase yields a
//! plausible but different secret rather than an error.
//!
//! # Example
//!
//! ```no_run
//! let secret = b"ABCDEFGHIJKLMNOP";
//! let groups = shard39::generate_mnemonics(1, &[(3, 5)], secret, "", true, 1)?;
//! let recovered = shard39::combine_mnemonics(&groups[0][..3], "")?;
//! assert_eq!(&recovered[..], secret);
//! # Ok::<(), shard39::Error>(())
//! ```
//!
//! # Security Notes
//!
//! - Secret-bearing buffers are zeroized when they leave scope,
//!   including on error paths.
//! - Share digests and share values are compared in constant time.
//! - Randomness comes from the OS by default; see
//!   [`set_random_source`] for deterministic test setups.

pub mod bits;
pub mod cipher;
pub mod gf256;
pub mod recovery;
pub mod rng;
pub mod rs1024;
pub mod shamir;
pub mod share;
pub mod slip39;
pub mod util;
pub mod wordlist;

use thiserror::Error;

pub use cipher::{decrypt, encrypt, EncryptedMasterSecret};
pub use recovery::{RecoveryState, ShareGroup};
pub use rng::set_random_source;
pub use share::{CommonParameters, Share};
pub use slip39::{
    combine_mnemonics, decode_mnemonics, generate_mnemonics, generate_mnemonics_random,
    recover_ems, split_ems,
};

/// The length of a mnemonic word index in bits.
pub const RADIX_BITS: usize = 10;

/// The number of words in the wordlist.
pub const RADIX: usize = 1 << RADIX_BITS;

/// The length of the random share-set identifier in bits.
pub const ID_LENGTH_BITS: usize = 15;

/// The length of the extendable backup flag in bits.
pub const EXTENDABLE_FLAG_LENGTH_BITS: usize = 1;

/// The length of the iteration exponent in bits.
pub const ITERATION_EXP_LENGTH_BITS: usize = 4;

/// The length of the identifier, flag and iteration exponent in words.
pub const ID_EXP_LENGTH_WORDS: usize =
    (ID_LENGTH_BITS + EXTENDABLE_FLAG_LENGTH_BITS + ITERATION_EXP_LENGTH_BITS + RADIX_BITS - 1)
        / RADIX_BITS;

/// The length of the RS1024 checksum in words.
pub const CHECKSUM_LENGTH_WORDS: usize = 3;

/// The length of a mnemonic in words, not counting the share value.
pub const METADATA_LENGTH_WORDS: usize = ID_EXP_LENGTH_WORDS + 2 + CHECKSUM_LENGTH_WORDS;

/// The minimum allowed entropy of the master secret in bits.
pub const MIN_STRENGTH_BITS: usize = 128;

/// The minimum allowed length of a mnemonic in words.
pub const MIN_MNEMONIC_LENGTH_WORDS: usize =
    METADATA_LENGTH_WORDS + (MIN_STRENGTH_BITS + RADIX_BITS - 1) / RADIX_BITS;

/// The maximum number of shares per split, and of groups.
pub const MAX_SHARE_COUNT: u8 = 16;

/// The x-coordinate reserved for the shared secret.
pub const SECRET_INDEX: u8 = 255;

/// The x-coordinate reserved for the share digest.
pub const DIGEST_INDEX: u8 = 254;

/// The length of the digest of the shared secret in bytes.
pub const DIGEST_LENGTH_BYTES: usize = 4;

/// The total PBKDF2 iteration count at iteration exponent 0.
pub const BASE_ITERATION_COUNT: u32 = 10_000;

/// The number of rounds in the Feistel cipher.
pub const ROUND_COUNT: u32 = 4;

/// Errors arising from malformed or inconsistent mnemonic data.
///
/// Everything that can go wrong with data received over the wire (a
/// typed-in mnemonic, a mixed-up set of shares) surfaces as one of
/// these. Caller mistakes such as an odd-length master secret are
/// reported as [`Error::Argument`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    /// The mnemonic has fewer words than the shortest valid share.
    #[error("mnemonic must be at least {MIN_MNEMONIC_LENGTH_WORDS} words, got {0}")]
    TooShort(usize),
    /// The word count implies more than 8 bits of value padding.
    #[error("invalid mnemonic length of {0} words")]
    InvalidLength(usize),
    /// A word is not in the wordlist.
    #[error("\"{0}\" is not a valid mnemonic word")]
    UnknownWord(String),
    /// The RS1024 checksum does not verify.
    #[error("invalid checksum for mnemonic starting \"{0} ...\"")]
    Checksum(String),
    /// The high-order padding bits of the share value are not zero.
    #[error("share value padding bits must be zero")]
    InvalidPadding,
    /// A share declares a group threshold above its group count.
    #[error("group threshold {threshold} exceeds the declared group count {count}")]
    GroupDeclaration {
        /// Declared group threshold.
        threshold: u8,
        /// Declared group count.
        count: u8,
    },
    /// The share's common parameters differ from the rest of the set.
    #[error("share is not part of the current share set")]
    ForeignShare,
    /// Shares within one group declare different member parameters.
    #[error("shares in group {0} declare different member parameters")]
    GroupParametersMismatch(u8),
    /// Two shares in a reconstruction carry the same x-coordinate.
    #[error("share indices must be unique")]
    DuplicateIndices,
    /// Share values in a reconstruction have different lengths.
    #[error("shares must have values of equal length")]
    UnequalLengths,
    /// The recovered secret does not match its digest.
    #[error("share digest verification failed")]
    DigestMismatch,
    /// The number of groups does not equal the group threshold.
    #[error("expected shares from {expected} groups, got {actual}")]
    GroupCount {
        /// The declared group threshold.
        expected: u8,
        /// The number of distinct groups supplied.
        actual: usize,
    },
    /// A group does not hold exactly its member threshold of shares.
    #[error("group {group_index} has {count} member shares, needs exactly {threshold}")]
    MemberCount {
        /// The group in question.
        group_index: u8,
        /// Shares present in the group.
        count: usize,
        /// The group's member threshold.
        threshold: u8,
    },
    /// No mnemonics were supplied at all.
    #[error("no mnemonics were provided")]
    Empty,
}

/// Top-level library error.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or inconsistent mnemonic data.
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
    /// Caller-supplied parameters violate the scheme limits.
    #[error("invalid argument: {0}")]
    Argument(String),
}

impl Error {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Error::Argument(msg.into())
    }
}
