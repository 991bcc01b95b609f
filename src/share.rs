//! Share value type and mnemonic codec.
//!
//! A share is one point of the two-level scheme together with the
//! metadata locating it: which share set it belongs to, which group,
//! which member slot, and the thresholds in force. The codec packs
//! those fields and the share value into 10-bit words, appends an
//! RS1024 checksum and maps the words through the wordlist.
//!
//! Bit layout, big-endian across the words:
//!
//! | field                | bits |
//! |----------------------|------|
//! | identifier           | 15   |
//! | extendable flag      | 1    |
//! | iteration exponent   | 4    |
//! | group index          | 4    |
//! | group threshold - 1  | 4    |
//! | group count - 1      | 4    |
//! | member index         | 4    |
//! | member threshold - 1 | 4    |
//! | share value          | 8·L  |
//! | padding (zeros)      | p    |
//! | RS1024 checksum      | 30   |

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::bits::{WordPacker, WordReader};
use crate::rs1024::{self, Customization};
use crate::{
    util, wordlist, Error, MnemonicError, CHECKSUM_LENGTH_WORDS, EXTENDABLE_FLAG_LENGTH_BITS,
    ID_EXP_LENGTH_WORDS, ID_LENGTH_BITS, ITERATION_EXP_LENGTH_BITS, METADATA_LENGTH_WORDS,
    MIN_MNEMONIC_LENGTH_WORDS, RADIX_BITS,
};

/// How many words a group prefix spans (identifier, flag, exponent and
/// the group word).
pub const GROUP_PREFIX_LENGTH_WORDS: usize = ID_EXP_LENGTH_WORDS + 1;

/// The parameters every share of one set has in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonParameters {
    /// Random 15-bit share-set identifier.
    pub identifier: u16,
    /// Whether the identifier is excluded from key derivation.
    pub extendable: bool,
    /// PBKDF2 work-factor exponent.
    pub iteration_exponent: u8,
    /// Number of groups whose quorums must be met.
    pub group_threshold: u8,
    /// Total number of groups in the set.
    pub group_count: u8,
}

/// One mnemonic-encoded member share.
///
/// Created by splitting or by parsing a mnemonic, and never mutated
/// afterwards. Equality compares every field, with the share value
/// compared in constant time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    /// Random 15-bit share-set identifier.
    pub identifier: u16,
    /// Whether the identifier is excluded from key derivation.
    pub extendable: bool,
    /// PBKDF2 work-factor exponent.
    pub iteration_exponent: u8,
    /// Which group this share belongs to.
    pub group_index: u8,
    /// Number of groups whose quorums must be met.
    pub group_threshold: u8,
    /// Total number of groups in the set.
    pub group_count: u8,
    /// This share's x-coordinate within its group.
    pub member_index: u8,
    /// Shares needed from this group.
    pub member_threshold: u8,
    /// The share data; same length as the encrypted master secret.
    pub value: Vec<u8>,
}

impl PartialEq for Share {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.extendable == other.extendable
            && self.iteration_exponent == other.iteration_exponent
            && self.group_index == other.group_index
            && self.group_threshold == other.group_threshold
            && self.group_count == other.group_count
            && self.member_index == other.member_index
            && self.member_threshold == other.member_threshold
            && util::ct_eq(&self.value, &other.value)
    }
}

impl Eq for Share {}

impl Zeroize for Share {
    fn zeroize(&mut self) {
        self.identifier.zeroize();
        self.extendable = false;
        self.iteration_exponent.zeroize();
        self.group_index.zeroize();
        self.group_threshold.zeroize();
        self.group_count.zeroize();
        self.member_index.zeroize();
        self.member_threshold.zeroize();
        self.value.zeroize();
    }
}

impl Drop for Share {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Share {
    /// The parameters this share must have in common with the rest of
    /// its set.
    pub fn common_parameters(&self) -> CommonParameters {
        CommonParameters {
            identifier: self.identifier,
            extendable: self.extendable,
            iteration_exponent: self.iteration_exponent,
            group_threshold: self.group_threshold,
            group_count: self.group_count,
        }
    }

    fn customization(&self) -> Customization {
        Customization::from_extendable(self.extendable)
    }

    /// Pack all fields into 10-bit words, checksum included.
    fn words(&self) -> Zeroizing<Vec<u16>> {
        let value_word_count = (8 * self.value.len() + RADIX_BITS - 1) / RADIX_BITS;
        let padding = (value_word_count * RADIX_BITS - 8 * self.value.len()) as u32;

        let mut packer = WordPacker::new();
        packer.push(self.identifier as u32, ID_LENGTH_BITS as u32);
        packer.push(self.extendable as u32, EXTENDABLE_FLAG_LENGTH_BITS as u32);
        packer.push(
            self.iteration_exponent as u32,
            ITERATION_EXP_LENGTH_BITS as u32,
        );
        packer.push(self.group_index as u32, 4);
        packer.push((self.group_threshold - 1) as u32, 4);
        packer.push((self.group_count - 1) as u32, 4);
        packer.push(self.member_index as u32, 4);
        packer.push((self.member_threshold - 1) as u32, 4);
        packer.push(0, padding);
        for byte in &self.value {
            packer.push(*byte as u32, 8);
        }

        let mut words = Zeroizing::new(packer.finish());
        let checksum = rs1024::create_checksum(self.customization(), &words);
        words.extend_from_slice(&checksum);
        words
    }

    /// Render as a space-separated mnemonic string.
    pub fn mnemonic(&self) -> String {
        let words = self.words();
        let mut result = String::new();
        for word in words.iter() {
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(wordlist::word_at(*word));
        }
        result
    }

    /// Parse a mnemonic string into a share.
    ///
    /// Input is normalized before decoding: lowercased, leading and
    /// trailing whitespace trimmed, runs of whitespace collapsed.
    pub fn from_mnemonic(mnemonic: &str) -> Result<Share, Error> {
        let normalized = mnemonic.to_lowercase();
        let words = Zeroizing::new(
            normalized
                .split_whitespace()
                .map(|w| {
                    wordlist::word_index(w).ok_or_else(|| MnemonicError::UnknownWord(w.to_string()))
                })
                .collect::<Result<Vec<u16>, _>>()?,
        );

        if words.len() < MIN_MNEMONIC_LENGTH_WORDS {
            return Err(MnemonicError::TooShort(words.len()).into());
        }
        let value_word_count = words.len() - METADATA_LENGTH_WORDS;
        let padding = (RADIX_BITS * value_word_count % 16) as u32;
        if padding > 8 {
            return Err(MnemonicError::InvalidLength(words.len()).into());
        }

        // The extendable flag selects the checksum domain, so the
        // header has to come out before the checksum can be verified.
        let mut reader = WordReader::new(&words[..ID_EXP_LENGTH_WORDS + 2]);
        let identifier = reader.take(ID_LENGTH_BITS as u32) as u16;
        let extendable = reader.take(EXTENDABLE_FLAG_LENGTH_BITS as u32) == 1;
        let iteration_exponent = reader.take(ITERATION_EXP_LENGTH_BITS as u32) as u8;
        let group_index = reader.take(4) as u8;
        let group_threshold = reader.take(4) as u8 + 1;
        let group_count = reader.take(4) as u8 + 1;
        let member_index = reader.take(4) as u8;
        let member_threshold = reader.take(4) as u8 + 1;

        if !rs1024::verify_checksum(Customization::from_extendable(extendable), &words) {
            let prefix = normalized
                .split_whitespace()
                .take(GROUP_PREFIX_LENGTH_WORDS)
                .collect::<Vec<_>>()
                .join(" ");
            return Err(MnemonicError::Checksum(prefix).into());
        }

        if group_count < group_threshold {
            return Err(MnemonicError::GroupDeclaration {
                threshold: group_threshold,
                count: group_count,
            }
            .into());
        }

        let value_words = &words[ID_EXP_LENGTH_WORDS + 2..words.len() - CHECKSUM_LENGTH_WORDS];
        let mut reader = WordReader::new(value_words);
        if reader.take(padding) != 0 {
            return Err(MnemonicError::InvalidPadding.into());
        }
        let value_length = (RADIX_BITS * value_word_count - padding as usize) / 8;
        let value: Vec<u8> = (0..value_length).map(|_| reader.take(8) as u8).collect();

        Ok(Share {
            identifier,
            extendable,
            iteration_exponent,
            group_index,
            group_threshold,
            group_count,
            member_index,
            member_threshold,
            value,
        })
    }
}

/// The first three words of a mnemonic with the given common
/// parameters and group index, as a UI hint for which group a missing
/// share belongs to.
pub(crate) fn group_prefix(params: &CommonParameters, group_index: u8) -> String {
    let mut packer = WordPacker::new();
    packer.push(params.identifier as u32, ID_LENGTH_BITS as u32);
    packer.push(params.extendable as u32, EXTENDABLE_FLAG_LENGTH_BITS as u32);
    packer.push(
        params.iteration_exponent as u32,
        ITERATION_EXP_LENGTH_BITS as u32,
    );
    packer.push(group_index as u32, 4);
    packer.push((params.group_threshold - 1) as u32, 4);
    packer.push((params.group_count - 1) as u32, 4);
    // Member fields only pad the stream out to whole words; the
    // prefix stops before the bits they occupy.
    packer.push(0, 8);
    packer
        .finish()
        .iter()
        .take(GROUP_PREFIX_LENGTH_WORDS)
        .map(|w| wordlist::word_at(*w))
        .collect::<Vec<_>>()
        .join(" ")
}
