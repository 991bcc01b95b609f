//! Two-level split and recovery orchestration.
//!
//! Ties the pipeline together: passphrase encryption, the group-level
//! split, the member-level splits, the mnemonic codec, and the reverse
//! path. The group quorum and each member quorum are independent
//! Shamir instances over the same ciphertext length.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use crate::cipher::EncryptedMasterSecret;
use crate::recovery::ShareGroup;
use crate::shamir::{self, RawShare};
use crate::share::Share;
use crate::{rng, Error, MnemonicError, MAX_SHARE_COUNT, MIN_STRENGTH_BITS};

fn check_group_shape(group_threshold: u8, groups: &[(u8, u8)]) -> Result<(), Error> {
    if group_threshold < 1 {
        return Err(Error::argument("group threshold must be at least 1"));
    }
    if group_threshold as usize > groups.len() {
        return Err(Error::argument(
            "group threshold must not exceed the number of groups",
        ));
    }
    if groups.len() > MAX_SHARE_COUNT as usize {
        return Err(Error::argument(format!(
            "no more than {MAX_SHARE_COUNT} groups are supported"
        )));
    }
    for (threshold, count) in groups {
        if *threshold < 1 {
            return Err(Error::argument("member threshold must be at least 1"));
        }
        if threshold > count {
            return Err(Error::argument(
                "member threshold must not exceed the member count",
            ));
        }
        if *threshold == 1 && *count > 1 {
            return Err(Error::argument(
                "a group with member threshold 1 can only have one member",
            ));
        }
    }
    Ok(())
}

/// Split an encrypted master secret into mnemonic-ready shares.
///
/// Produces one inner vector per requested group. The group-level
/// split runs first; each group share is then split again by that
/// group's member parameters.
pub fn split_ems(
    group_threshold: u8,
    groups: &[(u8, u8)],
    ems: &EncryptedMasterSecret,
) -> Result<Vec<Vec<Share>>, Error> {
    if ems.ciphertext.len() * 8 < MIN_STRENGTH_BITS {
        return Err(Error::argument(format!(
            "encrypted master secret must be at least {MIN_STRENGTH_BITS} bits"
        )));
    }
    check_group_shape(group_threshold, groups)?;

    let group_shares = shamir::split_secret(group_threshold, groups.len() as u8, &ems.ciphertext)?;

    let mut result = Vec::with_capacity(groups.len());
    for (group_share, (member_threshold, member_count)) in group_shares.iter().zip(groups) {
        let members = shamir::split_secret(*member_threshold, *member_count, &group_share.data)?;
        result.push(
            members
                .into_iter()
                .map(|member| Share {
                    identifier: ems.identifier,
                    extendable: ems.extendable,
                    iteration_exponent: ems.iteration_exponent,
                    group_index: group_share.x,
                    group_threshold,
                    group_count: groups.len() as u8,
                    member_index: member.x,
                    member_threshold: *member_threshold,
                    value: member.data.to_vec(),
                })
                .collect(),
        );
    }
    Ok(result)
}

/// Recover the encrypted master secret from grouped shares.
///
/// Expects exactly the group threshold of groups, each holding exactly
/// its member threshold of shares.
pub fn recover_ems(groups: &BTreeMap<u8, ShareGroup>) -> Result<EncryptedMasterSecret, Error> {
    let first = groups
        .values()
        .find_map(|group| group.shares().first())
        .ok_or(MnemonicError::Empty)?;
    let parameters = first.common_parameters();

    if groups.len() != parameters.group_threshold as usize {
        return Err(MnemonicError::GroupCount {
            expected: parameters.group_threshold,
            actual: groups.len(),
        }
        .into());
    }

    let mut group_points: Vec<RawShare> = Vec::with_capacity(groups.len());
    for (group_index, group) in groups {
        let member_threshold = group
            .member_threshold()
            .ok_or(MnemonicError::Empty)?;
        if group.len() != member_threshold as usize {
            return Err(MnemonicError::MemberCount {
                group_index: *group_index,
                count: group.len(),
                threshold: member_threshold,
            }
            .into());
        }
        let members: Vec<RawShare> = group
            .shares()
            .iter()
            .map(|share| RawShare::new(share.member_index, share.value.clone()))
            .collect();
        let data = shamir::recover_secret(member_threshold, &members)?;
        group_points.push(RawShare::new(*group_index, data.to_vec()));
    }

    let ciphertext = shamir::recover_secret(parameters.group_threshold, &group_points)?;
    Ok(EncryptedMasterSecret {
        identifier: parameters.identifier,
        extendable: parameters.extendable,
        iteration_exponent: parameters.iteration_exponent,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Parse mnemonics into share groups, checking set consistency.
///
/// All mnemonics must carry the same common parameters; within each
/// group the member parameters must agree. Value-equal duplicates
/// coalesce.
pub fn decode_mnemonics<S: AsRef<str>>(
    mnemonics: &[S],
) -> Result<BTreeMap<u8, ShareGroup>, Error> {
    if mnemonics.is_empty() {
        return Err(MnemonicError::Empty.into());
    }
    let mut state = crate::RecoveryState::new();
    for mnemonic in mnemonics {
        state.add_share(Share::from_mnemonic(mnemonic.as_ref())?)?;
    }
    Ok(state.into_groups())
}

/// Split a master secret into groups of mnemonics.
///
/// `groups` lists `(member_threshold, member_count)` per group; shares
/// from `group_threshold` of them recover the secret. The passphrase
/// must be printable ASCII; pass `""` for none. `extendable` selects
/// whether a future re-split under the same passphrase can decrypt to
/// the same secret; `iteration_exponent` scales the key-derivation
/// work factor by `2^e`.
pub fn generate_mnemonics(
    group_threshold: u8,
    groups: &[(u8, u8)],
    master_secret: &[u8],
    passphrase: &str,
    extendable: bool,
    iteration_exponent: u8,
) -> Result<Vec<Vec<String>>, Error> {
    if !passphrase.bytes().all(|b| (32..=126).contains(&b)) {
        return Err(Error::argument(
            "passphrase must consist of printable ASCII characters",
        ));
    }
    let ems = EncryptedMasterSecret::from_master_secret(
        master_secret,
        passphrase,
        rng::random_identifier(),
        extendable,
        iteration_exponent,
    )?;
    let groups = split_ems(group_threshold, groups, &ems)?;
    Ok(groups
        .iter()
        .map(|group| group.iter().map(Share::mnemonic).collect())
        .collect())
}

/// Split a freshly drawn random master secret of `strength_bits` into
/// groups of mnemonics.
pub fn generate_mnemonics_random(
    group_threshold: u8,
    groups: &[(u8, u8)],
    strength_bits: u16,
    passphrase: &str,
    extendable: bool,
    iteration_exponent: u8,
) -> Result<Vec<Vec<String>>, Error> {
    if (strength_bits as usize) < MIN_STRENGTH_BITS {
        return Err(Error::argument(format!(
            "strength must be at least {MIN_STRENGTH_BITS} bits"
        )));
    }
    if strength_bits % 16 != 0 {
        return Err(Error::argument("strength must be a multiple of 16 bits"));
    }
    let master_secret = rng::random_bytes(strength_bits as usize / 8);
    generate_mnemonics(
        group_threshold,
        groups,
        &master_secret,
        passphrase,
        extendable,
        iteration_exponent,
    )
}

/// Combine a quorum of mnemonics back into the master secret.
///
/// The wrong passphrase does not fail; it yields a different,
/// plausible secret.
pub fn combine_mnemonics<S: AsRef<str>>(
    mnemonics: &[S],
    passphrase: &str,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let groups = decode_mnemonics(mnemonics)?;
    let ems = recover_ems(&groups)?;
    ems.decrypt(passphrase)
}
