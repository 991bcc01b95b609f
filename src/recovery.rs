//! Interactive share accumulation.
//!
//! [`RecoveryState`] collects shares one at a time, as a user would
//! type them in, groups them by group index and reports progress until
//! enough quorums are satisfied to recover the secret. Shares that do
//! not belong to the set being recovered are rejected; re-entering a
//! share the state already holds is a no-op.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use crate::share::{group_prefix, CommonParameters, Share};
use crate::{slip39, Error, MnemonicError};

/// Shares of one group, deduplicated by value equality.
#[derive(Debug, Clone, Default)]
pub struct ShareGroup {
    shares: Vec<Share>,
}

impl ShareGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a share, coalescing exact duplicates.
    ///
    /// # Errors
    ///
    /// Fails if the share declares different group-level parameters
    /// than the members already present.
    pub fn add(&mut self, share: Share) -> Result<(), Error> {
        if self.shares.contains(&share) {
            return Ok(());
        }
        if let Some(first) = self.shares.first() {
            if first.group_index != share.group_index
                || first.member_threshold != share.member_threshold
            {
                return Err(MnemonicError::GroupParametersMismatch(share.group_index).into());
            }
        }
        self.shares.push(share);
        Ok(())
    }

    /// The shares collected so far.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// The member threshold all members declare, once one is present.
    pub fn member_threshold(&self) -> Option<u8> {
        self.shares.first().map(|s| s.member_threshold)
    }

    /// Whether enough members are present to meet the threshold.
    pub fn is_complete(&self) -> bool {
        match self.member_threshold() {
            Some(threshold) => self.shares.len() >= threshold as usize,
            None => false,
        }
    }

    /// A copy trimmed to exactly the member threshold of shares.
    pub(crate) fn minimal(&self) -> ShareGroup {
        let threshold = self.member_threshold().unwrap_or(0) as usize;
        ShareGroup {
            shares: self.shares[..threshold.min(self.shares.len())].to_vec(),
        }
    }
}

/// Accumulator for an interactive recovery session.
#[derive(Debug, Default)]
pub struct RecoveryState {
    parameters: Option<CommonParameters>,
    groups: BTreeMap<u8, ShareGroup>,
}

impl RecoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The common parameters of the set being recovered, once a first
    /// share has been entered.
    pub fn parameters(&self) -> Option<&CommonParameters> {
        self.parameters.as_ref()
    }

    /// Whether `share` belongs to the set being recovered.
    ///
    /// Vacuously true while no share has been entered yet.
    pub fn matches(&self, share: &Share) -> bool {
        match &self.parameters {
            Some(parameters) => *parameters == share.common_parameters(),
            None => true,
        }
    }

    /// Whether a value-equal share has already been entered.
    pub fn has(&self, share: &Share) -> bool {
        self.groups
            .get(&share.group_index)
            .is_some_and(|group| group.shares.contains(share))
    }

    /// Enter a share.
    ///
    /// The first share fixes the set's common parameters; later shares
    /// must agree with them. Duplicates coalesce silently.
    pub fn add_share(&mut self, share: Share) -> Result<(), Error> {
        if !self.matches(&share) {
            return Err(MnemonicError::ForeignShare.into());
        }
        let parameters = share.common_parameters();
        self.groups.entry(share.group_index).or_default().add(share)?;
        if self.parameters.is_none() {
            self.parameters = Some(parameters);
        }
        Ok(())
    }

    /// How many shares of group `group_index` have been entered, and
    /// the group's member threshold if known.
    pub fn group_status(&self, group_index: u8) -> (usize, Option<u8>) {
        match self.groups.get(&group_index) {
            Some(group) => (group.len(), group.member_threshold()),
            None => (0, None),
        }
    }

    /// The first words a mnemonic of group `group_index` would start
    /// with, as a hint for locating missing shares.
    pub fn group_prefix(&self, group_index: u8) -> Option<String> {
        self.parameters
            .as_ref()
            .map(|parameters| group_prefix(parameters, group_index))
    }

    /// Whether group `group_index` has met its member threshold.
    pub fn group_is_complete(&self, group_index: u8) -> bool {
        self.groups
            .get(&group_index)
            .is_some_and(ShareGroup::is_complete)
    }

    /// The number of groups that have met their member threshold.
    pub fn groups_complete(&self) -> usize {
        self.groups.values().filter(|g| g.is_complete()).count()
    }

    /// Whether enough complete groups exist to attempt recovery.
    pub fn is_complete(&self) -> bool {
        match &self.parameters {
            Some(parameters) => self.groups_complete() >= parameters.group_threshold as usize,
            None => false,
        }
    }

    /// Consume the state, yielding the accumulated groups.
    pub fn into_groups(self) -> BTreeMap<u8, ShareGroup> {
        self.groups
    }

    /// Recover the master secret from the accumulated shares.
    ///
    /// Selects complete groups in ascending group-index order up to
    /// the group threshold, trims each to exactly its member
    /// threshold, and runs the two-level reconstruction.
    pub fn recover(&self, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
        let parameters = self
            .parameters
            .as_ref()
            .ok_or(MnemonicError::Empty)?;
        let selected: BTreeMap<u8, ShareGroup> = self
            .groups
            .iter()
            .filter(|(_, group)| group.is_complete())
            .take(parameters.group_threshold as usize)
            .map(|(index, group)| (*index, group.minimal()))
            .collect();
        let ems = slip39::recover_ems(&selected)?;
        ems.decrypt(passphrase)
    }
}
