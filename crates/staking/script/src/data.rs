use bitcoin::ScriptBuf;
use bitcoin::opcodes::all::OP_RETURN;
use bitcoin::script::PushBytesBuf;

use crate::builder::{concat_fragments, quorum_fragment, single_key_fragment, timelock_fragment};
use crate::error::{StakingScriptError, StakingScriptResult};
use crate::tag::{TAG_BYTES_LEN, TagBytes};
use crate::types::{MAX_TIMELOCK_BLOCKS, X_ONLY_KEY_LEN, XOnlyKeyBytes};

/// Version byte carried in the data embed payload.
const DATA_EMBED_VERSION: u8 = 0;

/// Validated parameters for one staking output.
///
/// Construction checks presence, shape and key-disjointness rules and reports
/// the first violation it finds; see [`StakingScriptData::new`]. Once built,
/// the instance is immutable and every leaf builder is a pure function of the
/// stored fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingScriptData {
    staker_key: XOnlyKeyBytes,
    finality_provider_keys: Vec<XOnlyKeyBytes>,
    covenant_keys: Vec<XOnlyKeyBytes>,
    covenant_quorum: u32,
    staking_timelock: u16,
    unbonding_timelock: u16,
    tag: TagBytes,
}

/// The five leaves committed in a staking output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StakingScripts {
    /// Staker-only leaf, spendable after the staking timelock.
    pub timelock_script: ScriptBuf,
    /// Early-unbonding leaf: staker plus covenant quorum.
    pub unbonding_script: ScriptBuf,
    /// Slashing leaf: staker, finality providers and covenant quorum.
    pub slashing_script: ScriptBuf,
    /// Staker-only leaf, spendable after the unbonding timelock.
    pub unbonding_timelock_script: ScriptBuf,
    /// Provably unspendable OP_RETURN commitment for indexers.
    pub data_embed_script: ScriptBuf,
}

impl StakingScriptData {
    /// Validates the raw protocol parameters and freezes them.
    ///
    /// Checks run in three passes and the first failure wins: presence
    /// (absent, zero or empty fields report
    /// [`MissingInput`](StakingScriptError::MissingInput)), then shape (key
    /// and tag lengths, quorum bound, timelock ranges), then key collisions
    /// across and within the committees (both report
    /// [`InvalidScriptData`](StakingScriptError::InvalidScriptData)).
    pub fn new(
        staker_key: &[u8],
        finality_provider_keys: &[&[u8]],
        covenant_keys: &[&[u8]],
        covenant_quorum: u32,
        staking_timelock: u32,
        unbonding_timelock: u32,
        tag_bytes: &[u8],
    ) -> StakingScriptResult<Self> {
        if staker_key.is_empty() {
            return Err(StakingScriptError::MissingInput("staker key"));
        }
        if finality_provider_keys.is_empty() {
            return Err(StakingScriptError::MissingInput("finality provider keys"));
        }
        if covenant_keys.is_empty() {
            return Err(StakingScriptError::MissingInput("covenant keys"));
        }
        if covenant_quorum == 0 {
            return Err(StakingScriptError::MissingInput("covenant quorum"));
        }
        if staking_timelock == 0 {
            return Err(StakingScriptError::MissingInput("staking timelock"));
        }
        if unbonding_timelock == 0 {
            return Err(StakingScriptError::MissingInput("unbonding timelock"));
        }
        if tag_bytes.is_empty() {
            return Err(StakingScriptError::MissingInput("tag bytes"));
        }

        let data = Self {
            staker_key: parse_key(staker_key, "staker key")?,
            finality_provider_keys: parse_keys(finality_provider_keys, "finality provider key")?,
            covenant_keys: parse_keys(covenant_keys, "covenant key")?,
            covenant_quorum,
            staking_timelock: parse_timelock(staking_timelock, "staking timelock")?,
            unbonding_timelock: parse_timelock(unbonding_timelock, "unbonding timelock")?,
            tag: parse_tag(tag_bytes)?,
        };

        data.check()?;
        Ok(data)
    }

    /// Re-runs the construction checks over the stored fields.
    ///
    /// Key and tag lengths and timelock ranges are guaranteed by the field
    /// types, so only the remaining rules can fail. Returns `true` iff the
    /// instance still satisfies every rule; never panics.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> StakingScriptResult<()> {
        if self.finality_provider_keys.is_empty() {
            return Err(StakingScriptError::MissingInput("finality provider keys"));
        }
        if self.covenant_keys.is_empty() {
            return Err(StakingScriptError::MissingInput("covenant keys"));
        }
        if self.covenant_quorum == 0 {
            return Err(StakingScriptError::MissingInput("covenant quorum"));
        }
        if self.staking_timelock == 0 {
            return Err(StakingScriptError::MissingInput("staking timelock"));
        }
        if self.unbonding_timelock == 0 {
            return Err(StakingScriptError::MissingInput("unbonding timelock"));
        }
        if self.covenant_quorum as usize > self.covenant_keys.len() {
            return Err(StakingScriptError::InvalidScriptData("covenant quorum"));
        }
        self.check_key_collisions()
    }

    fn check_key_collisions(&self) -> StakingScriptResult<()> {
        if self.finality_provider_keys.contains(&self.staker_key)
            || self.covenant_keys.contains(&self.staker_key)
        {
            return Err(StakingScriptError::InvalidScriptData(
                "staker key reused in a committee",
            ));
        }
        if self
            .finality_provider_keys
            .iter()
            .any(|key| self.covenant_keys.contains(key))
        {
            return Err(StakingScriptError::InvalidScriptData(
                "finality provider key reused as covenant key",
            ));
        }
        // A duplicate within a committee would count twice toward its quorum.
        if has_duplicate_keys(&self.finality_provider_keys)
            || has_duplicate_keys(&self.covenant_keys)
        {
            return Err(StakingScriptError::InvalidScriptData(
                "duplicate key within a committee",
            ));
        }
        Ok(())
    }

    /// Gets the staker key bytes.
    pub fn staker_key(&self) -> &XOnlyKeyBytes {
        &self.staker_key
    }

    /// Gets the finality provider keys in caller order.
    pub fn finality_provider_keys(&self) -> &[XOnlyKeyBytes] {
        &self.finality_provider_keys
    }

    /// Gets the covenant committee keys in caller order.
    pub fn covenant_keys(&self) -> &[XOnlyKeyBytes] {
        &self.covenant_keys
    }

    /// Gets the covenant signature threshold.
    pub fn covenant_quorum(&self) -> u32 {
        self.covenant_quorum
    }

    /// Gets the staking timelock in blocks.
    pub fn staking_timelock(&self) -> u16 {
        self.staking_timelock
    }

    /// Gets the unbonding timelock in blocks.
    pub fn unbonding_timelock(&self) -> u16 {
        self.unbonding_timelock
    }

    /// Gets the protocol tag.
    pub fn tag(&self) -> &TagBytes {
        &self.tag
    }

    /// Leaf spendable by the staker alone once the staking timelock expires.
    pub fn build_staking_timelock_script(&self) -> ScriptBuf {
        timelock_fragment(&self.staker_key, self.staking_timelock)
    }

    /// Leaf spendable by the staker alone once the unbonding timelock
    /// expires. Guards the output produced by an early unbonding.
    pub fn build_unbonding_timelock_script(&self) -> ScriptBuf {
        timelock_fragment(&self.staker_key, self.unbonding_timelock)
    }

    /// Early-unbonding leaf: the staker signature plus a covenant quorum.
    pub fn build_unbonding_script(&self) -> ScriptBuf {
        concat_fragments(&[
            single_key_fragment(&self.staker_key, true),
            quorum_fragment(&self.covenant_keys, self.covenant_quorum, false),
        ])
    }

    /// Slashing leaf: the staker signature, every finality provider, and a
    /// covenant quorum.
    pub fn build_slashing_script(&self) -> ScriptBuf {
        let provider_count = self.finality_provider_keys.len() as u32;
        concat_fragments(&[
            single_key_fragment(&self.staker_key, true),
            quorum_fragment(&self.finality_provider_keys, provider_count, true),
            quorum_fragment(&self.covenant_keys, self.covenant_quorum, false),
        ])
    }

    /// Provably unspendable OP_RETURN output tagging the staking output for
    /// off-chain indexers.
    ///
    /// Payload layout, pinned for the current protocol version:
    ///
    /// ```text
    /// [0..4]    protocol tag
    /// [4]       version (0)
    /// [5..37]   staker key
    /// [37..69]  first finality provider key
    /// [69..71]  staking timelock (big endian)
    /// ```
    pub fn build_data_embed_script(&self) -> ScriptBuf {
        let mut payload = Vec::with_capacity(TAG_BYTES_LEN + 1 + 2 * X_ONLY_KEY_LEN + 2);
        payload.extend_from_slice(self.tag.as_bytes());
        payload.push(DATA_EMBED_VERSION);
        payload.extend_from_slice(&self.staker_key);
        payload.extend_from_slice(&self.finality_provider_keys[0]);
        payload.extend_from_slice(&self.staking_timelock.to_be_bytes());

        let pushbytes = PushBytesBuf::try_from(payload).expect("embed: payload within push limit");

        ScriptBuf::builder()
            .push_opcode(OP_RETURN)
            .push_slice(pushbytes)
            .into_script()
    }

    /// Builds all five leaves in one call.
    ///
    /// Equivalent to calling the five builders individually; rebuilding from
    /// the same instance yields byte-identical scripts.
    pub fn build_scripts(&self) -> StakingScripts {
        StakingScripts {
            timelock_script: self.build_staking_timelock_script(),
            unbonding_script: self.build_unbonding_script(),
            slashing_script: self.build_slashing_script(),
            unbonding_timelock_script: self.build_unbonding_timelock_script(),
            data_embed_script: self.build_data_embed_script(),
        }
    }
}

fn parse_key(bytes: &[u8], field: &'static str) -> StakingScriptResult<XOnlyKeyBytes> {
    bytes
        .try_into()
        .map_err(|_| StakingScriptError::InvalidScriptData(field))
}

fn parse_keys(keys: &[&[u8]], field: &'static str) -> StakingScriptResult<Vec<XOnlyKeyBytes>> {
    keys.iter().map(|key| parse_key(key, field)).collect()
}

fn parse_timelock(blocks: u32, field: &'static str) -> StakingScriptResult<u16> {
    if blocks > MAX_TIMELOCK_BLOCKS {
        return Err(StakingScriptError::InvalidScriptData(field));
    }
    Ok(blocks as u16)
}

fn parse_tag(bytes: &[u8]) -> StakingScriptResult<TagBytes> {
    let tag: [u8; TAG_BYTES_LEN] = bytes
        .try_into()
        .map_err(|_| StakingScriptError::InvalidScriptData("tag bytes"))?;
    Ok(TagBytes::new(tag))
}

fn has_duplicate_keys(keys: &[XOnlyKeyBytes]) -> bool {
    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|pair| pair[0] == pair[1])
}
