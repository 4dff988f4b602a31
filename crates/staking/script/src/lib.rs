//! Script leaves for a Bitcoin-native staking protocol.
//!
//! A staking output is a taproot output whose script tree commits to four
//! alternative spending paths, published together with an OP_RETURN
//! commitment that lets off-chain indexers recognize the output:
//!
//! ```text
//! timelock             <staker> OP_CHECKSIG <staking_timelock> OP_CSV OP_DROP
//! unbonding timelock   <staker> OP_CHECKSIG <unbonding_timelock> OP_CSV OP_DROP
//! unbonding            <staker> OP_CHECKSIGVERIFY <covenant quorum-of-n>
//! slashing             <staker> OP_CHECKSIGVERIFY <all finality providers> <covenant quorum-of-n>
//! data embed           OP_RETURN <tag || version || staker || provider || staking_timelock>
//! ```
//!
//! [`StakingScriptData`] validates the raw protocol parameters once, at
//! construction; the `build_*` methods are then pure and infallible. Key sets
//! are normalized to ascending byte order inside the multisig leaves, so two
//! builders given the same keys in different order produce byte-identical
//! scripts.
//!
//! ```
//! use strata_staking_script::StakingScriptData;
//!
//! let staker = [0x01u8; 32];
//! let provider = [0x02u8; 32];
//! let covenants = [[0x03u8; 32], [0x04u8; 32], [0x05u8; 32]];
//!
//! let data = StakingScriptData::new(
//!     &staker,
//!     &[&provider[..]],
//!     &[&covenants[0], &covenants[1], &covenants[2]],
//!     2,
//!     65_535,
//!     1_000,
//!     b"bbt4",
//! )
//! .unwrap();
//!
//! assert!(data.validate());
//! let scripts = data.build_scripts();
//! assert!(!scripts.slashing_script.is_empty());
//! ```

mod builder;
mod data;
mod error;
#[cfg(feature = "serde")]
mod serde;
mod tag;
mod types;

pub use data::{StakingScriptData, StakingScripts};
pub use error::{StakingScriptError, StakingScriptResult};
pub use tag::{TAG_BYTES_LEN, TagBytes};
pub use types::{MAX_TIMELOCK_BLOCKS, X_ONLY_KEY_LEN, XOnlyKeyBytes};

// Dev-dependencies exercised only by the serde feature tests.
#[cfg(test)]
use bincode as _;
#[cfg(test)]
use serde_json as _;
