//! Withdrawal transaction construction for a Bitcoin-native staking
//! protocol.
//!
//! A staker exits through one of two script path spends of the staking (or
//! unbonding) output: the original staking timelock leaf, or the unbonding
//! timelock leaf that guards the output produced by an early unbonding. Both
//! paths share one algorithm: read the funding output, estimate the
//! script-path witness size from the leaf being revealed and the leaves
//! committed next to it, and pay the remainder after fees to a destination
//! address.
//!
//! ```text
//! funding output ──▶ [ single input, sequence = leaf timelock ]
//!                    [ single output, value = funding - fee   ] ──▶ destination
//! ```
//!
//! The result is an unsigned PSBT carrying the funding output as its witness
//! utxo, ready for signing and witness attachment downstream. The reported
//! fee always equals the input value minus the output value, exactly.

mod error;
mod fee;
mod tx;

pub use error::{WithdrawalError, WithdrawalResult};
pub use tx::{
    EarlyUnbondedScripts, TimelockUnbondedScripts, WithdrawalPsbt,
    withdraw_early_unbonded_transaction, withdraw_timelock_unbonded_transaction,
};

// Exercised by the integration tests.
#[cfg(test)]
use strata_staking_script as _;
