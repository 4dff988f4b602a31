use bitcoin::{Amount, Network};
use thiserror::Error;

/// Errors for assembling a withdrawal transaction.
///
/// Parameter failures are reported before the funding transaction is read;
/// no partial transaction is ever returned.
#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// Fee rate must be strictly positive.
    #[error("withdrawal fee rate must be greater than 0")]
    InvalidFeeRate,

    /// The funding transaction has no output at the requested index.
    #[error("invalid output index {index}: funding tx has {available} outputs")]
    InvalidOutputIndex {
        /// Index requested by the caller.
        index: u32,
        /// Number of outputs the funding transaction actually has.
        available: usize,
    },

    /// The destination address does not belong to the selected network.
    #[error("destination address is not valid for {0}")]
    AddressNetworkMismatch(Network),

    /// The spent leaf does not follow the timelock leaf layout, so the input
    /// sequence cannot be derived from it.
    #[error("spent leaf is not a timelock script")]
    MalformedTimelockLeaf,

    /// The funding output cannot cover the estimated fee.
    #[error("funding output of {value} cannot cover fee of {fee}")]
    InsufficientFunds {
        /// Value of the funding output being spent.
        value: Amount,
        /// Fee implied by the estimated size and the fee rate.
        fee: Amount,
    },

    /// PSBT assembly rejected the unsigned transaction.
    #[error("psbt: {0}")]
    Psbt(#[from] bitcoin::psbt::Error),
}

/// Result type alias for withdrawal construction.
pub type WithdrawalResult<T> = Result<T, WithdrawalError>;
