use bitcoin::address::NetworkUnchecked;
use bitcoin::opcodes::all::{OP_CHECKSIG, OP_CSV, OP_PUSHNUM_1, OP_PUSHNUM_16};
use bitcoin::psbt::Psbt;
use bitcoin::script::Instruction;
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Witness, absolute,
};

use crate::error::{WithdrawalError, WithdrawalResult};
use crate::fee::estimate_withdrawal_vsize;

/// Leaves required to withdraw through the unbonding timelock path.
///
/// The unbonding timelock leaf is the one being spent; the slashing leaf is
/// carried only because it is committed next to it and therefore sizes the
/// control block.
#[derive(Debug, Clone, Copy)]
pub struct EarlyUnbondedScripts<'a> {
    /// Leaf executed by the withdrawal.
    pub unbonding_timelock_script: &'a Script,
    /// Sibling leaf committed in the same output.
    pub slashing_script: &'a Script,
}

/// Leaves required to withdraw through the original staking timelock path.
#[derive(Debug, Clone, Copy)]
pub struct TimelockUnbondedScripts<'a> {
    /// Leaf executed by the withdrawal.
    pub timelock_script: &'a Script,
    /// Sibling leaf committed in the same output.
    pub slashing_script: &'a Script,
    /// Sibling leaf committed in the same output.
    pub unbonding_script: &'a Script,
}

/// Unsigned withdrawal transaction together with its fee accounting.
///
/// The funding output value always equals the single output value plus
/// `fee`, exactly.
#[derive(Debug, Clone)]
pub struct WithdrawalPsbt {
    /// Unsigned psbt whose single input carries the funding output as its
    /// witness utxo, ready for witness attachment.
    pub psbt: Psbt,
    /// Fee in satoshis implied by the estimated size and the fee rate.
    pub fee: Amount,
}

/// Builds the withdrawal spending the unbonding timelock leaf, i.e. the
/// timelock that follows an early unbonding.
///
/// `fee_rate` is in satoshis per virtual byte and must be positive.
/// `output_index` selects the funding output being spent; pass `0` for the
/// common single-output funding transaction.
pub fn withdraw_early_unbonded_transaction(
    scripts: &EarlyUnbondedScripts<'_>,
    funding_tx: &Transaction,
    destination: &Address<NetworkUnchecked>,
    network: Network,
    fee_rate: u64,
    output_index: u32,
) -> WithdrawalResult<WithdrawalPsbt> {
    let leaves = [scripts.unbonding_timelock_script, scripts.slashing_script];
    build_withdrawal_tx(
        scripts.unbonding_timelock_script,
        leaves.len(),
        funding_tx,
        destination,
        network,
        fee_rate,
        output_index,
    )
}

/// Builds the withdrawal spending the original staking timelock leaf.
///
/// `fee_rate` is in satoshis per virtual byte and must be positive.
/// `output_index` selects the funding output being spent; pass `0` for the
/// common single-output funding transaction.
pub fn withdraw_timelock_unbonded_transaction(
    scripts: &TimelockUnbondedScripts<'_>,
    funding_tx: &Transaction,
    destination: &Address<NetworkUnchecked>,
    network: Network,
    fee_rate: u64,
    output_index: u32,
) -> WithdrawalResult<WithdrawalPsbt> {
    let leaves = [
        scripts.timelock_script,
        scripts.slashing_script,
        scripts.unbonding_script,
    ];
    build_withdrawal_tx(
        scripts.timelock_script,
        leaves.len(),
        funding_tx,
        destination,
        network,
        fee_rate,
        output_index,
    )
}

/// Shared withdrawal assembly, parameterized by the leaf being spent and the
/// number of leaves committed next to it.
fn build_withdrawal_tx(
    spend_leaf: &Script,
    leaf_count: usize,
    funding_tx: &Transaction,
    destination: &Address<NetworkUnchecked>,
    network: Network,
    fee_rate: u64,
    output_index: u32,
) -> WithdrawalResult<WithdrawalPsbt> {
    if fee_rate == 0 {
        return Err(WithdrawalError::InvalidFeeRate);
    }
    if !destination.is_valid_for_network(network) {
        return Err(WithdrawalError::AddressNetworkMismatch(network));
    }
    let destination = destination.clone().assume_checked();

    let funding_out = funding_tx.output.get(output_index as usize).ok_or(
        WithdrawalError::InvalidOutputIndex {
            index: output_index,
            available: funding_tx.output.len(),
        },
    )?;

    // The spent leaf is a CSV leaf; its locktime must reappear in the input
    // sequence or the spend would never be relayed.
    let timelock = extract_timelock(spend_leaf)?;

    let dest_script = destination.script_pubkey();
    let vsize = estimate_withdrawal_vsize(spend_leaf, leaf_count, dest_script.len());
    let fee = Amount::from_sat(vsize * fee_rate);

    let value = funding_out
        .value
        .checked_sub(fee)
        .filter(|value| *value > Amount::ZERO)
        .ok_or(WithdrawalError::InsufficientFunds {
            value: funding_out.value,
            fee,
        })?;

    let tx = Transaction {
        version: Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: funding_tx.compute_txid(),
                vout: output_index,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::from_height(timelock),
            witness: Witness::default(),
        }],
        output: vec![TxOut {
            value,
            script_pubkey: dest_script,
        }],
    };

    let mut psbt = Psbt::from_unsigned_tx(tx)?;
    psbt.inputs[0].witness_utxo = Some(funding_out.clone());

    Ok(WithdrawalPsbt { psbt, fee })
}

/// Reads the relative locktime out of a timelock leaf.
///
/// The leaf layout is `<key> OP_CHECKSIG <blocks> OP_CSV OP_DROP`; values
/// 1 through 16 are pushed as OP_PUSHNUM opcodes, larger values as minimal
/// little endian script numbers.
fn extract_timelock(leaf: &Script) -> WithdrawalResult<u16> {
    let mut instructions = leaf.instructions();

    match instructions.next() {
        Some(Ok(Instruction::PushBytes(key))) if key.len() == 32 => {}
        _ => return Err(WithdrawalError::MalformedTimelockLeaf),
    }
    match instructions.next() {
        Some(Ok(Instruction::Op(op))) if op == OP_CHECKSIG => {}
        _ => return Err(WithdrawalError::MalformedTimelockLeaf),
    }
    let blocks = match instructions.next() {
        Some(Ok(instruction)) => {
            decode_blocks(&instruction).ok_or(WithdrawalError::MalformedTimelockLeaf)?
        }
        _ => return Err(WithdrawalError::MalformedTimelockLeaf),
    };
    match instructions.next() {
        Some(Ok(Instruction::Op(op))) if op == OP_CSV => {}
        _ => return Err(WithdrawalError::MalformedTimelockLeaf),
    }

    if blocks == 0 || blocks > u32::from(u16::MAX) {
        return Err(WithdrawalError::MalformedTimelockLeaf);
    }
    Ok(blocks as u16)
}

fn decode_blocks(instruction: &Instruction<'_>) -> Option<u32> {
    match instruction {
        Instruction::Op(op) => {
            let code = op.to_u8();
            let base = OP_PUSHNUM_1.to_u8();
            if (base..=OP_PUSHNUM_16.to_u8()).contains(&code) {
                Some(u32::from(code - base) + 1)
            } else {
                None
            }
        }
        Instruction::PushBytes(push) => {
            let bytes = push.as_bytes();
            if bytes.is_empty() || bytes.len() > 3 {
                return None;
            }
            // minimal positive script number, little endian
            if bytes[bytes.len() - 1] & 0x80 != 0 {
                return None;
            }
            let mut blocks = 0u32;
            for (i, byte) in bytes.iter().enumerate() {
                blocks |= u32::from(*byte) << (8 * i);
            }
            Some(blocks)
        }
    }
}
