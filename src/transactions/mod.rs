// Transaction decoding pipeline
//
// Fetch, decode the instruction tree, diff balances, classify, assemble.
// Instruction decode and classification are total; the only structural
// failure is a balance snapshot that disagrees with the key table.

use crate::errors::{FetchError, SnapshotError};
use crate::logger::{self, LogTag};
use crate::registry;
use crate::rpc::{LedgerRpc, RawTransaction};

pub mod balance;
pub mod classify;
pub mod decoder;
pub mod types;

pub use types::{
    BalanceChange, DecodedInstruction, InstructionAccount, ProgramInfo, SwapInfo, SwapLeg,
    TokenBalanceChange, TransactionDetail, TransactionStatus, TransactionType,
};

/// Fetch a transaction by signature and decode it fully
pub async fn fetch_transaction_detail(
    rpc: &dyn LedgerRpc,
    signature: &str,
) -> Result<TransactionDetail, FetchError> {
    let raw = rpc.get_transaction(signature).await?;
    build_transaction_detail(&raw).map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

/// Assemble the full detail view from a raw confirmed transaction
pub fn build_transaction_detail(raw: &RawTransaction) -> Result<TransactionDetail, SnapshotError> {
    let instructions = decoder::decode_instructions(&raw.message, &raw.meta.inner_instructions);
    let balance_changes = balance::native_balance_changes(&raw.message, &raw.meta)?;
    let token_changes = balance::token_balance_changes(&raw.message, &raw.meta);
    let class = classify::classify_transaction(&instructions, &token_changes);

    let mut programs: Vec<ProgramInfo> = Vec::new();
    for instruction in &instructions {
        if instruction.program_id.is_empty()
            || programs.iter().any(|p| p.program_id == instruction.program_id)
        {
            continue;
        }
        programs.push(ProgramInfo {
            program_id: instruction.program_id.clone(),
            name: registry::name_of(&instruction.program_id).to_string(),
        });
    }

    let signers: Vec<String> = raw
        .message
        .account_keys
        .iter()
        .enumerate()
        .filter(|(index, _)| raw.message.is_signer(*index))
        .map(|(_, key)| key.clone())
        .collect();

    let status = if raw.meta.err.is_some() {
        TransactionStatus::Failed
    } else {
        TransactionStatus::Success
    };

    logger::debug(
        LogTag::Transactions,
        "DECODED",
        &format!(
            "{} type={:?} instructions={} token_changes={}",
            raw.signature,
            class.transaction_type,
            instructions.len(),
            token_changes.len()
        ),
    );

    Ok(TransactionDetail {
        signature: raw.signature.clone(),
        slot: raw.slot,
        block_time: raw.block_time,
        status,
        fee: raw.meta.fee,
        fee_payer: raw.message.account_keys.first().cloned().unwrap_or_default(),
        signers,
        programs,
        instructions,
        balance_changes,
        token_changes,
        transaction_type: class.transaction_type,
        swap: class.swap,
        log_messages: raw.meta.log_messages.clone(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
