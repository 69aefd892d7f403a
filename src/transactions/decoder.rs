// Instruction decoder
//
// Resolves compiled index form into addresses, registry names and role flags,
// and hangs inner instructions off their owning top-level instruction. Total
// over its input: an index outside the key table marks the instruction
// malformed instead of failing the decode, so one bad instruction never hides
// the rest of the transaction.

use crate::registry;
use crate::rpc::{CompiledInstruction, InnerInstructions, TransactionMessage};

use super::types::{DecodedInstruction, InstructionAccount};

/// Decode all top-level instructions, preserving message order
pub fn decode_instructions(
    message: &TransactionMessage,
    inner: &[InnerInstructions],
) -> Vec<DecodedInstruction> {
    message
        .instructions
        .iter()
        .enumerate()
        .map(|(index, compiled)| {
            let mut decoded = decode_one(message, index, compiled);
            decoded.inner = inner
                .iter()
                .filter(|group| group.outer_index as usize == index)
                .flat_map(|group| group.instructions.iter())
                .enumerate()
                .map(|(inner_index, compiled)| decode_one(message, inner_index, compiled))
                .collect();
            decoded
        })
        .collect()
}

/// Decode a single compiled instruction against the message key table
///
/// Role flags come from the message's signer/writable tables, not from
/// account position within the instruction.
fn decode_one(
    message: &TransactionMessage,
    index: usize,
    compiled: &CompiledInstruction,
) -> DecodedInstruction {
    let mut malformed = false;

    let program_id = match message.account_keys.get(compiled.program_id_index as usize) {
        Some(key) => key.clone(),
        None => {
            malformed = true;
            String::new()
        }
    };

    let mut accounts = Vec::with_capacity(compiled.accounts.len());
    for &account_index in &compiled.accounts {
        let account_index = account_index as usize;
        match message.account_keys.get(account_index) {
            Some(key) => accounts.push(InstructionAccount {
                pubkey: key.clone(),
                is_signer: message.is_signer(account_index),
                is_writable: message.is_writable(account_index),
            }),
            None => malformed = true,
        }
    }
    if malformed {
        // Partial resolution would shift positional argument slots.
        accounts.clear();
    }

    DecodedInstruction {
        index,
        program_name: registry::name_of(&program_id).to_string(),
        program_id,
        accounts,
        data: compiled.data.clone(),
        inner: Vec::new(),
        malformed,
    }
}

// =============================================================================
// TESTS
// =============================================================================
