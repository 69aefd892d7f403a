// Transaction classification
//
// Heuristic taxonomy over the decoded instruction tree and token balance
// movements. Swap detection needs both signals to agree: a DEX instruction
// anywhere in the tree AND at least two token flows with a sold and a bought
// side. Instruction opcodes settle the remaining categories; the result is a
// best-effort reading, not a ledger-level proof of intent.

use crate::registry::{self, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID};

use super::types::{DecodedInstruction, SwapInfo, SwapLeg, TokenBalanceChange, TransactionType};

// SPL token opcodes (first data byte)
const TOKEN_OP_TRANSFER: u8 = 3;
const TOKEN_OP_MINT_TO: u8 = 7;
const TOKEN_OP_BURN: u8 = 8;
const TOKEN_OP_TRANSFER_CHECKED: u8 = 12;
const TOKEN_OP_MINT_TO_CHECKED: u8 = 14;
const TOKEN_OP_BURN_CHECKED: u8 = 15;

// System program opcodes (u32 le tag)
const SYSTEM_OP_CREATE_ACCOUNT: u32 = 0;
const SYSTEM_OP_TRANSFER: u32 = 2;

/// Classification outcome: the taxonomy bucket plus swap legs when detected
#[derive(Debug, Clone)]
pub struct TransactionClass {
    pub transaction_type: TransactionType,
    pub swap: Option<SwapInfo>,
}

/// Classify a decoded transaction
pub fn classify_transaction(
    instructions: &[DecodedInstruction],
    token_changes: &[TokenBalanceChange],
) -> TransactionClass {
    if let Some(swap) = detect_swap(instructions, token_changes) {
        return TransactionClass {
            transaction_type: TransactionType::Swap,
            swap: Some(swap),
        };
    }

    let transaction_type = walk(instructions)
        .filter_map(instruction_type)
        .min_by_key(|t| type_priority(*t))
        .unwrap_or(TransactionType::Unknown);

    TransactionClass {
        transaction_type,
        swap: None,
    }
}

// =============================================================================
// SWAP DETECTION
// =============================================================================

/// A swap needs a DEX instruction and token flows in both directions
fn detect_swap(
    instructions: &[DecodedInstruction],
    token_changes: &[TokenBalanceChange],
) -> Option<SwapInfo> {
    let dex_instruction = walk(instructions).find(is_dex_instruction)?;
    if token_changes.len() < 2 {
        return None;
    }

    // Net flow per mint in base units with the mint's decimals, first-seen
    // order for deterministic tie-breaks.
    let mut mints: Vec<(String, u8, i128)> = Vec::new();
    for change in token_changes {
        match mints.iter_mut().find(|(mint, _, _)| *mint == change.mint) {
            Some((_, _, total)) => *total += change.delta_raw,
            None => mints.push((change.mint.clone(), change.decimals, change.delta_raw)),
        }
    }

    let mut from: Option<&(String, u8, i128)> = None;
    let mut to: Option<&(String, u8, i128)> = None;
    for entry in &mints {
        let total = entry.2;
        if total < 0 && from.map_or(true, |best| total < best.2) {
            from = Some(entry);
        }
        if total > 0 && to.map_or(true, |best| total > best.2) {
            to = Some(entry);
        }
    }

    let from = from?;
    let to = to?;
    Some(SwapInfo {
        dex: registry::dex_label(&dex_instruction.program_id)
            .unwrap_or("unknown")
            .to_string(),
        program: dex_instruction.program_id.clone(),
        program_name: dex_instruction.program_name.clone(),
        from_token: SwapLeg {
            mint: from.0.clone(),
            amount: ui_amount(-from.2, from.1),
            decimals: from.1,
        },
        to_token: SwapLeg {
            mint: to.0.clone(),
            amount: ui_amount(to.2, to.1),
            decimals: to.1,
        },
    })
}

fn ui_amount(raw: i128, decimals: u8) -> f64 {
    (raw as f64) / 10f64.powi(decimals as i32)
}

/// Whether the instruction targets a known DEX or aggregator
fn is_dex_instruction(instruction: &&DecodedInstruction) -> bool {
    registry::is_dex_program(&instruction.program_id)
        || registry::name_is_dex(&instruction.program_name)
}

// =============================================================================
// OPCODE CLASSIFICATION
// =============================================================================

/// Lower value wins when several instruction types appear in one transaction
fn type_priority(t: TransactionType) -> u8 {
    match t {
        TransactionType::Swap => 0,
        TransactionType::Mint => 1,
        TransactionType::Burn => 2,
        TransactionType::Transfer => 3,
        TransactionType::Create => 4,
        TransactionType::Unknown => 5,
    }
}

fn instruction_type(instruction: &DecodedInstruction) -> Option<TransactionType> {
    if registry::is_token_program(&instruction.program_id) {
        // Opcode refines to mint/burn; anything else a token program does
        // reads as a transfer-class event.
        return match instruction.data.first() {
            Some(&op) if op == TOKEN_OP_MINT_TO || op == TOKEN_OP_MINT_TO_CHECKED => {
                Some(TransactionType::Mint)
            }
            Some(&op) if op == TOKEN_OP_BURN || op == TOKEN_OP_BURN_CHECKED => {
                Some(TransactionType::Burn)
            }
            Some(&op) if op == TOKEN_OP_TRANSFER || op == TOKEN_OP_TRANSFER_CHECKED => {
                Some(TransactionType::Transfer)
            }
            _ => Some(TransactionType::Transfer),
        };
    }

    if instruction.program_id == SYSTEM_PROGRAM_ID {
        let tag = u32::from_le_bytes(instruction.data.get(0..4)?.try_into().ok()?);
        return match tag {
            SYSTEM_OP_TRANSFER => Some(TransactionType::Transfer),
            SYSTEM_OP_CREATE_ACCOUNT => Some(TransactionType::Create),
            _ => None,
        };
    }

    if instruction.program_id == ASSOCIATED_TOKEN_PROGRAM_ID {
        return Some(TransactionType::Create);
    }

    None
}

/// Depth-first walk over top-level instructions and their inner instructions
fn walk(instructions: &[DecodedInstruction]) -> impl Iterator<Item = &DecodedInstruction> {
    instructions
        .iter()
        .flat_map(|ix| std::iter::once(ix).chain(ix.inner.iter()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        COMPUTE_BUDGET_PROGRAM_ID, JUPITER_V6_PROGRAM_ID, RAYDIUM_AMM_PROGRAM_ID,
        TOKEN_PROGRAM_ID,
    };

    fn instruction(program_id: &str, data: Vec<u8>) -> DecodedInstruction {
        DecodedInstruction {
            index: 0,
            program_id: program_id.to_string(),
            program_name: registry::name_of(program_id).to_string(),
            accounts: vec![],
            data,
            inner: vec![],
            malformed: false,
        }
    }

    fn token_change(mint: &str, decimals: u8, delta_raw: i128) -> TokenBalanceChange {
        TokenBalanceChange {
            account_index: 1,
            address: None,
            mint: mint.to_string(),
            owner: None,
            decimals,
            pre_raw: 0,
            post_raw: 0,
            delta_raw,
        }
    }

    #[test]
    fn dex_instruction_with_opposite_flows_is_a_swap() {
        let instructions = vec![
            instruction(COMPUTE_BUDGET_PROGRAM_ID, vec![2, 0, 0, 0]),
            instruction(JUPITER_V6_PROGRAM_ID, vec![9]),
        ];
        let changes = vec![
            token_change("mintA", 6, -100_000_000),
            token_change("mintB", 9, 50_000_000_000),
        ];

        let class = classify_transaction(&instructions, &changes);
        assert_eq!(class.transaction_type, TransactionType::Swap);
        let swap = class.swap.unwrap();
        assert_eq!(swap.dex, "jupiter");
        assert_eq!(swap.program, JUPITER_V6_PROGRAM_ID);
        assert_eq!(swap.program_name, "Jupiter Aggregator v6");
        assert_eq!(swap.from_token.mint, "mintA");
        assert_eq!(swap.from_token.amount, 100.0);
        assert_eq!(swap.from_token.decimals, 6);
        assert_eq!(swap.to_token.mint, "mintB");
        assert_eq!(swap.to_token.amount, 50.0);
    }

    #[test]
    fn dex_in_inner_instructions_still_counts() {
        let mut outer = instruction("AggWrapper11111111111111111111111111111111", vec![1]);
        outer.inner = vec![instruction(RAYDIUM_AMM_PROGRAM_ID, vec![9])];
        let changes = vec![
            token_change("mintA", 6, -1_000_000),
            token_change("mintB", 6, 2_000_000),
        ];

        let class = classify_transaction(&[outer], &changes);
        assert_eq!(class.transaction_type, TransactionType::Swap);
        assert_eq!(class.swap.unwrap().dex, "raydium");
    }

    #[test]
    fn dex_instruction_without_two_way_flow_is_not_a_swap() {
        // A one-sided flow (deposit, airdrop claim) must not read as a swap.
        let instructions = vec![instruction(JUPITER_V6_PROGRAM_ID, vec![9])];
        let changes = vec![token_change("mintA", 6, 1_000_000)];

        let class = classify_transaction(&instructions, &changes);
        assert_ne!(class.transaction_type, TransactionType::Swap);
        assert!(class.swap.is_none());
    }

    #[test]
    fn opposite_flows_without_dex_are_not_a_swap() {
        let instructions = vec![instruction(TOKEN_PROGRAM_ID, vec![3, 0, 0, 0, 0, 0, 0, 0, 0])];
        let changes = vec![
            token_change("mintA", 6, -5),
            token_change("mintB", 6, 5),
        ];

        let class = classify_transaction(&instructions, &changes);
        assert_eq!(class.transaction_type, TransactionType::Transfer);
    }

    #[test]
    fn largest_flows_pick_the_swap_legs() {
        let instructions = vec![instruction(JUPITER_V6_PROGRAM_ID, vec![9])];
        // Routing dust on mintC must not displace the real legs.
        let changes = vec![
            token_change("mintA", 6, -100_000_000),
            token_change("mintC", 6, -1_000),
            token_change("mintB", 6, 99_000_000),
        ];

        let swap = classify_transaction(&instructions, &changes).swap.unwrap();
        assert_eq!(swap.from_token.mint, "mintA");
        assert_eq!(swap.to_token.mint, "mintB");
    }

    #[test]
    fn token_opcodes_map_to_mint_burn_transfer() {
        let mint = classify_transaction(
            &[instruction(TOKEN_PROGRAM_ID, vec![7, 0, 0, 0, 0, 0, 0, 0, 0])],
            &[],
        );
        assert_eq!(mint.transaction_type, TransactionType::Mint);

        let burn = classify_transaction(
            &[instruction(TOKEN_PROGRAM_ID, vec![15, 0, 0, 0, 0, 0, 0, 0, 0, 6])],
            &[],
        );
        assert_eq!(burn.transaction_type, TransactionType::Burn);

        let transfer = classify_transaction(
            &[instruction(TOKEN_PROGRAM_ID, vec![12, 0, 0, 0, 0, 0, 0, 0, 0, 6])],
            &[],
        );
        assert_eq!(transfer.transaction_type, TransactionType::Transfer);
    }

    #[test]
    fn unrefined_token_instruction_defaults_to_transfer() {
        // InitializeAccount (opcode 1) has no dedicated bucket.
        let class = classify_transaction(&[instruction(TOKEN_PROGRAM_ID, vec![1])], &[]);
        assert_eq!(class.transaction_type, TransactionType::Transfer);
    }

    #[test]
    fn system_create_and_transfer_opcodes() {
        let create = classify_transaction(
            &[instruction(SYSTEM_PROGRAM_ID, vec![0, 0, 0, 0])],
            &[],
        );
        assert_eq!(create.transaction_type, TransactionType::Create);

        let transfer = classify_transaction(
            &[instruction(SYSTEM_PROGRAM_ID, vec![2, 0, 0, 0, 100, 0, 0, 0, 0, 0, 0, 0])],
            &[],
        );
        assert_eq!(transfer.transaction_type, TransactionType::Transfer);
    }

    #[test]
    fn mint_outranks_the_ata_create_that_precedes_it() {
        let instructions = vec![
            instruction(ASSOCIATED_TOKEN_PROGRAM_ID, vec![]),
            instruction(TOKEN_PROGRAM_ID, vec![7, 0, 0, 0, 0, 0, 0, 0, 0]),
        ];
        let class = classify_transaction(&instructions, &[]);
        assert_eq!(class.transaction_type, TransactionType::Mint);
    }

    #[test]
    fn unrecognized_instructions_classify_as_unknown() {
        let instructions = vec![instruction(COMPUTE_BUDGET_PROGRAM_ID, vec![2, 0, 0, 0])];
        let class = classify_transaction(&instructions, &[]);
        assert_eq!(class.transaction_type, TransactionType::Unknown);
        assert!(class.swap.is_none());
    }
}
