// Decoded transaction model handed to the rendering layer
//
// Everything here is derived from one `RawTransaction`; amounts carry both
// raw base units and ui-scaled values so the caller never re-derives either.

use serde::{Deserialize, Serialize};

// =============================================================================
// INSTRUCTIONS
// =============================================================================

/// Account touched by an instruction, with its message-declared roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionAccount {
    pub pubkey: String,
    /// Signer role as declared by the message, independent of position
    pub is_signer: bool,
    pub is_writable: bool,
}

/// One decoded instruction with its nested inner instructions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedInstruction {
    /// Position within the owning list (top-level or inner group)
    pub index: usize,
    pub program_id: String,
    /// Display name from the program registry; the sentinel for unknown ids
    pub program_name: String,
    /// Resolved accounts, execution-order significant
    pub accounts: Vec<InstructionAccount>,
    pub data: Vec<u8>,
    /// Inner instructions emitted while this instruction executed
    pub inner: Vec<DecodedInstruction>,
    /// Set when an index in the compiled form fell outside the key table;
    /// the accounts list is emptied since partial resolution would misalign
    /// positional argument slots
    pub malformed: bool,
}

// =============================================================================
// BALANCE CHANGES
// =============================================================================

/// Native balance movement for one account in the transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChange {
    pub account_index: usize,
    pub address: String,
    pub pre_lamports: u64,
    pub post_lamports: u64,
    /// post - pre; negative for debits
    pub delta_lamports: i128,
    pub is_signer: bool,
    pub is_writable: bool,
    /// Account index 0 is the fee payer by message layout
    pub is_fee_payer: bool,
}

/// Token balance movement for one (account, mint) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalanceChange {
    pub account_index: usize,
    /// Token-account address when resolvable from the key table
    pub address: Option<String>,
    pub mint: String,
    pub owner: Option<String>,
    pub decimals: u8,
    pub pre_raw: u64,
    pub post_raw: u64,
    /// post - pre in base units; negative for outflows
    pub delta_raw: i128,
}

impl TokenBalanceChange {
    pub fn pre_ui(&self) -> f64 {
        (self.pre_raw as f64) / 10f64.powi(self.decimals as i32)
    }

    pub fn post_ui(&self) -> f64 {
        (self.post_raw as f64) / 10f64.powi(self.decimals as i32)
    }

    /// Delta scaled by the mint's decimals
    pub fn ui_delta(&self) -> f64 {
        (self.delta_raw as f64) / 10f64.powi(self.decimals as i32)
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Transaction taxonomy derived from instructions and balance movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Swap,
    Transfer,
    Mint,
    Burn,
    Create,
    Unknown,
}

/// One side of a detected swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapLeg {
    pub mint: String,
    /// Magnitude in ui units, always non-negative
    pub amount: f64,
    pub decimals: u8,
}

/// Detected swap: the mint sold and the mint bought, with the DEX that ran it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapInfo {
    /// Platform label from the registry ("jupiter", "raydium", ...)
    pub dex: String,
    /// Program id of the matched DEX instruction
    pub program: String,
    pub program_name: String,
    pub from_token: SwapLeg,
    pub to_token: SwapLeg,
}

// =============================================================================
// TRANSACTION DETAIL
// =============================================================================

/// Program invoked by a transaction, with its registry display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub program_id: String,
    pub name: String,
}

/// Execution status; the error payload stays opaque upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// Fully decoded transaction, ready for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub status: TransactionStatus,
    pub fee: u64,
    pub fee_payer: String,
    pub signers: Vec<String>,
    /// Distinct programs invoked at the top level, first-seen order
    pub programs: Vec<ProgramInfo>,
    pub instructions: Vec<DecodedInstruction>,
    pub balance_changes: Vec<BalanceChange>,
    pub token_changes: Vec<TokenBalanceChange>,
    pub transaction_type: TransactionType,
    pub swap: Option<SwapInfo>,
    pub log_messages: Vec<String>,
}
