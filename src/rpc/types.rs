// Wire-level types exchanged with the ledger RPC collaborator
//
// Every entity here is constructed fresh per request and discarded once the
// classified/decoded result is handed to the caller; nothing is persisted.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accounts::layouts::AccountData;

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Raw on-chain account as returned by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAccount {
    pub address: String,
    pub owner: String,
    pub lamports: u64,
    pub executable: bool,
    pub data: AccountData,
}

impl RawAccount {
    /// Build from the RPC's base64 data encoding, decoding the layout by owner
    pub fn from_base64_data(
        address: impl Into<String>,
        owner: impl Into<String>,
        lamports: u64,
        executable: bool,
        data_b64: &str,
    ) -> Self {
        let owner = owner.into();
        let bytes = BASE64.decode(data_b64).unwrap_or_default();
        let data = AccountData::from_bytes(&owner, &bytes);
        Self {
            address: address.into(),
            owner,
            lamports,
            executable,
            data,
        }
    }

    pub fn data_len(&self) -> usize {
        self.data.byte_len()
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Compiled instruction as carried in the transaction message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledInstruction {
    /// Index into the message account-key table
    pub program_id_index: u8,
    /// Indices into the message account-key table, execution-order significant
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    /// Decode instruction data from the RPC string form (base58, then base64)
    pub fn decode_data_str(encoded: &str) -> Vec<u8> {
        if let Ok(bytes) = bs58::decode(encoded).into_vec() {
            return bytes;
        }
        BASE64.decode(encoded).unwrap_or_default()
    }
}

/// Transaction message: account keys, role bit tables, compiled instructions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMessage {
    pub account_keys: Vec<String>,
    /// Per-key signer flags, aligned with `account_keys`
    pub signer_flags: Vec<bool>,
    /// Per-key writable flags, aligned with `account_keys`
    pub writable_flags: Vec<bool>,
    pub instructions: Vec<CompiledInstruction>,
}

impl TransactionMessage {
    /// Signer role as declared by the message; out-of-range defaults to false
    pub fn is_signer(&self, index: usize) -> bool {
        self.signer_flags.get(index).copied().unwrap_or(false)
    }

    /// Writable role as declared by the message; out-of-range defaults to false
    pub fn is_writable(&self, index: usize) -> bool {
        self.writable_flags.get(index).copied().unwrap_or(false)
    }
}

/// Inner instructions emitted during execution of one top-level instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerInstructions {
    /// Index of the owning top-level instruction
    pub outer_index: u8,
    pub instructions: Vec<CompiledInstruction>,
}

/// Pre/post token balance snapshot entry, tagged by account index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalanceEntry {
    pub account_index: usize,
    pub mint: String,
    pub owner: Option<String>,
    pub decimals: u8,
    /// Raw amount in base units
    pub raw_amount: u64,
}

impl TokenBalanceEntry {
    pub fn ui_amount(&self) -> f64 {
        (self.raw_amount as f64) / 10f64.powi(self.decimals as i32)
    }
}

/// Execution metadata attached to a confirmed transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub fee: u64,
    /// Opaque error payload; only its presence matters here
    pub err: Option<Value>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalanceEntry>,
    pub post_token_balances: Vec<TokenBalanceEntry>,
    pub inner_instructions: Vec<InnerInstructions>,
    pub log_messages: Vec<String>,
}

/// Raw confirmed transaction as returned by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub message: TransactionMessage,
    pub meta: TransactionMeta,
}

// =============================================================================
// VALIDATOR SET
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub vote_pubkey: String,
    pub node_pubkey: String,
    pub commission: u8,
    pub activated_stake: u64,
}

/// Live validator set split into current and delinquent entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorSet {
    pub current: Vec<ValidatorInfo>,
    pub delinquent: Vec<ValidatorInfo>,
}

impl ValidatorSet {
    /// Look up a vote account; the flag is true when it is delinquent
    pub fn find(&self, vote_pubkey: &str) -> Option<(&ValidatorInfo, bool)> {
        if let Some(info) = self.current.iter().find(|v| v.vote_pubkey == vote_pubkey) {
            return Some((info, false));
        }
        self.delinquent
            .iter()
            .find(|v| v.vote_pubkey == vote_pubkey)
            .map(|info| (info, true))
    }
}
