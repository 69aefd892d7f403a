// Ledger RPC collaborator boundary
//
// The RPC client itself lives outside this crate; the core only depends on
// this trait. Implementations are expected to return `Ok(None)` from
// `get_account` for addresses that simply do not exist, reserving `Err` for
// transport-level failures.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::errors::FetchError;

pub mod testing;
pub mod types;

pub use types::{
    CompiledInstruction, InnerInstructions, RawAccount, RawTransaction, TokenBalanceEntry,
    TransactionMessage, TransactionMeta, ValidatorInfo, ValidatorSet,
};

/// Read-side collaborator interface to the ledger
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch a single account; `Ok(None)` when the account does not exist
    async fn get_account(&self, address: &str) -> Result<Option<RawAccount>, FetchError>;

    /// Fetch a confirmed transaction by signature
    async fn get_transaction(&self, signature: &str) -> Result<RawTransaction, FetchError>;

    /// Fetch the live validator set (current + delinquent)
    async fn get_live_validator_set(&self) -> Result<ValidatorSet, FetchError>;

    /// Fetch the current ledger epoch
    async fn get_epoch(&self) -> Result<u64, FetchError>;
}

/// Deterministic program-derived-address derivation
///
/// Pure function; `None` only when `program_id` is not a valid address.
pub fn derive_program_address(seeds: &[&[u8]], program_id: &str) -> Option<String> {
    let program = Pubkey::from_str(program_id).ok()?;
    let (address, _bump) = Pubkey::find_program_address(seeds, &program);
    Some(address.to_string())
}

/// Validate an address string as base58-encoded 32 bytes
pub fn is_valid_address(address: &str) -> bool {
    Pubkey::from_str(address).is_ok()
}
