// In-memory ledger mock for tests
//
// Builder-style fixture: preload accounts, transactions, the validator set
// and the epoch, and mark addresses whose fetch should fail at the transport
// level. Shared by the module tests across the crate.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::types::{RawAccount, RawTransaction, ValidatorSet};
use super::LedgerRpc;
use crate::errors::FetchError;

#[derive(Default)]
pub struct MockLedgerRpc {
    accounts: HashMap<String, RawAccount>,
    transactions: HashMap<String, RawTransaction>,
    failing_addresses: HashSet<String>,
    validator_set: Option<ValidatorSet>,
    epoch: Option<u64>,
}

impl MockLedgerRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: RawAccount) -> Self {
        self.accounts.insert(account.address.clone(), account);
        self
    }

    pub fn with_transaction(mut self, tx: RawTransaction) -> Self {
        self.transactions.insert(tx.signature.clone(), tx);
        self
    }

    /// Make `get_account` fail at the transport level for this address
    pub fn with_failing_address(mut self, address: impl Into<String>) -> Self {
        self.failing_addresses.insert(address.into());
        self
    }

    pub fn with_validator_set(mut self, set: ValidatorSet) -> Self {
        self.validator_set = Some(set);
        self
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }
}

#[async_trait]
impl LedgerRpc for MockLedgerRpc {
    async fn get_account(&self, address: &str) -> Result<Option<RawAccount>, FetchError> {
        if self.failing_addresses.contains(address) {
            return Err(FetchError::Transport(format!(
                "simulated transport failure for {}",
                address
            )));
        }
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_transaction(&self, signature: &str) -> Result<RawTransaction, FetchError> {
        self.transactions
            .get(signature)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                kind: "transaction",
                id: signature.to_string(),
            })
    }

    async fn get_live_validator_set(&self) -> Result<ValidatorSet, FetchError> {
        self.validator_set
            .clone()
            .ok_or_else(|| FetchError::Transport("validator set unavailable".to_string()))
    }

    async fn get_epoch(&self) -> Result<u64, FetchError> {
        self.epoch
            .ok_or_else(|| FetchError::Transport("epoch unavailable".to_string()))
    }
}
