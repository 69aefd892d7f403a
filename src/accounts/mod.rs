// Account classification
//
// Entry point for turning an address into a typed, confidence-scored
// classification. Fetch, run the rule cascade, attach the route path. Batch
// classification fans out in bounded chunks and drops failed addresses
// rather than failing the whole batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::cache::EpochCache;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};
use crate::router;
use crate::rpc::{self, LedgerRpc, RawAccount};
use crate::throttle::ChunkThrottle;

pub mod layouts;
pub mod metadata;
mod rules;

pub use layouts::{AccountData, MintAccount, SplTokenAccount, StakeAccount, VoteAccount};
pub use metadata::{MetadataConfig, MetadataService, TokenMetadata, UriFetcher};

use rules::RuleContext;

/// Account taxonomy produced by the rule cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    UserWallet,
    TokenMint,
    TokenAccount,
    StakeAccount,
    ValidatorIdentity,
    ValidatorVote,
    ProgramAccount,
    ProgramData,
    NftMint,
    MultisigAccount,
    Unknown,
}

/// Classification result for one address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedAccount {
    pub address: String,
    pub account_type: AccountType,
    /// Evidence strength in [0.0, 1.0]; drives the redirect decision
    pub confidence: f64,
    /// Type-specific page path for this account
    pub route_path: String,
    /// Type-specific evidence attached by the matching rule
    pub metadata: HashMap<String, Value>,
}

/// Priority-cascade account classifier
pub struct AccountClassifier {
    epoch_cache: EpochCache,
    throttle: ChunkThrottle,
    metadata: MetadataService,
}

impl AccountClassifier {
    pub fn new(epoch_cache: EpochCache, throttle: ChunkThrottle, metadata: MetadataService) -> Self {
        Self {
            epoch_cache,
            throttle,
            metadata,
        }
    }

    /// Classify a single address
    ///
    /// The primary account fetch is the only hard failure; secondary lookups
    /// (validator set, epoch, metadata PDA) degrade the result instead.
    /// Invalid addresses and missing accounts classify as `unknown` with
    /// near-zero confidence.
    pub async fn classify_address(
        &self,
        rpc: &dyn LedgerRpc,
        address: &str,
    ) -> Result<ClassifiedAccount, FetchError> {
        if !rpc::is_valid_address(address) {
            return Ok(unresolved(address, 0.0, "invalid_address"));
        }

        let raw = match rpc.get_account(address).await? {
            Some(raw) => raw,
            None => return Ok(unresolved(address, 0.1, "not_found")),
        };

        Ok(self.classify_account(rpc, &raw).await)
    }

    /// Classify an already-fetched account
    pub async fn classify_account(
        &self,
        rpc: &dyn LedgerRpc,
        raw: &RawAccount,
    ) -> ClassifiedAccount {
        let ctx = RuleContext {
            rpc,
            epoch_cache: &self.epoch_cache,
            metadata: &self.metadata,
        };
        let classification = rules::evaluate(raw, &ctx).await;

        logger::debug(
            LogTag::Accounts,
            "CLASSIFIED",
            &format!(
                "{} -> {:?} ({:.2})",
                raw.address, classification.account_type, classification.confidence
            ),
        );

        ClassifiedAccount {
            route_path: router::route_path(&classification.account_type, &raw.address),
            address: raw.address.clone(),
            account_type: classification.account_type,
            confidence: classification.confidence,
            metadata: classification.metadata,
        }
    }

    /// Classify many addresses in bounded concurrent chunks
    ///
    /// Failed addresses are logged and dropped; the map holds one entry per
    /// address that classified, keyed by address.
    pub async fn classify_many(
        &self,
        rpc: &dyn LedgerRpc,
        addresses: &[String],
    ) -> HashMap<String, ClassifiedAccount> {
        let mut results = HashMap::new();
        let chunks = self.throttle.chunks(addresses.to_vec());
        let chunk_count = chunks.len();

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let tasks: Vec<_> = chunk
                .iter()
                .map(|address| async {
                    let classified = self.classify_address(rpc, address).await;
                    (address.clone(), classified)
                })
                .collect();

            for (address, classified) in futures::future::join_all(tasks).await {
                match classified {
                    Ok(classified) => {
                        results.insert(address, classified);
                    }
                    Err(e) => {
                        logger::warn(
                            LogTag::Batch,
                            "CLASSIFY_FAILED",
                            &format!("address={} err={}", address, e),
                        );
                    }
                }
            }

            self.throttle.pace(chunk_index, chunk_count).await;
        }

        logger::debug(
            LogTag::Batch,
            "CLASSIFY_BATCH",
            &format!("classified {}/{} addresses", results.len(), addresses.len()),
        );
        results
    }
}

impl Default for AccountClassifier {
    fn default() -> Self {
        Self::new(
            EpochCache::default(),
            ChunkThrottle::default(),
            MetadataService::default(),
        )
    }
}

fn unresolved(address: &str, confidence: f64, reason: &str) -> ClassifiedAccount {
    let mut metadata = HashMap::new();
    metadata.insert("reason".to_string(), Value::String(reason.to_string()));
    ClassifiedAccount {
        address: address.to_string(),
        account_type: AccountType::Unknown,
        confidence,
        route_path: router::route_path(&AccountType::Unknown, address),
        metadata,
    }
}

// =============================================================================
// TESTS
// =============================================================================
