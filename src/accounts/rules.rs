// Account classification rule cascade
//
// Priority-ordered rules, first match wins. Each rule is a standalone
// function over the raw account (plus collaborators for the two rules that
// need secondary lookups), so every rule stays independently testable.
// Confidence encodes evidence strength: on-chain-verified signals score
// strictly above data-size-only heuristics.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use super::layouts::AccountData;
use super::metadata::MetadataService;
use super::AccountType;
use crate::cache::EpochCache;
use crate::logger::{self, LogTag};
use crate::registry::{
    is_multisig_program, BPF_LOADER_UPGRADEABLE_ID, STAKE_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    VOTE_PROGRAM_ID,
};
use crate::rpc::{LedgerRpc, RawAccount};

// Confidence ladder (spec'd per signal strength)
const CONF_PROGRAM: f64 = 0.9;
const CONF_PROGRAM_UPGRADEABLE: f64 = 0.95;
const CONF_WALLET: f64 = 0.8;
const CONF_WALLET_FUNDED: f64 = 0.9;
const CONF_STAKE: f64 = 0.95;
const CONF_VOTE_VERIFIED: f64 = 0.98;
const CONF_VOTE_IDENTITY: f64 = 0.85;
const CONF_VOTE_DEGRADED: f64 = 0.7;
const CONF_NFT: f64 = 0.9;
const CONF_NFT_WITH_METADATA: f64 = 0.98;
const CONF_MINT: f64 = 0.95;
const CONF_TOKEN_ACCOUNT: f64 = 0.9;
const CONF_MULTISIG: f64 = 0.8;
const CONF_FALLBACK_WALLET: f64 = 0.3;
const CONF_FALLBACK_PROGRAM_DATA: f64 = 0.4;
const CONF_FALLBACK_UNKNOWN: f64 = 0.2;

const LARGE_DATA_THRESHOLD: usize = 10_000;

/// Result of a single rule: type + confidence + attached evidence
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    pub account_type: AccountType,
    pub confidence: f64,
    pub metadata: HashMap<String, Value>,
}

impl Classification {
    fn new(account_type: AccountType, confidence: f64) -> Self {
        Self {
            account_type,
            confidence,
            metadata: HashMap::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Collaborators available to rules that need secondary lookups
pub(crate) struct RuleContext<'a> {
    pub rpc: &'a dyn LedgerRpc,
    pub epoch_cache: &'a EpochCache,
    pub metadata: &'a MetadataService,
}

/// Run the cascade; the fallback rule guarantees a result
pub(crate) async fn evaluate(raw: &RawAccount, ctx: &RuleContext<'_>) -> Classification {
    if let Some(c) = rule_executable(raw) {
        return c;
    }
    if let Some(c) = rule_system_wallet(raw) {
        return c;
    }
    if let Some(c) = rule_stake(raw, ctx).await {
        return c;
    }
    if let Some(c) = rule_vote(raw, ctx).await {
        return c;
    }
    if let Some(c) = rule_token(raw, ctx).await {
        return c;
    }
    if let Some(c) = rule_multisig(raw) {
        return c;
    }
    rule_fallback(raw)
}

// =============================================================================
// RULES, IN PRIORITY ORDER
// =============================================================================

/// Rule 1: executable accounts are programs
///
/// Upgradeable-loader ownership is stronger evidence; when the account data
/// embeds a program-data address that matches the PDA derived from this
/// account, the record describes the program-data side and is reclassified.
pub(crate) fn rule_executable(raw: &RawAccount) -> Option<Classification> {
    if !raw.executable {
        return None;
    }

    if raw.owner != BPF_LOADER_UPGRADEABLE_ID {
        return Some(
            Classification::new(AccountType::ProgramAccount, CONF_PROGRAM)
                .with("loader", json!(raw.owner)),
        );
    }

    let mut classification =
        Classification::new(AccountType::ProgramAccount, CONF_PROGRAM_UPGRADEABLE)
            .with("loader", json!(raw.owner));

    if let Some(stored) = embedded_program_data_address(&raw.data) {
        if let Some(derived) = derived_program_data_address(&raw.address) {
            if stored == derived {
                classification = Classification::new(
                    AccountType::ProgramData,
                    CONF_PROGRAM_UPGRADEABLE,
                )
                .with("loader", json!(raw.owner))
                .with("program_data_address", json!(stored));
            }
        }
    }

    Some(classification)
}

/// Upgradeable-loader Program state: u32 tag 2, program-data pubkey at 4
fn embedded_program_data_address(data: &AccountData) -> Option<String> {
    let bytes = match data {
        AccountData::Generic(bytes) => bytes,
        _ => return None,
    };
    let tag = u32::from_le_bytes(bytes.get(0..4)?.try_into().ok()?);
    if tag != 2 {
        return None;
    }
    let key = bytes.get(4..36)?;
    Some(bs58::encode(key).into_string())
}

fn derived_program_data_address(program_address: &str) -> Option<String> {
    let program = Pubkey::from_str(program_address).ok()?;
    crate::rpc::derive_program_address(&[program.as_ref()], BPF_LOADER_UPGRADEABLE_ID)
}

/// Rule 2: system-owned accounts are user wallets
pub(crate) fn rule_system_wallet(raw: &RawAccount) -> Option<Classification> {
    if raw.owner != SYSTEM_PROGRAM_ID {
        return None;
    }
    let confidence = if raw.lamports > 0 {
        CONF_WALLET_FUNDED
    } else {
        CONF_WALLET
    };
    Some(Classification::new(AccountType::UserWallet, confidence))
}

/// Rule 3: stake-program ownership
///
/// Decode failure drops the metadata but never the confidence; ownership by
/// the stake program is the signal, the layout is garnish.
pub(crate) async fn rule_stake(raw: &RawAccount, ctx: &RuleContext<'_>) -> Option<Classification> {
    if raw.owner != STAKE_PROGRAM_ID {
        return None;
    }

    let mut classification = Classification::new(AccountType::StakeAccount, CONF_STAKE);

    if let AccountData::Stake(stake) = &raw.data {
        classification = classification
            .with("staker", json!(stake.staker))
            .with("withdrawer", json!(stake.withdrawer))
            .with("delegated_stake", json!(stake.delegated_stake));
        if let Some(voter) = &stake.voter {
            classification = classification.with("delegated_voter", json!(voter));
        }
        if let Some(epoch) = stake.activation_epoch {
            classification = classification.with("activation_epoch", json!(epoch));
        }
        if let Some(epoch) = stake.deactivation_epoch {
            classification = classification.with("deactivation_epoch", json!(epoch));
        }
        if let Some(current_epoch) = ctx.epoch_cache.current_epoch(ctx.rpc).await {
            classification = classification
                .with("status", json!(stake.status(current_epoch)))
                .with("current_epoch", json!(current_epoch));
        }
    }

    Some(classification)
}

/// Rule 4: vote-program ownership, disambiguated via the live validator set
///
/// The validator-set lookup is a secondary collaborator call; its failure
/// degrades confidence instead of propagating.
pub(crate) async fn rule_vote(raw: &RawAccount, ctx: &RuleContext<'_>) -> Option<Classification> {
    if raw.owner != VOTE_PROGRAM_ID {
        return None;
    }

    match ctx.rpc.get_live_validator_set().await {
        Ok(set) => {
            if let Some((info, delinquent)) = set.find(&raw.address) {
                let mut classification =
                    Classification::new(AccountType::ValidatorVote, CONF_VOTE_VERIFIED)
                        .with("commission", json!(info.commission))
                        .with("activated_stake", json!(info.activated_stake))
                        .with("node_pubkey", json!(info.node_pubkey))
                        .with("delinquent", json!(delinquent));
                if let AccountData::Vote(vote) = &raw.data {
                    classification = classification
                        .with("authorized_withdrawer", json!(vote.authorized_withdrawer));
                }
                Some(classification)
            } else {
                Some(Classification::new(
                    AccountType::ValidatorIdentity,
                    CONF_VOTE_IDENTITY,
                ))
            }
        }
        Err(e) => {
            logger::debug(
                LogTag::Accounts,
                "VALIDATOR_SET_DEGRADED",
                &format!("address={} err={}", raw.address, e),
            );
            Some(
                Classification::new(AccountType::ValidatorVote, CONF_VOTE_DEGRADED)
                    .with("validator_set", json!("unavailable")),
            )
        }
    }
}

/// Rule 5: token-program-owned mints and token accounts
///
/// NFT heuristic: decimals == 0 and supply == 1. Known to misclassify
/// single-supply utility tokens; the metadata-account check boosts it but
/// the signal stays best-effort.
pub(crate) async fn rule_token(raw: &RawAccount, ctx: &RuleContext<'_>) -> Option<Classification> {
    match &raw.data {
        AccountData::Mint(mint) => {
            let mut classification = if mint.decimals == 0 && mint.supply == 1 {
                let mut c = Classification::new(AccountType::NftMint, CONF_NFT);
                if ctx.metadata.metadata_account_exists(ctx.rpc, &raw.address).await {
                    c = Classification::new(AccountType::NftMint, CONF_NFT_WITH_METADATA);
                    if let Some(pda) = super::metadata::metadata_pda(&raw.address) {
                        c = c.with("metadata_address", json!(pda));
                    }
                }
                c
            } else {
                Classification::new(AccountType::TokenMint, CONF_MINT)
            };
            classification = classification
                .with("decimals", json!(mint.decimals))
                .with("supply", json!(mint.supply.to_string()))
                .with("token_program", json!(raw.owner));
            if let Some(authority) = &mint.mint_authority {
                classification = classification.with("mint_authority", json!(authority));
            }
            Some(classification)
        }
        AccountData::TokenAccount(token) => Some(
            Classification::new(AccountType::TokenAccount, CONF_TOKEN_ACCOUNT)
                .with("mint", json!(token.mint))
                .with("owner", json!(token.owner))
                .with("amount", json!(token.amount.to_string()))
                .with("token_program", json!(raw.owner)),
        ),
        _ => None,
    }
}

/// Rule 6: known multisig program owners
pub(crate) fn rule_multisig(raw: &RawAccount) -> Option<Classification> {
    if !is_multisig_program(&raw.owner) {
        return None;
    }
    Some(
        Classification::new(AccountType::MultisigAccount, CONF_MULTISIG)
            .with("multisig_program", json!(raw.owner)),
    )
}

/// Rule 7: data-size fallback, always produces a low-confidence answer
pub(crate) fn rule_fallback(raw: &RawAccount) -> Classification {
    let data_len = raw.data_len();
    if data_len == 0 {
        Classification::new(AccountType::UserWallet, CONF_FALLBACK_WALLET)
            .with("heuristic", json!("empty_data"))
    } else if data_len > LARGE_DATA_THRESHOLD {
        Classification::new(AccountType::ProgramData, CONF_FALLBACK_PROGRAM_DATA)
            .with("heuristic", json!("large_data"))
            .with("data_len", json!(data_len))
    } else {
        Classification::new(AccountType::Unknown, CONF_FALLBACK_UNKNOWN)
            .with("data_len", json!(data_len))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BPF_LOADER_ID;

    fn raw(owner: &str, executable: bool, data: Vec<u8>) -> RawAccount {
        RawAccount {
            address: Pubkey::new_unique().to_string(),
            owner: owner.to_string(),
            lamports: 1,
            executable,
            data: AccountData::Generic(data),
        }
    }

    #[test]
    fn plain_loader_program_scores_point_nine() {
        let c = rule_executable(&raw(BPF_LOADER_ID, true, vec![1, 2, 3])).unwrap();
        assert_eq!(c.account_type, AccountType::ProgramAccount);
        assert_eq!(c.confidence, CONF_PROGRAM);
    }

    #[test]
    fn upgradeable_loader_raises_confidence() {
        let c = rule_executable(&raw(BPF_LOADER_UPGRADEABLE_ID, true, vec![0u8; 36])).unwrap();
        assert_eq!(c.account_type, AccountType::ProgramAccount);
        assert_eq!(c.confidence, CONF_PROGRAM_UPGRADEABLE);
    }

    #[test]
    fn matching_program_data_address_reclassifies() {
        let mut account = raw(BPF_LOADER_UPGRADEABLE_ID, true, vec![]);
        let derived = derived_program_data_address(&account.address).unwrap();

        let mut data = vec![0u8; 36];
        data[0..4].copy_from_slice(&2u32.to_le_bytes());
        data[4..36].copy_from_slice(&bs58::decode(&derived).into_vec().unwrap());
        account.data = AccountData::Generic(data);

        let c = rule_executable(&account).unwrap();
        assert_eq!(c.account_type, AccountType::ProgramData);
        assert_eq!(c.confidence, CONF_PROGRAM_UPGRADEABLE);
        assert_eq!(
            c.metadata.get("program_data_address"),
            Some(&json!(derived))
        );
    }

    #[test]
    fn mismatched_program_data_address_stays_program_account() {
        let mut account = raw(BPF_LOADER_UPGRADEABLE_ID, true, vec![]);
        let mut data = vec![0u8; 36];
        data[0..4].copy_from_slice(&2u32.to_le_bytes());
        data[4..36].copy_from_slice(Pubkey::new_unique().as_ref());
        account.data = AccountData::Generic(data);

        let c = rule_executable(&account).unwrap();
        assert_eq!(c.account_type, AccountType::ProgramAccount);
    }

    #[test]
    fn non_executable_account_skips_rule_one() {
        assert!(rule_executable(&raw(BPF_LOADER_ID, false, vec![])).is_none());
    }
}
