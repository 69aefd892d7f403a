// Fixed-offset binary layout decoders for on-chain account data
//
// Raw account bytes become a tagged union instead of loosely-typed JSON, so
// the classifier never does stringly-typed field access. Decoders are total:
// anything that fails to parse falls back to `Generic`, and decode failure is
// never fatal to classification.

use serde::{Deserialize, Serialize};

use crate::registry::{
    is_token_program, STAKE_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, VOTE_PROGRAM_ID,
};

// Canonical SPL account sizes
const MINT_LEN: usize = 82;
const TOKEN_ACCOUNT_LEN: usize = 165;
// Token-2022 account-type tag trailing the base layout
const T22_TAG_MINT: u8 = 1;
const T22_TAG_ACCOUNT: u8 = 2;

// =============================================================================
// DECODED LAYOUTS
// =============================================================================

/// Decoded SPL mint
///
/// Layout: COption mint_authority (4+32), supply u64 at 36, decimals at 44,
/// is_initialized at 45, COption freeze_authority at 46.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintAccount {
    pub mint_authority: Option<String>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<String>,
}

/// Decoded SPL token account (mint at 0, owner at 32, amount u64 at 64)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplTokenAccount {
    pub mint: String,
    pub owner: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeStateKind {
    Uninitialized,
    Initialized,
    Delegated,
    RewardsPool,
}

/// Decoded stake account
///
/// Layout: state tag u32 at 0, authorized staker at 12, withdrawer at 44;
/// for delegated stake: voter at 124, stake u64 at 156, activation epoch at
/// 164, deactivation epoch at 172 (u64::MAX meaning none).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeAccount {
    pub state: StakeStateKind,
    pub staker: String,
    pub withdrawer: String,
    pub voter: Option<String>,
    pub delegated_stake: u64,
    pub activation_epoch: Option<u64>,
    pub deactivation_epoch: Option<u64>,
}

impl StakeAccount {
    /// Derived delegation status from an epoch comparison
    pub fn status(&self, current_epoch: u64) -> &'static str {
        if self.state != StakeStateKind::Delegated {
            return "inactive";
        }
        let activation = match self.activation_epoch {
            Some(epoch) => epoch,
            None => return "inactive",
        };
        if let Some(deactivation) = self.deactivation_epoch {
            if deactivation <= current_epoch {
                return "deactivated";
            }
            return "deactivating";
        }
        if activation < current_epoch {
            "active"
        } else {
            "activating"
        }
    }
}

/// Decoded vote account header (node pubkey at 4, withdrawer at 36,
/// commission at 68)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteAccount {
    pub node_pubkey: String,
    pub authorized_withdrawer: String,
    pub commission: u8,
}

/// Tagged union of decoded account data layouts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "layout", content = "value")]
pub enum AccountData {
    Mint(MintAccount),
    TokenAccount(SplTokenAccount),
    Stake(StakeAccount),
    Vote(VoteAccount),
    Generic(Vec<u8>),
}

impl AccountData {
    /// Decode raw bytes by owner program; falls back to `Generic`
    pub fn from_bytes(owner: &str, bytes: &[u8]) -> AccountData {
        let decoded = if is_token_program(owner) {
            decode_token_owned(owner, bytes)
        } else if owner == STAKE_PROGRAM_ID {
            decode_stake(bytes).map(AccountData::Stake)
        } else if owner == VOTE_PROGRAM_ID {
            decode_vote(bytes).map(AccountData::Vote)
        } else {
            None
        };
        decoded.unwrap_or_else(|| AccountData::Generic(bytes.to_vec()))
    }

    pub fn empty() -> AccountData {
        AccountData::Generic(Vec::new())
    }

    pub fn byte_len(&self) -> usize {
        match self {
            AccountData::Mint(_) => MINT_LEN,
            AccountData::TokenAccount(_) => TOKEN_ACCOUNT_LEN,
            AccountData::Stake(_) => 200,
            AccountData::Vote(_) => 69,
            AccountData::Generic(bytes) => bytes.len(),
        }
    }
}

// =============================================================================
// DECODERS
// =============================================================================

fn decode_token_owned(owner: &str, bytes: &[u8]) -> Option<AccountData> {
    match bytes.len() {
        MINT_LEN => decode_mint(bytes).map(AccountData::Mint),
        TOKEN_ACCOUNT_LEN => decode_token_account(bytes).map(AccountData::TokenAccount),
        // Token-2022 appends extensions past the base layout; the account
        // type tag directly after the base account length disambiguates.
        len if owner == TOKEN_2022_PROGRAM_ID && len > TOKEN_ACCOUNT_LEN => {
            match bytes[TOKEN_ACCOUNT_LEN] {
                T22_TAG_MINT => decode_mint(bytes).map(AccountData::Mint),
                T22_TAG_ACCOUNT => decode_token_account(bytes).map(AccountData::TokenAccount),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Decode an SPL mint; `None` when the buffer is too short
pub fn decode_mint(bytes: &[u8]) -> Option<MintAccount> {
    if bytes.len() < MINT_LEN {
        return None;
    }
    Some(MintAccount {
        mint_authority: read_coption_pubkey(bytes, 0)?,
        supply: read_u64_le(bytes, 36)?,
        decimals: bytes[44],
        is_initialized: bytes[45] != 0,
        freeze_authority: read_coption_pubkey(bytes, 46)?,
    })
}

/// Decode an SPL token account; `None` when the buffer is too short
pub fn decode_token_account(bytes: &[u8]) -> Option<SplTokenAccount> {
    if bytes.len() < TOKEN_ACCOUNT_LEN {
        return None;
    }
    Some(SplTokenAccount {
        mint: read_pubkey(bytes, 0)?,
        owner: read_pubkey(bytes, 32)?,
        amount: read_u64_le(bytes, 64)?,
    })
}

/// Decode a stake account; `None` when the buffer is too short for its state
pub fn decode_stake(bytes: &[u8]) -> Option<StakeAccount> {
    let tag = read_u32_le(bytes, 0)?;
    let state = match tag {
        0 => return None, // uninitialized carries no authorities
        1 => StakeStateKind::Initialized,
        2 => StakeStateKind::Delegated,
        3 => StakeStateKind::RewardsPool,
        _ => return None,
    };

    let staker = read_pubkey(bytes, 12)?;
    let withdrawer = read_pubkey(bytes, 44)?;

    if state != StakeStateKind::Delegated {
        return Some(StakeAccount {
            state,
            staker,
            withdrawer,
            voter: None,
            delegated_stake: 0,
            activation_epoch: None,
            deactivation_epoch: None,
        });
    }

    let voter = read_pubkey(bytes, 124)?;
    let delegated_stake = read_u64_le(bytes, 156)?;
    let activation_epoch = read_u64_le(bytes, 164)?;
    let deactivation_epoch = match read_u64_le(bytes, 172)? {
        u64::MAX => None,
        epoch => Some(epoch),
    };

    Some(StakeAccount {
        state,
        staker,
        withdrawer,
        voter: Some(voter),
        delegated_stake,
        activation_epoch: Some(activation_epoch),
        deactivation_epoch,
    })
}

/// Decode the vote account header; `None` when the buffer is too short
pub fn decode_vote(bytes: &[u8]) -> Option<VoteAccount> {
    if bytes.len() < 69 {
        return None;
    }
    Some(VoteAccount {
        node_pubkey: read_pubkey(bytes, 4)?,
        authorized_withdrawer: read_pubkey(bytes, 36)?,
        commission: bytes[68],
    })
}

// =============================================================================
// BYTE READERS
// =============================================================================

fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}

fn read_u64_le(bytes: &[u8], offset: usize) -> Option<u64> {
    let slice = bytes.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(slice.try_into().ok()?))
}

fn read_pubkey(bytes: &[u8], offset: usize) -> Option<String> {
    let slice = bytes.get(offset..offset + 32)?;
    Some(bs58::encode(slice).into_string())
}

/// COption<Pubkey>: u32 tag followed by 32 key bytes
fn read_coption_pubkey(bytes: &[u8], offset: usize) -> Option<Option<String>> {
    let tag = read_u32_le(bytes, offset)?;
    if tag == 0 {
        // Skip the key bytes but require them to be present.
        bytes.get(offset + 4..offset + 36)?;
        return Some(None);
    }
    Some(Some(read_pubkey(bytes, offset + 4)?))
}

// =============================================================================
// TESTS
// =============================================================================
