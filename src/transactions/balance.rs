// Balance diff engine
//
// Native deltas come from the aligned pre/post lamport arrays; token deltas
// from the union of pre/post token balance snapshots keyed by
// (account index, mint). A snapshot whose arrays disagree with the key table
// is rejected outright: silently truncating would attribute movements to the
// wrong accounts.

use std::collections::BTreeMap;

use crate::errors::SnapshotError;
use crate::rpc::{TokenBalanceEntry, TransactionMessage, TransactionMeta};

use super::types::{BalanceChange, TokenBalanceChange};

/// Native lamport deltas in message order
///
/// Emits one entry per account whose balance moved, plus the fee payer
/// (index 0), which is always reported even with zero net delta. Role flags
/// come from the message's signer/writable tables.
pub fn native_balance_changes(
    message: &TransactionMessage,
    meta: &TransactionMeta,
) -> Result<Vec<BalanceChange>, SnapshotError> {
    let account_count = message.account_keys.len();
    if meta.pre_balances.len() != account_count || meta.post_balances.len() != account_count {
        return Err(SnapshotError::Misaligned {
            account_count,
            pre_len: meta.pre_balances.len(),
            post_len: meta.post_balances.len(),
        });
    }

    Ok(message
        .account_keys
        .iter()
        .enumerate()
        .filter_map(|(index, address)| {
            let pre = meta.pre_balances[index];
            let post = meta.post_balances[index];
            if pre == post && index != 0 {
                return None;
            }
            Some(BalanceChange {
                account_index: index,
                address: address.clone(),
                pre_lamports: pre,
                post_lamports: post,
                delta_lamports: post as i128 - pre as i128,
                is_signer: message.is_signer(index),
                is_writable: message.is_writable(index),
                is_fee_payer: index == 0,
            })
        })
        .collect())
}

/// Token deltas over the union of pre/post snapshots
///
/// An entry present only post-execution has pre 0 (account created during the
/// transaction); present only pre-execution has post 0 (account closed).
/// Results are ordered by account index, then mint.
pub fn token_balance_changes(
    message: &TransactionMessage,
    meta: &TransactionMeta,
) -> Vec<TokenBalanceChange> {
    let mut merged: BTreeMap<(usize, String), TokenBalanceChange> = BTreeMap::new();

    for entry in &meta.pre_token_balances {
        let change = merged
            .entry((entry.account_index, entry.mint.clone()))
            .or_insert_with(|| blank_change(message, entry));
        change.pre_raw = entry.raw_amount;
    }

    for entry in &meta.post_token_balances {
        let change = merged
            .entry((entry.account_index, entry.mint.clone()))
            .or_insert_with(|| blank_change(message, entry));
        change.post_raw = entry.raw_amount;
        // Post snapshot wins for owner/decimals when both sides are present.
        change.decimals = entry.decimals;
        if entry.owner.is_some() {
            change.owner = entry.owner.clone();
        }
    }

    merged
        .into_values()
        .map(|mut change| {
            change.delta_raw = change.post_raw as i128 - change.pre_raw as i128;
            change
        })
        .collect()
}

fn blank_change(message: &TransactionMessage, entry: &TokenBalanceEntry) -> TokenBalanceChange {
    TokenBalanceChange {
        account_index: entry.account_index,
        address: message.account_keys.get(entry.account_index).cloned(),
        mint: entry.mint.clone(),
        owner: entry.owner.clone(),
        decimals: entry.decimals,
        pre_raw: 0,
        post_raw: 0,
        delta_raw: 0,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn message(keys: &[&str]) -> TransactionMessage {
        let mut signer_flags = vec![false; keys.len()];
        signer_flags[0] = true;
        TransactionMessage {
            account_keys: keys.iter().map(|k| k.to_string()).collect(),
            signer_flags,
            writable_flags: vec![true; keys.len()],
            instructions: vec![],
        }
    }

    fn meta(pre: Vec<u64>, post: Vec<u64>) -> TransactionMeta {
        TransactionMeta {
            fee: 5_000,
            err: None,
            pre_balances: pre,
            post_balances: post,
            pre_token_balances: vec![],
            post_token_balances: vec![],
            inner_instructions: vec![],
            log_messages: vec![],
        }
    }

    fn token_entry(
        account_index: usize,
        mint: &str,
        decimals: u8,
        raw_amount: u64,
    ) -> TokenBalanceEntry {
        TokenBalanceEntry {
            account_index,
            mint: mint.to_string(),
            owner: Some("owner1111111111111111111111111111111111111".to_string()),
            decimals,
            raw_amount,
        }
    }

    #[test]
    fn fee_only_transaction_reports_exactly_the_fee_payer() {
        let msg = message(&["payer", "other"]);
        let m = meta(vec![1_000_000, 50], vec![995_000, 50]);

        let changes = native_balance_changes(&msg, &m).unwrap();
        // The untouched account is filtered; the fee payer always appears.
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_fee_payer);
        assert!(changes[0].is_signer);
        assert_eq!(changes[0].delta_lamports, -(m.fee as i128));

        // Lamports are conserved up to the fee.
        let pre: u64 = m.pre_balances.iter().sum();
        let post: u64 = m.post_balances.iter().sum();
        assert_eq!(post, pre - m.fee);
    }

    #[test]
    fn fee_payer_appears_even_with_zero_delta() {
        let msg = message(&["payer", "other"]);
        let m = meta(vec![100, 10], vec![100, 60]);

        let changes = native_balance_changes(&msg, &m).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes[0].is_fee_payer);
        assert_eq!(changes[0].delta_lamports, 0);
        assert_eq!(changes[1].delta_lamports, 50);
        assert_eq!(changes.iter().filter(|c| c.is_fee_payer).count(), 1);
    }

    #[test]
    fn misaligned_snapshot_is_rejected() {
        let msg = message(&["payer", "other"]);
        let m = meta(vec![1_000_000], vec![995_000, 50]);

        let err = native_balance_changes(&msg, &m).unwrap_err();
        match err {
            SnapshotError::Misaligned {
                account_count,
                pre_len,
                post_len,
            } => {
                assert_eq!(account_count, 2);
                assert_eq!(pre_len, 1);
                assert_eq!(post_len, 2);
            }
        }
    }

    #[test]
    fn token_union_fills_missing_sides_with_zero() {
        let msg = message(&["payer", "ata_a", "ata_b"]);
        let mut m = meta(vec![0, 0, 0], vec![0, 0, 0]);
        // ata_a existed before and was drained; ata_b was created mid-tx.
        m.pre_token_balances = vec![token_entry(1, "mintA", 6, 100_000_000)];
        m.post_token_balances = vec![
            token_entry(1, "mintA", 6, 0),
            token_entry(2, "mintB", 9, 50_000_000_000),
        ];

        let changes = token_balance_changes(&msg, &m);
        assert_eq!(changes.len(), 2);

        assert_eq!(changes[0].account_index, 1);
        assert_eq!(changes[0].mint, "mintA");
        assert_eq!(changes[0].delta_raw, -100_000_000);
        assert_eq!(changes[0].ui_delta(), -100.0);
        assert_eq!(changes[0].address.as_deref(), Some("ata_a"));

        assert_eq!(changes[1].account_index, 2);
        assert_eq!(changes[1].mint, "mintB");
        assert_eq!(changes[1].pre_ui(), 0.0);
        assert_eq!(changes[1].delta_raw, 50_000_000_000);
        assert_eq!(changes[1].post_ui(), 50.0);
    }

    #[test]
    fn closed_account_reads_as_full_outflow() {
        let msg = message(&["payer", "ata"]);
        let mut m = meta(vec![0, 0], vec![0, 0]);
        m.pre_token_balances = vec![token_entry(1, "mintA", 0, 7)];

        let changes = token_balance_changes(&msg, &m);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].post_raw, 0);
        assert_eq!(changes[0].delta_raw, -7);
    }

    #[test]
    fn unchanged_balance_yields_zero_delta_entry() {
        let msg = message(&["payer", "ata"]);
        let mut m = meta(vec![0, 0], vec![0, 0]);
        m.pre_token_balances = vec![token_entry(1, "mintA", 6, 42)];
        m.post_token_balances = vec![token_entry(1, "mintA", 6, 42)];

        let changes = token_balance_changes(&msg, &m);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].delta_raw, 0);
    }
}
