// Error taxonomy for the classification core
//
// Only the primary ledger lookup can surface a hard error (there is nothing
// to classify without it). Everything else - secondary lookups, decode
// anomalies, malformed addresses - degrades in place and never crosses the
// public boundary.

use thiserror::Error;

/// Hard failure fetching primary data from the ledger RPC collaborator
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("rpc transport failure: {0}")]
    Transport(String),

    #[error("rpc rate limited: {0}")]
    RateLimited(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            FetchError::RateLimited(err.to_string())
        } else if err.is_timeout() {
            FetchError::Transport(format!("timeout: {}", err))
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Malformed balance snapshot handed to the diff engine
///
/// Misaligned pre/post arrays are rejected outright instead of being
/// truncated to the shorter length; truncation hides corrupted meta.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error(
        "misaligned balance snapshot: {account_count} account keys vs {pre_len} pre / {post_len} post balances"
    )]
    Misaligned {
        account_count: usize,
        pre_len: usize,
        post_len: usize,
    },
}
