//! solscope - typed classification core for Solana explorer backends
//!
//! Turns raw ledger records (accounts and transactions) fetched from an RPC
//! collaborator into confidence-scored domain objects the rendering layer can
//! display without re-deriving on-chain semantics.
//!
//! Two subsystems do the heavy lifting:
//! - [`accounts`]: infers the semantic type of an on-chain account (wallet,
//!   mint, stake, vote, program, NFT, multisig, ...) with a confidence score
//!   and a suggested navigation route.
//! - [`transactions`]: decodes a transaction's instruction tree and balance
//!   snapshots into balance deltas, token deltas and a classified event
//!   (swap/transfer/mint/burn/create).

pub mod accounts;
pub mod cache;
pub mod errors;
pub mod logger;
pub mod registry;
pub mod router;
pub mod rpc;
pub mod throttle;
pub mod transactions;

pub use accounts::{
    AccountClassifier, AccountType, ClassifiedAccount, MetadataService, TokenMetadata,
};
pub use cache::{EpochCache, EpochCacheConfig};
pub use errors::{FetchError, SnapshotError};
pub use router::{route, RouteDecision, REDIRECT_CONFIDENCE_THRESHOLD};
pub use rpc::LedgerRpc;
pub use throttle::{BatchConfig, ChunkThrottle};
pub use transactions::{
    build_transaction_detail, fetch_transaction_detail, TransactionDetail, TransactionType,
};
