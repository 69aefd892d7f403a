// Metaplex token-metadata lookup
//
// Two layers: the on-chain metadata account (PDA derived from the mint,
// name/symbol/uri at fixed borsh offsets) and the optional off-chain JSON
// behind the uri. The off-chain fetch runs under a short timeout and any
// failure degrades to the on-chain fields; metadata is always best-effort.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;

use crate::errors::FetchError;
use crate::logger::{self, LogTag};
use crate::registry::METAPLEX_METADATA_PROGRAM_ID;
use crate::rpc::LedgerRpc;
use crate::throttle::ChunkThrottle;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

// Metadata account: key(1) + update_authority(32) + mint(32), then
// borsh strings name/symbol/uri.
const METADATA_STRINGS_OFFSET: usize = 65;

/// Configuration for metadata lookups
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// Deadline for the off-chain uri fetch
    pub uri_timeout: Duration,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            uri_timeout: Duration::from_secs(5),
        }
    }
}

/// Combined on-chain + off-chain token metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Off-chain JSON collaborator; the default implementation uses reqwest
#[async_trait]
pub trait UriFetcher: Send + Sync {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError>;
}

pub struct HttpUriFetcher;

#[async_trait]
impl UriFetcher for HttpUriFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        let response = HTTP_CLIENT.get(uri).send().await?;
        let json = response.json::<Value>().await?;
        Ok(json)
    }
}

// =============================================================================
// PDA DERIVATION + ON-CHAIN DECODE
// =============================================================================

/// Derive the Metaplex metadata PDA for a mint
pub fn metadata_pda(mint: &str) -> Option<String> {
    let mint_key = Pubkey::from_str(mint).ok()?;
    let program = Pubkey::from_str(METAPLEX_METADATA_PROGRAM_ID).ok()?;
    let (address, _bump) = Pubkey::find_program_address(
        &[b"metadata", program.as_ref(), mint_key.as_ref()],
        &program,
    );
    Some(address.to_string())
}

/// Decode name/symbol/uri from raw metadata account bytes
pub fn decode_metadata_strings(bytes: &[u8]) -> Option<(String, String, String)> {
    let mut offset = METADATA_STRINGS_OFFSET;
    let name = read_borsh_string(bytes, &mut offset)?;
    let symbol = read_borsh_string(bytes, &mut offset)?;
    let uri = read_borsh_string(bytes, &mut offset)?;
    Some((name, symbol, uri))
}

/// Borsh string: u32 le length followed by utf8 bytes, null-padded on chain
fn read_borsh_string(bytes: &[u8], offset: &mut usize) -> Option<String> {
    let len_bytes = bytes.get(*offset..*offset + 4)?;
    let len = u32::from_le_bytes(len_bytes.try_into().ok()?) as usize;
    let data = bytes.get(*offset + 4..*offset + 4 + len)?;
    *offset += 4 + len;
    let text = String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string();
    Some(text)
}

// =============================================================================
// METADATA SERVICE
// =============================================================================

/// Best-effort metadata lookup service
pub struct MetadataService {
    config: MetadataConfig,
    throttle: ChunkThrottle,
}

impl MetadataService {
    pub fn new(config: MetadataConfig, throttle: ChunkThrottle) -> Self {
        Self { config, throttle }
    }

    /// Whether the mint has a metadata account on chain; errors read as "no"
    pub async fn metadata_account_exists(&self, rpc: &dyn LedgerRpc, mint: &str) -> bool {
        let pda = match metadata_pda(mint) {
            Some(pda) => pda,
            None => return false,
        };
        matches!(rpc.get_account(&pda).await, Ok(Some(_)))
    }

    /// Fetch metadata for one mint, enriching with off-chain JSON when possible
    pub async fn fetch_token_metadata(
        &self,
        rpc: &dyn LedgerRpc,
        uri_fetcher: Option<&dyn UriFetcher>,
        mint: &str,
    ) -> Option<TokenMetadata> {
        let pda = metadata_pda(mint)?;
        let account = rpc.get_account(&pda).await.ok().flatten()?;
        let raw = match &account.data {
            crate::accounts::layouts::AccountData::Generic(bytes) => bytes.clone(),
            _ => return None,
        };
        let (name, symbol, uri) = decode_metadata_strings(&raw)?;

        let mut metadata = TokenMetadata {
            mint: mint.to_string(),
            name,
            symbol,
            uri,
            image: None,
            description: None,
        };

        if let Some(fetcher) = uri_fetcher {
            if !metadata.uri.is_empty() {
                match timeout(self.config.uri_timeout, fetcher.fetch_json(&metadata.uri)).await {
                    Ok(Ok(json)) => {
                        metadata.image = json
                            .get("image")
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string());
                        metadata.description = json
                            .get("description")
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string());
                    }
                    Ok(Err(e)) => {
                        logger::debug(
                            LogTag::Metadata,
                            "URI_FETCH_FAILED",
                            &format!("mint={} err={}", mint, e),
                        );
                    }
                    Err(_) => {
                        logger::debug(
                            LogTag::Metadata,
                            "URI_FETCH_TIMEOUT",
                            &format!("mint={} uri={}", mint, metadata.uri),
                        );
                    }
                }
            }
        }

        Some(metadata)
    }

    /// Batch metadata fetch; failed mints are simply absent from the map
    pub async fn fetch_metadata_many(
        &self,
        rpc: &dyn LedgerRpc,
        uri_fetcher: Option<&dyn UriFetcher>,
        mints: &[String],
    ) -> HashMap<String, TokenMetadata> {
        let mut results = HashMap::new();
        let chunks = self.throttle.chunks(mints.to_vec());
        let chunk_count = chunks.len();

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let tasks: Vec<_> = chunk
                .iter()
                .map(|mint| async {
                    let metadata = self.fetch_token_metadata(rpc, uri_fetcher, mint).await;
                    (mint.clone(), metadata)
                })
                .collect();

            for (mint, metadata) in futures::future::join_all(tasks).await {
                if let Some(metadata) = metadata {
                    results.insert(mint, metadata);
                }
            }

            self.throttle.pace(chunk_index, chunk_count).await;
        }

        logger::debug(
            LogTag::Metadata,
            "BATCH_COMPLETE",
            &format!("resolved {}/{} mints", results.len(), mints.len()),
        );
        results
    }
}

impl Default for MetadataService {
    fn default() -> Self {
        Self::new(MetadataConfig::default(), ChunkThrottle::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::MockLedgerRpc;
    use crate::rpc::RawAccount;
    use crate::throttle::BatchConfig;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    const MINT: &str = "So11111111111111111111111111111111111111112";

    fn metadata_bytes(name: &str, symbol: &str, uri: &str) -> Vec<u8> {
        let mut buf = vec![0u8; METADATA_STRINGS_OFFSET];
        buf[0] = 4; // MetadataV1 key
        for s in [name, symbol, uri] {
            buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        buf
    }

    fn rpc_with_metadata(name: &str, symbol: &str, uri: &str) -> MockLedgerRpc {
        let pda = metadata_pda(MINT).unwrap();
        let b64 = BASE64.encode(metadata_bytes(name, symbol, uri));
        MockLedgerRpc::new().with_account(RawAccount::from_base64_data(
            pda,
            METAPLEX_METADATA_PROGRAM_ID,
            1_000_000,
            false,
            &b64,
        ))
    }

    struct SlowFetcher;

    #[async_trait]
    impl UriFetcher for SlowFetcher {
        async fn fetch_json(&self, _uri: &str) -> Result<Value, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("fetch should have timed out")
        }
    }

    struct JsonFetcher(Value);

    #[async_trait]
    impl UriFetcher for JsonFetcher {
        async fn fetch_json(&self, _uri: &str) -> Result<Value, FetchError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn metadata_strings_decode_with_null_padding() {
        let mut bytes = metadata_bytes("Wrapped SOL\0\0\0", "WSOL\0", "https://x.test/a.json");
        bytes.extend_from_slice(&[0u8; 16]);
        let (name, symbol, uri) = decode_metadata_strings(&bytes).unwrap();
        assert_eq!(name, "Wrapped SOL");
        assert_eq!(symbol, "WSOL");
        assert_eq!(uri, "https://x.test/a.json");
    }

    #[test]
    fn truncated_metadata_account_yields_none() {
        assert!(decode_metadata_strings(&[0u8; 30]).is_none());
    }

    #[tokio::test]
    async fn missing_metadata_account_reads_as_absent() {
        let rpc = MockLedgerRpc::new();
        let service = MetadataService::default();
        assert!(!service.metadata_account_exists(&rpc, MINT).await);
    }

    #[tokio::test]
    async fn off_chain_json_enriches_metadata() {
        let rpc = rpc_with_metadata("Token", "TOK", "https://x.test/t.json");
        let service = MetadataService::default();
        let fetcher = JsonFetcher(serde_json::json!({
            "image": "https://x.test/t.png",
            "description": "a token"
        }));

        let metadata = service
            .fetch_token_metadata(&rpc, Some(&fetcher), MINT)
            .await
            .unwrap();
        assert_eq!(metadata.name, "Token");
        assert_eq!(metadata.image.as_deref(), Some("https://x.test/t.png"));
        assert_eq!(metadata.description.as_deref(), Some("a token"));
    }

    #[tokio::test(start_paused = true)]
    async fn uri_timeout_degrades_to_on_chain_fields() {
        let rpc = rpc_with_metadata("Token", "TOK", "https://x.test/slow.json");
        let service = MetadataService::new(
            MetadataConfig {
                uri_timeout: Duration::from_millis(50),
            },
            ChunkThrottle::new(BatchConfig {
                chunk_size: 4,
                chunk_delay_ms: 0,
            }),
        );

        let metadata = service
            .fetch_token_metadata(&rpc, Some(&SlowFetcher), MINT)
            .await
            .unwrap();
        assert_eq!(metadata.symbol, "TOK");
        assert!(metadata.image.is_none());
        assert!(metadata.description.is_none());
    }

    #[tokio::test]
    async fn batch_fetch_skips_unresolvable_mints() {
        let rpc = rpc_with_metadata("Token", "TOK", "");
        let service = MetadataService::new(
            MetadataConfig::default(),
            ChunkThrottle::new(BatchConfig {
                chunk_size: 4,
                chunk_delay_ms: 0,
            }),
        );

        let mints = vec![
            MINT.to_string(),
            // Valid address with no metadata account on chain.
            "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T".to_string(),
        ];
        let results = service.fetch_metadata_many(&rpc, None, &mints).await;
        assert_eq!(results.len(), 1);
        assert!(results.contains_key(MINT));
    }
}
