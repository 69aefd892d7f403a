// Program registry - static program-id to display-name mapping
//
// Pure and total: unknown ids map to the UNKNOWN_PROGRAM sentinel, never an
// error. Extending coverage (new DEX, new core program) is a table edit.

// =============================================================================
// CORE PROGRAM IDS
// =============================================================================

pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
pub const STAKE_PROGRAM_ID: &str = "Stake11111111111111111111111111111111111111";
pub const VOTE_PROGRAM_ID: &str = "Vote111111111111111111111111111111111111111";
pub const CONFIG_PROGRAM_ID: &str = "Config1111111111111111111111111111111111111";
pub const BPF_LOADER_ID: &str = "BPFLoader2111111111111111111111111111111111";
pub const BPF_LOADER_UPGRADEABLE_ID: &str = "BPFLoaderUpgradeab1e11111111111111111111111";
pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
pub const METAPLEX_METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

// =============================================================================
// MULTISIG PROGRAM IDS
// =============================================================================

pub const SQUADS_V3_PROGRAM_ID: &str = "SMPLecH534NA9acpos4G6x7uf3LWbCAwZQE9e8ZekMu";
pub const SQUADS_V4_PROGRAM_ID: &str = "SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf";

// =============================================================================
// DEX / AGGREGATOR PROGRAM IDS
// =============================================================================

pub const JUPITER_V6_PROGRAM_ID: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
pub const JUPITER_V4_PROGRAM_ID: &str = "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB";
pub const RAYDIUM_AMM_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const RAYDIUM_CLMM_PROGRAM_ID: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";
pub const RAYDIUM_CPMM_PROGRAM_ID: &str = "CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C";
pub const ORCA_WHIRLPOOL_PROGRAM_ID: &str = "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc";
pub const METEORA_DLMM_PROGRAM_ID: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo";
pub const PUMP_FUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Sentinel display name for program ids without a table entry
pub const UNKNOWN_PROGRAM: &str = "Unknown Program";

/// Read-only display table exposed to the rendering layer
static KNOWN_PROGRAMS: &[(&str, &str)] = &[
    (SYSTEM_PROGRAM_ID, "System Program"),
    (TOKEN_PROGRAM_ID, "Token Program"),
    (TOKEN_2022_PROGRAM_ID, "Token-2022 Program"),
    (ASSOCIATED_TOKEN_PROGRAM_ID, "Associated Token Program"),
    (STAKE_PROGRAM_ID, "Stake Program"),
    (VOTE_PROGRAM_ID, "Vote Program"),
    (CONFIG_PROGRAM_ID, "Config Program"),
    (BPF_LOADER_ID, "BPF Loader"),
    (BPF_LOADER_UPGRADEABLE_ID, "BPF Upgradeable Loader"),
    (COMPUTE_BUDGET_PROGRAM_ID, "Compute Budget Program"),
    (MEMO_PROGRAM_ID, "Memo Program"),
    (METAPLEX_METADATA_PROGRAM_ID, "Metaplex Token Metadata"),
    (SQUADS_V3_PROGRAM_ID, "Squads Multisig v3"),
    (SQUADS_V4_PROGRAM_ID, "Squads Multisig v4"),
    (JUPITER_V6_PROGRAM_ID, "Jupiter Aggregator v6"),
    (JUPITER_V4_PROGRAM_ID, "Jupiter Aggregator v4"),
    (RAYDIUM_AMM_PROGRAM_ID, "Raydium AMM"),
    (RAYDIUM_CLMM_PROGRAM_ID, "Raydium CLMM"),
    (RAYDIUM_CPMM_PROGRAM_ID, "Raydium CPMM"),
    (ORCA_WHIRLPOOL_PROGRAM_ID, "Orca Whirlpool"),
    (METEORA_DLMM_PROGRAM_ID, "Meteora DLMM"),
    (PUMP_FUN_PROGRAM_ID, "Pump.fun"),
];

// =============================================================================
// LOOKUP FUNCTIONS
// =============================================================================

/// Resolve a program id to its display name; unknown ids never fail
pub fn name_of(program_id: &str) -> &'static str {
    KNOWN_PROGRAMS
        .iter()
        .find(|(id, _)| *id == program_id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_PROGRAM)
}

/// Full display table, read-only, for the rendering layer
pub fn known_programs() -> &'static [(&'static str, &'static str)] {
    KNOWN_PROGRAMS
}

/// Detect DEX/aggregator platform from a program id
pub fn dex_label(program_id: &str) -> Option<&'static str> {
    match program_id {
        JUPITER_V6_PROGRAM_ID | JUPITER_V4_PROGRAM_ID => Some("jupiter"),
        RAYDIUM_AMM_PROGRAM_ID | RAYDIUM_CLMM_PROGRAM_ID | RAYDIUM_CPMM_PROGRAM_ID => {
            Some("raydium")
        }
        ORCA_WHIRLPOOL_PROGRAM_ID => Some("orca"),
        METEORA_DLMM_PROGRAM_ID => Some("meteora"),
        PUMP_FUN_PROGRAM_ID => Some("pumpfun"),
        _ => None,
    }
}

/// Check whether a program id belongs to any known DEX or aggregator
pub fn is_dex_program(program_id: &str) -> bool {
    dex_label(program_id).is_some()
}

/// Display-name substrings that mark a DEX instruction
///
/// Swap detection matches decoded program names against this allow-list.
/// Adding a new DEX means adding its id above and its marker here.
pub static DEX_NAME_MARKERS: &[&str] = &["Jupiter", "Raydium", "Orca", "Meteora", "Pump.fun"];

/// Check whether a decoded program display name names a DEX
pub fn name_is_dex(program_name: &str) -> bool {
    DEX_NAME_MARKERS
        .iter()
        .any(|marker| program_name.contains(marker))
}

/// Check whether an owner program is a known multisig program
pub fn is_multisig_program(program_id: &str) -> bool {
    matches!(program_id, SQUADS_V3_PROGRAM_ID | SQUADS_V4_PROGRAM_ID)
}

/// Check whether an owner program is one of the SPL token programs
pub fn is_token_program(program_id: &str) -> bool {
    matches!(program_id, TOKEN_PROGRAM_ID | TOKEN_2022_PROGRAM_ID)
}

// =============================================================================
// TESTS
// =============================================================================
