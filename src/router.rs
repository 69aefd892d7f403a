// Confidence-based route selection
//
// Maps a classified account to the page that should render it. Validator
// accounts get the validator view, everything else the generic account view,
// and the redirect decision is gated on classification confidence so
// low-evidence guesses land on the caller's fallback page instead of a
// wrong one.

use serde::{Deserialize, Serialize};

use crate::accounts::{AccountType, ClassifiedAccount};

/// Minimum confidence required to redirect to a type-specific view
pub const REDIRECT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Outcome of routing one classified account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    /// Path to render, always populated
    pub route: String,
    /// Whether the caller should redirect to `route` or stay put
    pub should_redirect: bool,
}

/// Type-specific route path for an account
pub fn route_path(account_type: &AccountType, address: &str) -> String {
    match account_type {
        AccountType::ValidatorVote | AccountType::ValidatorIdentity => {
            format!("/validators/{}", address)
        }
        _ => format!("/account/{}", address),
    }
}

/// Decide where a classified account should be rendered
///
/// Below the confidence threshold the decision falls back to the
/// caller-supplied route. Pure, no side effects.
pub fn route(classified: &ClassifiedAccount, fallback: &str) -> RouteDecision {
    let should_redirect = classified.confidence >= REDIRECT_CONFIDENCE_THRESHOLD;
    let route = if should_redirect {
        classified.route_path.clone()
    } else {
        fallback.to_string()
    };
    RouteDecision {
        route,
        should_redirect,
    }
}

// =============================================================================
// TESTS
// =============================================================================
