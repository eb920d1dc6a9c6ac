//! Shared constants for the Pulse engine.
//!
//! The core hard bans live here, outside any pack, so that no configuration
//! bundle can remove or weaken them.

/// Pulse version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Signals that always suppress engagement, regardless of pack policy.
///
/// Evaluated before any pack rule is consulted. A pack may re-list these in
/// its own blocklist (harmless) but cannot allow them.
pub const CORE_HARD_BANS: &[&str] = &[
    "compliance.do_not_contact",
    "legal.sanctions_match",
    "distress.bankruptcy_filing",
    "legal.active_dispute",
];

/// Returns true if the signal id is on the core hard-ban list.
pub fn is_core_banned(signal_id: &str) -> bool {
    CORE_HARD_BANS.contains(&signal_id)
}

// ---- Scoring defaults ----

/// Default composite weight for the momentum dimension.
pub const DEFAULT_WEIGHT_MOMENTUM: f64 = 0.30;

/// Default composite weight for the complexity dimension.
pub const DEFAULT_WEIGHT_COMPLEXITY: f64 = 0.30;

/// Default composite weight for the pressure dimension.
pub const DEFAULT_WEIGHT_PRESSURE: f64 = 0.25;

/// Default composite weight for the leadership-gap dimension.
pub const DEFAULT_WEIGHT_LEADERSHIP_GAP: f64 = 0.15;

/// Facts older than this never count toward disqualification.
pub const SCORING_WINDOW_DAYS: i64 = 365;

/// Default composite floor below which an entity is excluded from feeds.
pub const DEFAULT_MINIMUM_THRESHOLD: u8 = 35;

/// Number of top contributing facts recorded in every explain payload.
pub const TOP_CONTRIBUTORS: usize = 5;

// ---- Policy defaults ----

/// Default cooldown window (days) for the cadence modifier.
pub const DEFAULT_COOLDOWN_DAYS: u32 = 21;

/// Stability modifier below which the recommendation band is capped at the
/// second most conservative band. Pressure must never increase the
/// aggressiveness of engagement.
pub const STABILITY_CAP_THRESHOLD: f64 = 0.7;

// ---- Derivation limits ----

/// Maximum length of a pack-supplied pattern rule.
pub const MAX_PATTERN_LEN: usize = 500;

/// Hard per-attempt budget for a single pattern match, in milliseconds.
pub const MATCH_TIMEOUT_MS: u64 = 100;

// ---- Projection ----

/// Default feed page size.
pub const DEFAULT_TOP_N: usize = 50;
