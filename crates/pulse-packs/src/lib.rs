//! Configuration packs: the versioned, tenant-pinned bundles that
//! parameterize derivation, scoring, and policy.
//!
//! A pack is parsed from TOML into fixed structs, validated exhaustively at
//! load time, and immutable afterwards. Loading fails loud; resolving a
//! tenant's pack fails soft (logged `None`) so callers can fall back to the
//! default pack.

pub mod defaults;
pub mod regex_guard;
pub mod schema;
pub mod store;
pub mod taxonomy;
pub mod validate;

pub use defaults::default_pack;
pub use schema::{
    BucketCap, DecayConfig, DecayCurve, DecayStep, DerivationRules, DowngradeRule, Pack,
    PackDocument, PackManifest, PassthroughRule, PatternRule, PolicyConfig, RecommendationBand,
    ScoringConfig, SensitivityRule, SourceField, StressWeights, Taxonomy, TaxonomySignal,
};
pub use store::PackStore;
pub use taxonomy::canonical_taxonomy;
