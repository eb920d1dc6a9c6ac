//! Pack schema: fixed serde structs per schema generation.
//!
//! Two generations are supported. `schema_version = 1` validates signal
//! references against the canonical taxonomy; `schema_version = 2` embeds
//! its own taxonomy. Unknown fields are rejected at parse time: a typo in a
//! pack file is a load error, not a silently ignored knob.

use pulse_core::constants;
use pulse_core::types::{Dimension, DimensionWeights, PackKey, SensitivityLevel, SignalId};
use serde::{Deserialize, Serialize};

/// Raw pack document as it appears on disk. Becomes a [`Pack`] after
/// validation resolves the applicable taxonomy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackDocument {
    pub manifest: PackManifest,
    pub taxonomy: Option<Taxonomy>,
    #[serde(default)]
    pub derivation: DerivationRules,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// A validated, immutable pack. Constructed only by
/// [`crate::validate::resolve`] or [`crate::defaults::default_pack`].
#[derive(Debug, Clone)]
pub struct Pack {
    pub manifest: PackManifest,
    /// The effective taxonomy (canonical for schema_version 1, embedded for 2).
    pub taxonomy: Taxonomy,
    pub derivation: DerivationRules,
    pub scoring: ScoringConfig,
    pub policy: PolicyConfig,
}

impl Pack {
    pub fn key(&self) -> PackKey {
        PackKey::new(self.manifest.id.as_str(), self.manifest.version.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackManifest {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub name: String,
    pub schema_version: u32,
}

/// Signal vocabulary plus the scoring attributes of each signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Taxonomy {
    #[serde(default)]
    pub signals: Vec<TaxonomySignal>,
}

impl Taxonomy {
    pub fn contains(&self, id: &SignalId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &SignalId) -> Option<&TaxonomySignal> {
        self.signals.iter().find(|s| &s.id == id)
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.signals
            .iter()
            .any(|s| s.bucket.as_deref() == Some(bucket))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomySignal {
    pub id: SignalId,
    pub dimension: Dimension,
    pub base_points: f64,
    /// Sub-bucket for cap purposes; signals in the same bucket share a cap.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Countervailing signals subtract from the leadership-gap state instead
    /// of contributing points.
    #[serde(default)]
    pub countervailing: bool,
}

impl TaxonomySignal {
    pub fn new(id: &str, dimension: Dimension, base_points: f64) -> Self {
        Self {
            id: id.into(),
            dimension,
            base_points,
            bucket: None,
            countervailing: false,
        }
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = Some(bucket.to_string());
        self
    }

    pub fn countervailing(mut self) -> Self {
        self.countervailing = true;
        self
    }
}

// ---- Derivation ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivationRules {
    #[serde(default)]
    pub passthrough: Vec<PassthroughRule>,
    #[serde(default)]
    pub pattern: Vec<PatternRule>,
}

/// Direct `event_type -> signal_id` mapping; O(1) per fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassthroughRule {
    pub event_type: String,
    pub signal_id: SignalId,
}

/// Regex rule over whitelisted text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternRule {
    pub signal_id: SignalId,
    pub pattern: String,
    pub source_fields: Vec<SourceField>,
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

/// The closed set of fields a pattern rule may read. The whitelist is the
/// type: arbitrary payload fields are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceField {
    Title,
    Summary,
    Url,
    Source,
}

// ---- Scoring ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringConfig {
    pub weights: DimensionWeights,
    pub decay: DecayConfig,
    pub caps: Vec<BucketCap>,
    pub disqualifiers: Vec<SignalId>,
    pub minimum_threshold: u8,
    /// Ordered most conservative first.
    pub bands: Vec<RecommendationBand>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: DimensionWeights::default(),
            decay: DecayConfig::default(),
            caps: Vec::new(),
            disqualifiers: Vec::new(),
            minimum_threshold: constants::DEFAULT_MINIMUM_THRESHOLD,
            bands: RecommendationBand::default_bands(),
        }
    }
}

/// Piecewise step decay: the factor of the first step whose `max_days`
/// covers the age, else the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecayCurve {
    pub steps: Vec<DecayStep>,
    #[serde(default)]
    pub floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecayStep {
    pub max_days: u32,
    pub factor: f64,
}

impl DecayCurve {
    /// Decay factor for a fact `days` old. Future-dated facts (negative
    /// days) are outside the window and contribute nothing.
    pub fn factor(&self, days: i64) -> f64 {
        if days < 0 {
            return 0.0;
        }
        for step in &self.steps {
            if days <= i64::from(step.max_days) {
                return step.factor;
            }
        }
        self.floor
    }

    fn steps(pairs: &[(u32, f64)], floor: f64) -> Self {
        Self {
            steps: pairs
                .iter()
                .map(|&(max_days, factor)| DecayStep { max_days, factor })
                .collect(),
            floor,
        }
    }

    /// Fast decay: recent activity matters, stale activity does not.
    pub fn momentum_default() -> Self {
        Self::steps(&[(30, 1.0), (60, 0.7), (90, 0.4)], 0.0)
    }

    /// Medium decay with a non-zero floor: old pressure still counts a little.
    pub fn pressure_default() -> Self {
        Self::steps(&[(30, 1.0), (60, 0.85), (120, 0.6)], 0.2)
    }

    /// Slow, cumulative decay: structural complexity ages slowly.
    pub fn complexity_default() -> Self {
        Self::steps(&[(90, 1.0), (180, 0.8), (365, 0.6)], 0.4)
    }
}

/// Per-dimension decay curves. Leadership gap is state-based and has no
/// curve: the most recent qualifying signal sets the magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DecayConfig {
    pub momentum: DecayCurve,
    pub complexity: DecayCurve,
    pub pressure: DecayCurve,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            momentum: DecayCurve::momentum_default(),
            complexity: DecayCurve::complexity_default(),
            pressure: DecayCurve::pressure_default(),
        }
    }
}

impl DecayConfig {
    /// Curve for an additive dimension. Leadership gap is not additive.
    pub fn curve(&self, dimension: Dimension) -> Option<&DecayCurve> {
        match dimension {
            Dimension::Momentum => Some(&self.momentum),
            Dimension::Complexity => Some(&self.complexity),
            Dimension::Pressure => Some(&self.pressure),
            Dimension::LeadershipGap => None,
        }
    }
}

/// Cap on the summed points of one bucket, applied before the dimension
/// clamp so one repeated kind of event cannot dominate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketCap {
    pub bucket: String,
    pub max_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationBand {
    pub name: String,
    pub min_esl: f64,
}

impl RecommendationBand {
    pub fn default_bands() -> Vec<Self> {
        vec![
            Self { name: "observe".into(), min_esl: 0.0 },
            Self { name: "nurture".into(), min_esl: 0.25 },
            Self { name: "engage_standard".into(), min_esl: 0.45 },
            Self { name: "engage_now".into(), min_esl: 0.65 },
        ]
    }
}

// ---- Policy ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PolicyConfig {
    pub blocked_signals: Vec<SignalId>,
    /// Each inner list suppresses when all of its signals co-occur.
    pub prohibited_combinations: Vec<Vec<SignalId>>,
    pub downgrades: Vec<DowngradeRule>,
    pub sensitivity: Vec<SensitivityRule>,
    pub stress_weights: StressWeights,
    pub cooldown_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            blocked_signals: Vec::new(),
            prohibited_combinations: Vec::new(),
            downgrades: Vec::new(),
            sensitivity: Vec::new(),
            stress_weights: StressWeights::default(),
            cooldown_days: constants::DEFAULT_COOLDOWN_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DowngradeRule {
    pub when_signal: SignalId,
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivityRule {
    pub signal_id: SignalId,
    pub level: SensitivityLevel,
}

/// Weights for the stability modifier `1 - Σ(w_i × stress_i)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StressWeights {
    pub volatility: f64,
    pub sustained_pressure: f64,
    pub communication_instability: f64,
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            volatility: 0.40,
            sustained_pressure: 0.35,
            communication_instability: 0.25,
        }
    }
}
