//! Engageability modifiers: stability, cadence, alignment, and band
//! selection.
//!
//! All three modifiers are multiplicative dampeners in [0, 1]. They can
//! only lower the engageability score; stress and recency never make a
//! recommendation more aggressive.

use chrono::NaiveDate;
use pulse_core::constants;
use pulse_core::types::StressIndices;
use pulse_packs::{RecommendationBand, StressWeights};

/// `SM = 1 - Σ(weight_i × stress_index_i)`, clamped to [0, 1].
pub fn stability_modifier(stress: &StressIndices, weights: &StressWeights) -> f64 {
    let load = weights.volatility * stress.volatility
        + weights.sustained_pressure * stress.sustained_pressure
        + weights.communication_instability * stress.communication_instability;
    (1.0 - load).clamp(0.0, 1.0)
}

/// Cadence modifier: 0 immediately after contact, ramping linearly back to
/// 1 over the cooldown window. 1 when the entity has never been contacted.
pub fn cadence_modifier(
    last_contact: Option<NaiveDate>,
    as_of: NaiveDate,
    cooldown_days: u32,
) -> f64 {
    let Some(last) = last_contact else {
        return 1.0;
    };
    if cooldown_days == 0 {
        return 1.0;
    }
    let days = (as_of - last).num_days();
    if days <= 0 {
        return 0.0;
    }
    (days as f64 / f64::from(cooldown_days)).min(1.0)
}

/// Final engageability: `(composite/100) × SM × CM × AM`.
pub fn engageability(composite: u8, sm: f64, cm: f64, am: f64) -> f64 {
    (f64::from(composite) / 100.0) * sm * cm * am
}

/// Pick the highest band whose `min_esl` the score reaches. Bands are
/// ordered most conservative first; when the stability modifier is below
/// the cap threshold the result is capped at index 1 — the second most
/// conservative band — no matter how high the ESL is.
pub fn select_band(bands: &[RecommendationBand], esl: f64, sm: f64) -> String {
    let mut index = bands
        .iter()
        .rposition(|band| esl >= band.min_esl)
        .unwrap_or(0);
    if sm < constants::STABILITY_CAP_THRESHOLD {
        index = index.min(1.min(bands.len() - 1));
    }
    bands[index].name.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> Vec<RecommendationBand> {
        RecommendationBand::default_bands()
    }

    #[test]
    fn test_stability_modifier_is_clamped() {
        let weights = StressWeights::default();
        let calm = StressIndices::default();
        assert_eq!(stability_modifier(&calm, &weights), 1.0);

        let maxed = StressIndices {
            volatility: 1.0,
            sustained_pressure: 1.0,
            communication_instability: 1.0,
        };
        assert!((stability_modifier(&maxed, &weights) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_cadence_ramps_over_cooldown() {
        let as_of = NaiveDate::from_ymd_opt(2026, 6, 22).unwrap();
        let contact = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        // 21 days after contact with a 21-day cooldown: fully recovered.
        assert_eq!(cadence_modifier(Some(contact), as_of, 21), 1.0);
        // Halfway through.
        let midway = NaiveDate::from_ymd_opt(2026, 6, 11).unwrap();
        assert!((cadence_modifier(Some(contact), midway, 20) - 0.5).abs() < 1e-10);
        // Same day.
        assert_eq!(cadence_modifier(Some(contact), contact, 21), 0.0);
        // Never contacted.
        assert_eq!(cadence_modifier(None, as_of, 21), 1.0);
    }

    #[test]
    fn test_band_selection() {
        assert_eq!(select_band(&bands(), 0.0, 1.0), "observe");
        assert_eq!(select_band(&bands(), 0.30, 1.0), "nurture");
        assert_eq!(select_band(&bands(), 0.50, 1.0), "engage_standard");
        assert_eq!(select_band(&bands(), 0.90, 1.0), "engage_now");
    }

    #[test]
    fn test_stability_cap_at_second_most_conservative() {
        // SM just below the threshold caps even a maximal ESL.
        assert_eq!(select_band(&bands(), 1.0, 0.69), "nurture");
        // At or above the threshold, no cap.
        assert_eq!(select_band(&bands(), 1.0, 0.70), "engage_now");
        // The cap never raises a lower band.
        assert_eq!(select_band(&bands(), 0.0, 0.10), "observe");
    }

    #[test]
    fn test_engageability_composition() {
        assert!((engageability(100, 1.0, 1.0, 1.0) - 1.0).abs() < 1e-10);
        assert!((engageability(64, 0.9, 0.5, 1.0) - 0.288).abs() < 1e-10);
        assert_eq!(engageability(0, 1.0, 1.0, 1.0), 0.0);
    }
}
