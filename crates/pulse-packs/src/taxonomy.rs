//! The canonical signal taxonomy shared by `schema_version = 1` packs.
//!
//! Base points reflect how strongly each signal argues for readiness within
//! its dimension, before decay and confidence weighting. Ban-type signals
//! carry zero points: they exist for policy, not scoring.

use pulse_core::types::Dimension;

use crate::schema::{Taxonomy, TaxonomySignal};

/// Build the canonical taxonomy.
pub fn canonical_taxonomy() -> Taxonomy {
    use Dimension::*;

    let signals = vec![
        // Momentum: is something happening right now?
        TaxonomySignal::new("momentum.funding_round", Momentum, 35.0),
        TaxonomySignal::new("momentum.product_launch", Momentum, 45.0),
        TaxonomySignal::new("momentum.expansion_announcement", Momentum, 30.0),
        TaxonomySignal::new("momentum.hiring_surge", Momentum, 40.0).with_bucket("hiring"),
        TaxonomySignal::new("momentum.headcount_growth", Momentum, 25.0).with_bucket("hiring"),
        // Complexity: how much structural work is on their plate?
        TaxonomySignal::new("complexity.multi_entity_ops", Complexity, 75.0),
        TaxonomySignal::new("complexity.system_migration", Complexity, 40.0),
        TaxonomySignal::new("complexity.legacy_modernization", Complexity, 30.0),
        TaxonomySignal::new("complexity.acquisition_integration", Complexity, 45.0),
        // Pressure: external forcing functions.
        TaxonomySignal::new("pressure.regulatory_deadline", Pressure, 47.0),
        TaxonomySignal::new("pressure.funding_runway", Pressure, 40.0),
        TaxonomySignal::new("pressure.market_contraction", Pressure, 35.0),
        TaxonomySignal::new("pressure.compliance_finding", Pressure, 30.0),
        // Leadership gap: state-based, set by the latest qualifying signal.
        TaxonomySignal::new("leadership.cfo_vacancy", LeadershipGap, 80.0),
        TaxonomySignal::new("leadership.cto_vacancy", LeadershipGap, 70.0),
        TaxonomySignal::new("leadership.exec_departure", LeadershipGap, 50.0),
        TaxonomySignal::new("leadership.role_filled", LeadershipGap, 60.0).countervailing(),
        // Policy-only signals. Zero points; the core hard bans and pack
        // policy act on their presence, not their score.
        TaxonomySignal::new("compliance.do_not_contact", Pressure, 0.0),
        TaxonomySignal::new("legal.sanctions_match", Pressure, 0.0),
        TaxonomySignal::new("legal.active_dispute", Pressure, 0.0),
        TaxonomySignal::new("distress.bankruptcy_filing", Pressure, 0.0),
        TaxonomySignal::new("distress.mass_layoffs", Pressure, 20.0),
    ];

    Taxonomy { signals }
}
