//! The default pack: the explicit fallback used when a tenant has no valid
//! pin. A named, validated configuration object — not implicit module-level
//! constants scattered around the engine.

use pulse_core::types::PackKey;

use crate::schema::{
    BucketCap, DerivationRules, DowngradeRule, Pack, PackManifest, PassthroughRule, PatternRule,
    PolicyConfig, ScoringConfig, SensitivityRule, SourceField,
};
use crate::taxonomy::canonical_taxonomy;

/// Key under which the default pack is registered.
pub fn default_pack_key() -> PackKey {
    PackKey::new("default", "1")
}

/// Build the default pack. Single source of truth for fallback behavior;
/// guaranteed valid (asserted by test against the same validation used for
/// loaded packs).
pub fn default_pack() -> Pack {
    let passthrough = [
        ("funding_round", "momentum.funding_round"),
        ("product_launch", "momentum.product_launch"),
        ("expansion", "momentum.expansion_announcement"),
        ("hiring_surge", "momentum.hiring_surge"),
        ("headcount_growth", "momentum.headcount_growth"),
        ("multi_entity_ops", "complexity.multi_entity_ops"),
        ("system_migration", "complexity.system_migration"),
        ("legacy_modernization", "complexity.legacy_modernization"),
        ("acquisition", "complexity.acquisition_integration"),
        ("regulatory_deadline", "pressure.regulatory_deadline"),
        ("funding_runway", "pressure.funding_runway"),
        ("market_contraction", "pressure.market_contraction"),
        ("compliance_finding", "pressure.compliance_finding"),
        ("cfo_vacancy", "leadership.cfo_vacancy"),
        ("cto_vacancy", "leadership.cto_vacancy"),
        ("exec_departure", "leadership.exec_departure"),
        ("role_filled", "leadership.role_filled"),
        ("do_not_contact", "compliance.do_not_contact"),
        ("sanctions_match", "legal.sanctions_match"),
        ("legal_dispute", "legal.active_dispute"),
        ("bankruptcy", "distress.bankruptcy_filing"),
        ("mass_layoffs", "distress.mass_layoffs"),
    ]
    .into_iter()
    .map(|(event_type, signal_id)| PassthroughRule {
        event_type: event_type.to_string(),
        signal_id: signal_id.into(),
    })
    .collect();

    let pattern = vec![
        PatternRule {
            signal_id: "momentum.funding_round".into(),
            pattern: r"(?i)\b(series [a-e]|seed round|raised \$\d+)".into(),
            source_fields: vec![SourceField::Title, SourceField::Summary],
            min_confidence: Some(0.5),
        },
        PatternRule {
            signal_id: "leadership.cfo_vacancy".into(),
            pattern: r"(?i)\b(cfo|chief financial officer)\b.*\b(depart|resign|step down|exit)".into(),
            source_fields: vec![SourceField::Title, SourceField::Summary],
            min_confidence: Some(0.6),
        },
        PatternRule {
            signal_id: "pressure.regulatory_deadline".into(),
            pattern: r"(?i)\b(compliance deadline|regulatory deadline|must comply by)".into(),
            source_fields: vec![SourceField::Title, SourceField::Summary],
            min_confidence: None,
        },
    ];

    Pack {
        manifest: PackManifest {
            id: "default".into(),
            version: "1".into(),
            name: "Pulse default pack".into(),
            schema_version: 1,
        },
        taxonomy: canonical_taxonomy(),
        derivation: DerivationRules {
            passthrough,
            pattern,
        },
        scoring: ScoringConfig {
            caps: vec![BucketCap {
                bucket: "hiring".into(),
                max_points: 50.0,
            }],
            disqualifiers: vec![
                "distress.bankruptcy_filing".into(),
                "compliance.do_not_contact".into(),
            ],
            ..ScoringConfig::default()
        },
        policy: PolicyConfig {
            blocked_signals: vec!["distress.mass_layoffs".into()],
            prohibited_combinations: vec![vec![
                "pressure.funding_runway".into(),
                "leadership.cfo_vacancy".into(),
            ]],
            downgrades: vec![DowngradeRule {
                when_signal: "pressure.compliance_finding".into(),
                constraints: vec![
                    "no urgency framing".into(),
                    "lead with support, not product".into(),
                ],
            }],
            sensitivity: vec![
                SensitivityRule {
                    signal_id: "distress.mass_layoffs".into(),
                    level: pulse_core::types::SensitivityLevel::High,
                },
                SensitivityRule {
                    signal_id: "pressure.compliance_finding".into(),
                    level: pulse_core::types::SensitivityLevel::Elevated,
                },
                SensitivityRule {
                    signal_id: "leadership.exec_departure".into(),
                    level: pulse_core::types::SensitivityLevel::Elevated,
                },
            ],
            ..PolicyConfig::default()
        },
    }
}
