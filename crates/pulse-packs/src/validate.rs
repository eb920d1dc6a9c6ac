//! Exhaustive pack validation at load time.
//!
//! Nothing is validated lazily at use: a pack that resolves here is safe
//! for the whole pipeline. Error messages always name the section and the
//! offending field or reference.

use pulse_core::errors::PackError;
use pulse_core::types::SignalId;

use crate::regex_guard;
use crate::schema::{Pack, PackDocument, Taxonomy};

/// Resolve a raw document into a validated [`Pack`].
///
/// `canonical` is the shared taxonomy used by `schema_version = 1` packs;
/// `schema_version = 2` packs must embed their own.
pub fn resolve(doc: PackDocument, canonical: &Taxonomy) -> Result<Pack, PackError> {
    validate_manifest(&doc)?;

    let taxonomy = match doc.manifest.schema_version {
        1 => {
            if doc.taxonomy.is_some() {
                return Err(PackError::UnexpectedTaxonomy);
            }
            canonical.clone()
        }
        2 => doc.taxonomy.ok_or(PackError::MissingTaxonomy)?,
        version => return Err(PackError::UnsupportedSchemaVersion { version }),
    };

    if taxonomy.signals.is_empty() {
        return Err(PackError::EmptyTaxonomy);
    }

    let pack = Pack {
        manifest: doc.manifest,
        taxonomy,
        derivation: doc.derivation,
        scoring: doc.scoring,
        policy: doc.policy,
    };

    validate_references(&pack)?;
    validate_scoring(&pack)?;
    validate_derivation(&pack)?;

    Ok(pack)
}

fn validate_manifest(doc: &PackDocument) -> Result<(), PackError> {
    if doc.manifest.id.trim().is_empty() {
        return Err(PackError::MissingManifestField { field: "id".into() });
    }
    if doc.manifest.version.trim().is_empty() {
        return Err(PackError::MissingManifestField {
            field: "version".into(),
        });
    }
    Ok(())
}

/// Every signal referenced anywhere must exist in the effective taxonomy.
fn validate_references(pack: &Pack) -> Result<(), PackError> {
    let check = |section: &str, signal: &SignalId| -> Result<(), PackError> {
        if pack.taxonomy.contains(signal) {
            Ok(())
        } else {
            Err(PackError::DanglingSignal {
                section: section.to_string(),
                signal: signal.to_string(),
            })
        }
    };

    for rule in &pack.derivation.passthrough {
        check("derivation.passthrough", &rule.signal_id)?;
    }
    for rule in &pack.derivation.pattern {
        check("derivation.pattern", &rule.signal_id)?;
    }
    for signal in &pack.scoring.disqualifiers {
        check("scoring.disqualifiers", signal)?;
    }
    for cap in &pack.scoring.caps {
        if !pack.taxonomy.has_bucket(&cap.bucket) {
            return Err(PackError::DanglingBucket {
                section: "scoring.caps".into(),
                bucket: cap.bucket.clone(),
            });
        }
    }
    for signal in &pack.policy.blocked_signals {
        check("policy.blocked_signals", signal)?;
    }
    for combo in &pack.policy.prohibited_combinations {
        for signal in combo {
            check("policy.prohibited_combinations", signal)?;
        }
    }
    for rule in &pack.policy.downgrades {
        check("policy.downgrades", &rule.when_signal)?;
    }
    for rule in &pack.policy.sensitivity {
        check("policy.sensitivity", &rule.signal_id)?;
    }
    Ok(())
}

fn validate_scoring(pack: &Pack) -> Result<(), PackError> {
    let weights = &pack.scoring.weights;
    for (field, value) in [
        ("scoring.weights.momentum", weights.momentum),
        ("scoring.weights.complexity", weights.complexity),
        ("scoring.weights.pressure", weights.pressure),
        ("scoring.weights.leadership_gap", weights.leadership_gap),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PackError::InvalidValue {
                field: field.into(),
                message: format!("must be finite and non-negative, got {value}"),
            });
        }
    }

    if pack.scoring.bands.is_empty() {
        return Err(PackError::InvalidValue {
            field: "scoring.bands".into(),
            message: "at least one recommendation band is required".into(),
        });
    }
    for pair in pack.scoring.bands.windows(2) {
        if pair[0].min_esl >= pair[1].min_esl {
            return Err(PackError::BandsNotOrdered {
                message: format!(
                    "'{}' (min_esl {}) must come before '{}' (min_esl {})",
                    pair[0].name, pair[0].min_esl, pair[1].name, pair[1].min_esl
                ),
            });
        }
    }

    for cap in &pack.scoring.caps {
        if !cap.max_points.is_finite() || cap.max_points < 0.0 {
            return Err(PackError::InvalidValue {
                field: format!("scoring.caps['{}']", cap.bucket),
                message: format!("max_points must be finite and non-negative, got {}", cap.max_points),
            });
        }
    }

    Ok(())
}

fn validate_derivation(pack: &Pack) -> Result<(), PackError> {
    for rule in &pack.derivation.pattern {
        if rule.source_fields.is_empty() {
            return Err(PackError::InvalidValue {
                field: format!("derivation.pattern['{}'].source_fields", rule.signal_id),
                message: "at least one source field is required".into(),
            });
        }
        if let Some(min) = rule.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(PackError::InvalidValue {
                    field: format!("derivation.pattern['{}'].min_confidence", rule.signal_id),
                    message: format!("must be within [0, 1], got {min}"),
                });
            }
        }
        regex_guard::check(&rule.pattern).map_err(|e| match e {
            regex_guard::GuardError::TooLong { length, max } => PackError::PatternTooLong {
                signal: rule.signal_id.to_string(),
                length,
                max,
            },
            regex_guard::GuardError::NestedQuantifier { .. } => PackError::UnsafePattern {
                signal: rule.signal_id.to_string(),
                reason: e.reason(),
            },
            regex_guard::GuardError::Compile { message } => PackError::PatternCompile {
                signal: rule.signal_id.to_string(),
                message,
            },
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PatternRule, SourceField};
    use crate::taxonomy::canonical_taxonomy;

    fn minimal_doc() -> PackDocument {
        toml::from_str(
            r#"
            [manifest]
            id = "test"
            version = "1"
            schema_version = 1
        "#,
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_pack_resolves_against_canonical_taxonomy() {
        let pack = resolve(minimal_doc(), &canonical_taxonomy()).unwrap();
        assert!(!pack.taxonomy.signals.is_empty());
        assert_eq!(pack.key().to_string(), "test@1");
    }

    #[test]
    fn test_dangling_disqualifier_is_named() {
        let mut doc = minimal_doc();
        doc.scoring.disqualifiers.push("no.such_signal".into());
        let err = resolve(doc, &canonical_taxonomy()).unwrap_err();
        match err {
            PackError::DanglingSignal { section, signal } => {
                assert_eq!(section, "scoring.disqualifiers");
                assert_eq!(signal, "no.such_signal");
            }
            other => panic!("expected DanglingSignal, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_version_2_requires_taxonomy() {
        let mut doc = minimal_doc();
        doc.manifest.schema_version = 2;
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::MissingTaxonomy)
        ));
    }

    #[test]
    fn test_unsupported_schema_version() {
        let mut doc = minimal_doc();
        doc.manifest.schema_version = 3;
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::UnsupportedSchemaVersion { version: 3 })
        ));
    }

    #[test]
    fn test_overlong_pattern_rejected_at_validation() {
        let mut doc = minimal_doc();
        doc.derivation.pattern.push(PatternRule {
            signal_id: "momentum.funding_round".into(),
            pattern: "a".repeat(501),
            source_fields: vec![SourceField::Title],
            min_confidence: None,
        });
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::PatternTooLong { length: 501, max: 500, .. })
        ));
    }

    #[test]
    fn test_nested_quantifier_rejected_at_validation() {
        let mut doc = minimal_doc();
        doc.derivation.pattern.push(PatternRule {
            signal_id: "momentum.funding_round".into(),
            pattern: r"(a+)+$".into(),
            source_fields: vec![SourceField::Title],
            min_confidence: None,
        });
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::UnsafePattern { .. })
        ));
    }

    #[test]
    fn test_empty_source_fields_rejected() {
        let mut doc = minimal_doc();
        doc.derivation.pattern.push(PatternRule {
            signal_id: "momentum.funding_round".into(),
            pattern: "funding".into(),
            source_fields: Vec::new(),
            min_confidence: None,
        });
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut doc = minimal_doc();
        doc.scoring.weights.momentum = -0.1;
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unordered_bands_rejected() {
        let mut doc = minimal_doc();
        doc.scoring.bands.swap(1, 2);
        assert!(matches!(
            resolve(doc, &canonical_taxonomy()),
            Err(PackError::BandsNotOrdered { .. })
        ));
    }
}
