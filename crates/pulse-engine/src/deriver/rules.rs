//! Compiled derivation rules.

use std::sync::Arc;

use pulse_core::errors::DeriveError;
use pulse_core::types::{FactText, SignalId};
use pulse_packs::{DerivationRules, SourceField};
use regex::Regex;
use rustc_hash::FxHashMap;

/// A pattern rule with its regex compiled once per pack load.
pub struct CompiledPattern {
    pub signal_id: SignalId,
    pub regex: Arc<Regex>,
    pub source_fields: Vec<SourceField>,
    pub min_confidence: Option<f64>,
}

impl CompiledPattern {
    /// Concatenate the rule's whitelisted fields into one haystack.
    /// Only the four whitelisted fields are reachable; the type system
    /// makes arbitrary payload fields unrepresentable.
    pub fn haystack(&self, text: &FactText) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.source_fields.len());
        for field in &self.source_fields {
            let value = match field {
                SourceField::Title => text.title.as_deref(),
                SourceField::Summary => text.summary.as_deref(),
                SourceField::Url => text.url.as_deref(),
                SourceField::Source => text.source_label.as_deref(),
            };
            if let Some(value) = value {
                if !value.is_empty() {
                    parts.push(value);
                }
            }
        }
        parts.join("\n")
    }
}

/// All of one pack's derivation rules, ready to evaluate.
pub struct CompiledRuleSet {
    /// `event_type -> signal_id`; O(1) per fact.
    pub passthrough: FxHashMap<String, SignalId>,
    pub patterns: Vec<CompiledPattern>,
}

impl CompiledRuleSet {
    pub fn compile(rules: &DerivationRules) -> Result<Self, DeriveError> {
        let passthrough = rules
            .passthrough
            .iter()
            .map(|rule| (rule.event_type.clone(), rule.signal_id.clone()))
            .collect();

        let mut patterns = Vec::with_capacity(rules.pattern.len());
        for rule in &rules.pattern {
            let regex = Regex::new(&rule.pattern).map_err(|e| DeriveError::PatternCompile {
                signal: rule.signal_id.to_string(),
                message: e.to_string(),
            })?;
            patterns.push(CompiledPattern {
                signal_id: rule.signal_id.clone(),
                regex: Arc::new(regex),
                source_fields: rule.source_fields.clone(),
                min_confidence: rule.min_confidence,
            });
        }

        Ok(Self {
            passthrough,
            patterns,
        })
    }
}
