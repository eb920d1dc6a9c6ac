//! Batch runner: executes pipeline stages per entity with fault isolation.
//!
//! One entity's failure never aborts the batch. Each per-entity unit of
//! work runs behind a panic boundary; errors and panics alike become
//! [`EntityFailure`] records in the stage's [`RunSummary`] and the rest of
//! the batch proceeds.

use std::panic::{self, AssertUnwindSafe};

use chrono::NaiveDate;
use pulse_core::errors::StageError;
use pulse_core::types::{
    DecisionSnapshot, DerivedSignal, EngagementContext, EntityId, Fact, ProjectionRow,
    ScoreSnapshot, SignalId, TenantId,
};
use pulse_packs::Pack;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{error, info};

use crate::deriver::Deriver;
use crate::policy::PolicyGate;
use crate::projector;
use crate::scoring::ReadinessScorer;

/// One entity that failed a stage. The batch keeps going without it.
#[derive(Debug, Clone)]
pub struct EntityFailure {
    pub entity_id: EntityId,
    pub stage: &'static str,
    pub message: String,
}

/// Outcome counts for one stage of one batch.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stage: &'static str,
    pub succeeded: usize,
    pub failures: Vec<EntityFailure>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

/// Everything one batch produced, plus per-stage accounting.
#[derive(Debug)]
pub struct PipelineOutput {
    pub signals: Vec<DerivedSignal>,
    pub scores: Vec<ScoreSnapshot>,
    pub decisions: Vec<DecisionSnapshot>,
    pub rows: Vec<ProjectionRow>,
    pub summaries: Vec<RunSummary>,
}

/// Run a fallible per-entity closure over a batch in parallel, isolating
/// failures. Output order follows input order.
pub fn run_stage<I, O, F>(
    stage: &'static str,
    inputs: Vec<(EntityId, I)>,
    f: F,
) -> (Vec<O>, RunSummary)
where
    I: Send,
    O: Send,
    F: Fn(&EntityId, I) -> Result<O, StageError> + Sync,
{
    let results: Vec<Result<O, EntityFailure>> = inputs
        .into_par_iter()
        .map(|(entity_id, input)| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&entity_id, input)));
            match outcome {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(err)) => Err(EntityFailure {
                    entity_id,
                    stage,
                    message: err.to_string(),
                }),
                Err(payload) => Err(EntityFailure {
                    entity_id,
                    stage,
                    message: panic_message(&*payload),
                }),
            }
        })
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(failure) => {
                error!(
                    stage,
                    entity = %failure.entity_id,
                    message = %failure.message,
                    "entity failed; continuing batch"
                );
                failures.push(failure);
            }
        }
    }

    let summary = RunSummary {
        stage,
        succeeded: outputs.len(),
        failures,
    };
    info!(
        stage,
        succeeded = summary.succeeded,
        failed = summary.failures.len(),
        "stage complete"
    );
    (outputs, summary)
}

fn bulk_summary(stage: &'static str, succeeded: usize) -> RunSummary {
    info!(stage, succeeded, failed = 0_usize, "stage complete");
    RunSummary {
        stage,
        succeeded,
        failures: Vec::new(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Runs the full pipeline for one tenant batch under one resolved pack.
pub struct PipelineRunner<'a> {
    pack: &'a Pack,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(pack: &'a Pack) -> Self {
        Self { pack }
    }

    /// Derive, score, decide, and project one batch of facts as of one
    /// date. Entities without an [`EngagementContext`] entry get the
    /// default (no cadence, no stress).
    pub fn run(
        &self,
        tenant_id: &TenantId,
        as_of: NaiveDate,
        facts: &[Fact],
        contexts: &FxHashMap<EntityId, EngagementContext>,
    ) -> Result<PipelineOutput, StageError> {
        let pack_key = self.pack.key();
        let mut summaries = Vec::new();

        // Derivation is a single serial pass; the bounded matcher owns a
        // worker thread and is not shareable across rayon tasks.
        let mut deriver = Deriver::new(&self.pack.derivation)?;
        let signals = deriver.derive(facts, &pack_key);

        let mut facts_by_entity: FxHashMap<EntityId, Vec<Fact>> = FxHashMap::default();
        for fact in facts {
            if let Some(entity_id) = &fact.entity_id {
                facts_by_entity
                    .entry(entity_id.clone())
                    .or_default()
                    .push(fact.clone());
            }
        }
        let mut signals_by_entity: FxHashMap<EntityId, Vec<DerivedSignal>> = FxHashMap::default();
        for signal in &signals {
            signals_by_entity
                .entry(signal.entity_id.clone())
                .or_default()
                .push(signal.clone());
        }

        let mut entities: Vec<EntityId> = facts_by_entity.keys().cloned().collect();
        entities.sort();

        // Derivation runs as one bulk pass; it has no per-entity failure
        // mode today, but it still reports a summary so job-level
        // accounting sees every stage.
        summaries.push(bulk_summary("derive", entities.len()));

        let scorer = ReadinessScorer::new(self.pack);
        let inputs: Vec<(EntityId, ())> = entities.iter().cloned().map(|e| (e, ())).collect();
        let (scores, summary) = run_stage("score", inputs, |entity_id, ()| {
            let entity_facts = facts_by_entity.get(entity_id).map_or(&[][..], Vec::as_slice);
            let entity_signals = signals_by_entity
                .get(entity_id)
                .map_or(&[][..], Vec::as_slice);
            Ok(scorer.compute(entity_id, as_of, entity_facts, entity_signals))
        });
        summaries.push(summary);

        let gate = PolicyGate::new(self.pack);
        let decision_inputs: Vec<(EntityId, ScoreSnapshot)> = scores
            .iter()
            .map(|s| (s.entity_id.clone(), s.clone()))
            .collect();
        let (decisions, summary) = run_stage("decide", decision_inputs, |entity_id, snapshot| {
            let signal_ids: Vec<SignalId> = signals_by_entity
                .get(entity_id)
                .map(|signals| signals.iter().map(|s| s.signal_id.clone()).collect())
                .unwrap_or_default();
            let ctx = contexts.get(entity_id).cloned().unwrap_or_default();
            Ok(gate.evaluate(&snapshot, &signal_ids, &ctx))
        });
        summaries.push(summary);

        let rows = projector::project(
            tenant_id,
            &pack_key,
            &scores,
            &decisions,
            self.pack.scoring.minimum_threshold,
        );
        summaries.push(bulk_summary("project", rows.len()));

        Ok(PipelineOutput {
            signals,
            scores,
            decisions,
            rows,
            summaries,
        })
    }
}
