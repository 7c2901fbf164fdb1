// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sentence Entity
//!
//! `Sentence` is the central entity of the domain (§3). It carries one
//! [`StageRecord`] per stage in a fixed-size array so invariant 1 — "every
//! sentence has exactly five stage status values at all times" — holds by
//! construction rather than by convention.

use crate::value_objects::{ProcessingStage, SentenceId, SentenceTable, StageStatus, ALL_STAGES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-stage metadata recorded on a sentence: status, when it was last
/// written, why (if rejected or errored), which model produced it (LLM
/// stages only), and any stage-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub status: StageStatus,
    pub stage_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub model: Option<String>,
    pub payload: Option<Value>,
}

impl StageRecord {
    pub fn pending() -> Self {
        Self { status: StageStatus::Pending, stage_date: None, reason: None, model: None, payload: None }
    }
}

impl Default for StageRecord {
    fn default() -> Self {
        Self::pending()
    }
}

/// A candidate sentence for a resume or cover letter, tracked through all
/// five evaluation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub id: SentenceId,
    pub table: SentenceTable,
    pub content_text: String,
    pub tone: Option<String>,
    pub body_section: Option<String>,
    pub position_label: Option<String>,
    stages: [StageRecord; 5],
    pub created_at: DateTime<Utc>,
}

impl Sentence {
    /// Constructs a freshly ingested sentence: all five stages `pending`,
    /// matching the upstream ingestion contract in §6.
    pub fn new(table: SentenceTable, content_text: impl Into<String>) -> Self {
        Self {
            id: SentenceId::new(),
            table,
            content_text: content_text.into(),
            tone: None,
            body_section: None,
            position_label: None,
            stages: Default::default(),
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a sentence from store data, e.g. a repository row.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: SentenceId,
        table: SentenceTable,
        content_text: String,
        tone: Option<String>,
        body_section: Option<String>,
        position_label: Option<String>,
        stages: [StageRecord; 5],
        created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, table, content_text, tone, body_section, position_label, stages, created_at }
    }

    pub fn stage_record(&self, stage: ProcessingStage) -> &StageRecord {
        &self.stages[stage.index()]
    }

    pub fn stage_status(&self, stage: ProcessingStage) -> StageStatus {
        self.stages[stage.index()].status
    }

    /// All five stage records, in `ALL_STAGES` order.
    pub fn stage_records(&self) -> &[StageRecord; 5] {
        &self.stages
    }

    /// Whether this sentence is eligible to be presented to `stage`'s
    /// processor, i.e. its status is `pending`, `error`, or `testing`.
    pub fn is_selectable_for(&self, stage: ProcessingStage) -> bool {
        self.stage_status(stage).is_selectable()
    }

    /// Mutates the in-memory record for one stage. This is the method the
    /// orchestrator calls after `apply_verdicts` writes to the store — §4.8
    /// step 6 calls updating this in-memory copy "load-bearing": without it
    /// the next stage's filter would see a stale `pending` status.
    pub fn record_stage_result(
        &mut self,
        stage: ProcessingStage,
        status: StageStatus,
        reason: Option<String>,
        model: Option<String>,
        payload: Option<Value>,
    ) {
        self.stages[stage.index()] =
            StageRecord { status, stage_date: Some(Utc::now()), reason, model, payload };
    }

    /// Sets all five stages to `rejected` with the same reason in one
    /// in-memory operation, mirroring the store's atomic `bulk_reject`.
    pub fn reject_all_stages(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        let now = Utc::now();
        for record in self.stages.iter_mut() {
            *record = StageRecord {
                status: StageStatus::Rejected,
                stage_date: Some(now),
                reason: Some(reason.clone()),
                model: None,
                payload: None,
            };
        }
    }

    /// Whether every stage is `approved`, the downstream document-generation
    /// contract's selection predicate (§6).
    pub fn is_fully_approved(&self) -> bool {
        ALL_STAGES.iter().all(|s| self.stage_status(*s) == StageStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sentence_starts_with_five_pending_stages() {
        let s = Sentence::new(SentenceTable::Resume, "hello world");
        for stage in ALL_STAGES {
            assert_eq!(s.stage_status(stage), StageStatus::Pending);
        }
    }

    #[test]
    fn reject_all_stages_sets_every_status_atomically() {
        let mut s = Sentence::new(SentenceTable::CoverLetter, "I have {years_experience} years.");
        s.reject_all_stages("Unsupported variables: years_experience");
        for stage in ALL_STAGES {
            assert_eq!(s.stage_status(stage), StageStatus::Rejected);
            assert!(s.stage_record(stage).reason.as_deref().unwrap().contains("years_experience"));
        }
    }

    #[test]
    fn record_stage_result_only_touches_that_stage() {
        let mut s = Sentence::new(SentenceTable::Resume, "I am excited to apply.");
        s.record_stage_result(ProcessingStage::KeywordFilter, StageStatus::Approved, None, None, None);
        assert_eq!(s.stage_status(ProcessingStage::KeywordFilter), StageStatus::Approved);
        assert_eq!(s.stage_status(ProcessingStage::Truthfulness), StageStatus::Pending);
    }
}
