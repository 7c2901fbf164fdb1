// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sentence Repository Interface
//!
//! The Sentence Store (C1): the only durable shared resource in the system
//! (§5). Stage processors never touch it directly — the orchestrator is the
//! sole writer during a run (§3 "Ownership").
//!
//! ## Failure Semantics
//!
//! Store failures are hard-fatal in production (they surface to the error
//! circuit); in testing mode the orchestrator may log and continue (§4.1).

use crate::entities::{Sentence, Verdict};
use crate::value_objects::{ProcessingStage, SentenceId, SentenceTable};
use crate::PipelineError;
use async_trait::async_trait;

/// Maximum rows returned by a single `select_for_processing` call, matching
/// the reference implementation's `LIMIT 1000`.
pub const SELECTION_LIMIT: usize = 1000;

/// Repository interface for sentence persistence.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the orchestrator and scheduler may
/// hold a shared reference across tasks.
#[async_trait]
pub trait SentenceRepository: Send + Sync {
    /// Returns sentences eligible for processing, in insertion order
    /// (§4.1). When `restart_from` is `None`, eligibility is judged against
    /// `keyword_filter`'s status; otherwise against the named stage's
    /// status. Only rows whose status at that stage is `pending`, `error`,
    /// or `testing` are returned. Bounded by [`SELECTION_LIMIT`].
    async fn select_for_processing(
        &self,
        table: SentenceTable,
        ids: Option<&[SentenceId]>,
        restart_from: Option<ProcessingStage>,
    ) -> Result<Vec<Sentence>, PipelineError>;

    /// Applies a batch of verdicts for one stage. Each verdict's
    /// `stage_status`, `stage_date`, optional `stage_model`, optional
    /// `stage_reason`, and `stage_payload` are written atomically per row.
    async fn apply_verdicts(&self, stage: ProcessingStage, verdicts: &[Verdict]) -> Result<(), PipelineError>;

    /// Sets all five stage statuses to `rejected` with `reason` for every
    /// id, atomically per row (§3 invariant 5, the variable gate).
    async fn bulk_reject(&self, table: SentenceTable, ids: &[SentenceId], reason: &str) -> Result<(), PipelineError>;

    /// Inserts a freshly ingested sentence (used by tests and by the
    /// upstream ingestion adapter at the boundary named in §6).
    async fn insert(&self, sentence: &Sentence) -> Result<(), PipelineError>;

    /// Fetches a single sentence by id, if present.
    async fn find_by_id(&self, table: SentenceTable, id: SentenceId) -> Result<Option<Sentence>, PipelineError>;

    /// Counts sentences where every one of the five stages is `approved`
    /// (the downstream document-generation selection predicate, §6).
    async fn count_fully_approved(&self, table: SentenceTable) -> Result<usize, PipelineError>;
}
