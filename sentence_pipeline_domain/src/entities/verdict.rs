// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The per-sentence output of a stage processor.

use crate::value_objects::{ProcessingStage, SentenceId, SentenceTable, StageStatus};
use serde_json::Value;

/// One sentence's result from a single stage's `process_batch` call.
/// `StageProcessor::process_batch` (§4.4) produces exactly one of these per
/// input sentence, keyed by `id`; it never partially returns.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub id: SentenceId,
    pub table: SentenceTable,
    pub stage: ProcessingStage,
    pub status: StageStatus,
    pub reason: Option<String>,
    pub model: Option<String>,
    pub payload: Option<Value>,
}

impl Verdict {
    pub fn new(id: SentenceId, table: SentenceTable, stage: ProcessingStage, status: StageStatus) -> Self {
        Self { id, table, stage, status, reason: None, model: None, payload: None }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn error(id: SentenceId, table: SentenceTable, stage: ProcessingStage, reason: impl Into<String>) -> Self {
        Self::new(id, table, stage, StageStatus::Error).with_reason(reason)
    }

    pub fn approved(id: SentenceId, table: SentenceTable, stage: ProcessingStage) -> Self {
        Self::new(id, table, stage, StageStatus::Approved)
    }

    pub fn rejected(id: SentenceId, table: SentenceTable, stage: ProcessingStage, reason: impl Into<String>) -> Self {
        Self::new(id, table, stage, StageStatus::Rejected).with_reason(reason)
    }
}
