// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The five ordered evaluation stages and the status vocabulary they share.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five ordered evaluation steps. Declaration order here is the
/// order the orchestrator executes them in; `ALL_STAGES` is the canonical
/// sequence used for restart-from-stage resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    KeywordFilter,
    Truthfulness,
    CanadianSpelling,
    ToneAnalysis,
    SkillAnalysis,
}

/// The fixed execution order of the five stages.
pub const ALL_STAGES: [ProcessingStage; 5] = [
    ProcessingStage::KeywordFilter,
    ProcessingStage::Truthfulness,
    ProcessingStage::CanadianSpelling,
    ProcessingStage::ToneAnalysis,
    ProcessingStage::SkillAnalysis,
];

impl ProcessingStage {
    /// Column/field prefix used when persisting stage-scoped data.
    pub fn column_prefix(&self) -> &'static str {
        match self {
            ProcessingStage::KeywordFilter => "keyword_filter",
            ProcessingStage::Truthfulness => "truthfulness",
            ProcessingStage::CanadianSpelling => "canadian_spelling",
            ProcessingStage::ToneAnalysis => "tone_analysis",
            ProcessingStage::SkillAnalysis => "skill_analysis",
        }
    }

    /// Index of this stage in `ALL_STAGES`, used to compare "earlier than".
    pub fn index(&self) -> usize {
        ALL_STAGES.iter().position(|s| s == self).expect("stage is in ALL_STAGES")
    }

    /// Whether `self` executes strictly before `other` in the fixed order.
    pub fn is_before(&self, other: &ProcessingStage) -> bool {
        self.index() < other.index()
    }

    /// The stage that runs immediately after this one, if any.
    pub fn next(&self) -> Option<ProcessingStage> {
        ALL_STAGES.get(self.index() + 1).copied()
    }

    /// Whether this stage calls out to the LLM client (batch size 5) as
    /// opposed to being a deterministic, purely local computation (batch
    /// size 1).
    pub fn is_llm_backed(&self) -> bool {
        matches!(
            self,
            ProcessingStage::Truthfulness | ProcessingStage::ToneAnalysis | ProcessingStage::SkillAnalysis
        )
    }

    /// The orchestrator's chunking policy per §4.4.6.
    pub fn batch_size(&self) -> usize {
        if self.is_llm_backed() {
            5
        } else {
            1
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_prefix())
    }
}

/// The verdict vocabulary shared by every stage. The source mixed
/// `approved`/`rejected` with `completed` for deterministic stages; this
/// type standardizes on `Approved` for non-rejecting deterministic verdicts,
/// per the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Approved,
    Rejected,
    Error,
    /// A transient status used only in testing mode, selected for
    /// (re)processing the same way `Pending`/`Error` are.
    Testing,
}

impl StageStatus {
    /// Whether the orchestrator's stage filter (§4.8 step 6) should present
    /// a sentence at this status to the stage processor again.
    pub fn is_selectable(&self) -> bool {
        matches!(self, StageStatus::Pending | StageStatus::Error | StageStatus::Testing)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageStatus::Pending => "pending",
            StageStatus::Approved => "approved",
            StageStatus::Rejected => "rejected",
            StageStatus::Error => "error",
            StageStatus::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_matches_spec() {
        assert_eq!(ALL_STAGES[0], ProcessingStage::KeywordFilter);
        assert_eq!(ALL_STAGES[4], ProcessingStage::SkillAnalysis);
        assert!(ProcessingStage::KeywordFilter.is_before(&ProcessingStage::Truthfulness));
        assert!(!ProcessingStage::SkillAnalysis.is_before(&ProcessingStage::KeywordFilter));
    }

    #[test]
    fn batch_size_policy() {
        assert_eq!(ProcessingStage::KeywordFilter.batch_size(), 1);
        assert_eq!(ProcessingStage::CanadianSpelling.batch_size(), 1);
        assert_eq!(ProcessingStage::Truthfulness.batch_size(), 5);
        assert_eq!(ProcessingStage::ToneAnalysis.batch_size(), 5);
        assert_eq!(ProcessingStage::SkillAnalysis.batch_size(), 5);
    }

    #[test]
    fn selectable_statuses() {
        assert!(StageStatus::Pending.is_selectable());
        assert!(StageStatus::Error.is_selectable());
        assert!(StageStatus::Testing.is_selectable());
        assert!(!StageStatus::Approved.is_selectable());
        assert!(!StageStatus::Rejected.is_selectable());
    }
}
